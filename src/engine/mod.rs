//! The storage engine contract the core consumes (§6 External interfaces),
//! grounded on the teacher's `kvs::Transaction` method shapes (`get`, `set`,
//! `del`, `scan`) but synchronous throughout, per this core's REDESIGN FLAG
//! departure from the teacher's `async fn` transaction API.

pub mod memory;

use crate::err::Error;

/// A single transaction against the engine. Every [`crate::plan::Plan`]
/// executes inside exactly one of these (§5 Transactions).
pub trait Transaction {
	fn read_only(&self) -> bool;

	fn get(&self, store: &str, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

	fn put(&mut self, store: &str, key: &[u8], value: &[u8]) -> Result<(), Error>;

	fn delete(&mut self, store: &str, key: &[u8]) -> Result<(), Error>;

	/// Ascending iteration starting at `key` (inclusive), in the engine's
	/// total key order (§6).
	fn ascend_from(&self, store: &str, key: &[u8]) -> Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>;

	fn truncate(&mut self, store: &str) -> Result<(), Error>;

	fn create_index(&mut self, table: &str, name: &str) -> Result<(), Error>;

	fn drop_index(&mut self, table: &str, name: &str) -> Result<(), Error>;

	fn list_indexes(&self, table: &str) -> Vec<String>;

	fn commit(&mut self) -> Result<(), Error>;

	fn rollback(&mut self) -> Result<(), Error>;
}

/// A storage engine capable of starting transactions (§6).
pub trait Engine {
	type Txn: Transaction;

	fn begin(&self, read_only: bool) -> Result<Self::Txn, Error>;
}
