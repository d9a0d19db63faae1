//! An in-memory reference engine (§1 "ships purely as a test fixture"):
//! `BTreeMap`-backed stores give the total key order §6 requires for free,
//! at the cost of durability and concurrency this core never asks for.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use super::{Engine, Transaction};
use crate::cnf::SCAN_BATCH_SIZE;
use crate::err::Error;

#[derive(Default)]
struct Shared {
	stores: BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
	indexes: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Default)]
pub struct MemoryEngine {
	shared: Arc<Mutex<Shared>>,
}

impl MemoryEngine {
	pub fn new() -> Self {
		MemoryEngine::default()
	}
}

impl Engine for MemoryEngine {
	type Txn = MemoryTransaction;

	fn begin(&self, read_only: bool) -> Result<Self::Txn, Error> {
		trace!(read_only, "beginning transaction");
		Ok(MemoryTransaction {
			shared: self.shared.clone(),
			read_only,
			undo: Vec::new(),
			closed: false,
		})
	}
}

/// Pulls rows from a store in chunks of `cnf::SCAN_BATCH_SIZE` rather than
/// materializing the whole tail of the range up front, mirroring
/// `surrealdb-core::cnf::PROCESSOR_BATCH_SIZE`'s role in its own scan
/// iterators: the mutex is held only while a batch is being copied out, not
/// for the lifetime of the scan.
struct BatchedAscend {
	shared: Arc<Mutex<Shared>>,
	store: String,
	next_key: Option<Vec<u8>>,
	buffer: VecDeque<(Vec<u8>, Vec<u8>)>,
}

impl Iterator for BatchedAscend {
	type Item = (Vec<u8>, Vec<u8>);

	fn next(&mut self) -> Option<Self::Item> {
		if self.buffer.is_empty() {
			let from = self.next_key.take()?;
			let shared = self.shared.lock().expect("memory engine mutex poisoned");
			let batch: Vec<(Vec<u8>, Vec<u8>)> = shared
				.stores
				.get(&self.store)
				.map(|s| s.range(from..).take(*SCAN_BATCH_SIZE).map(|(k, v)| (k.clone(), v.clone())).collect())
				.unwrap_or_default();
			drop(shared);
			if batch.is_empty() {
				return None;
			}
			// The lexicographically smallest key strictly greater than the
			// last one returned: any key for which that key is a proper
			// prefix sorts immediately after it.
			let mut successor = batch.last().expect("checked non-empty above").0.clone();
			successor.push(0);
			self.next_key = Some(successor);
			self.buffer.extend(batch);
		}
		self.buffer.pop_front()
	}
}

enum Undo {
	Put { store: String, key: Vec<u8>, previous: Option<Vec<u8>> },
	Delete { store: String, key: Vec<u8>, previous: Vec<u8> },
	Truncate { store: String, previous: BTreeMap<Vec<u8>, Vec<u8>> },
}

/// A transaction over [`MemoryEngine`]. Writes apply immediately to the
/// shared map and are unwound from an undo log on `rollback` — there is no
/// snapshot isolation, matching §1's "purely a test fixture" scope.
pub struct MemoryTransaction {
	shared: Arc<Mutex<Shared>>,
	read_only: bool,
	undo: Vec<Undo>,
	closed: bool,
}

impl MemoryTransaction {
	fn require_writable(&self) -> Result<(), Error> {
		if self.read_only {
			return Err(Error::ReadOnlyTransaction);
		}
		Ok(())
	}
}

impl Transaction for MemoryTransaction {
	fn read_only(&self) -> bool {
		self.read_only
	}

	fn get(&self, store: &str, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
		let shared = self.shared.lock().expect("memory engine mutex poisoned");
		Ok(shared.stores.get(store).and_then(|s| s.get(key)).cloned())
	}

	fn put(&mut self, store: &str, key: &[u8], value: &[u8]) -> Result<(), Error> {
		self.require_writable()?;
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		let previous = shared.stores.entry(store.to_string()).or_default().insert(key.to_vec(), value.to_vec());
		self.undo.push(Undo::Put { store: store.to_string(), key: key.to_vec(), previous });
		Ok(())
	}

	fn delete(&mut self, store: &str, key: &[u8]) -> Result<(), Error> {
		self.require_writable()?;
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		if let Some(previous) = shared.stores.entry(store.to_string()).or_default().remove(key) {
			self.undo.push(Undo::Delete { store: store.to_string(), key: key.to_vec(), previous });
		}
		Ok(())
	}

	fn ascend_from(&self, store: &str, key: &[u8]) -> Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_> {
		Box::new(BatchedAscend {
			shared: self.shared.clone(),
			store: store.to_string(),
			next_key: Some(key.to_vec()),
			buffer: VecDeque::new(),
		})
	}

	fn truncate(&mut self, store: &str) -> Result<(), Error> {
		self.require_writable()?;
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		let previous = shared.stores.insert(store.to_string(), BTreeMap::new()).unwrap_or_default();
		self.undo.push(Undo::Truncate { store: store.to_string(), previous });
		Ok(())
	}

	fn create_index(&mut self, table: &str, name: &str) -> Result<(), Error> {
		self.require_writable()?;
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		let names = shared.indexes.entry(table.to_string()).or_default();
		if names.iter().any(|n| n == name) {
			return Err(Error::IndexAlreadyExists(name.to_string()));
		}
		names.push(name.to_string());
		Ok(())
	}

	fn drop_index(&mut self, table: &str, name: &str) -> Result<(), Error> {
		self.require_writable()?;
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		if let Some(names) = shared.indexes.get_mut(table) {
			names.retain(|n| n != name);
		}
		Ok(())
	}

	fn list_indexes(&self, table: &str) -> Vec<String> {
		let shared = self.shared.lock().expect("memory engine mutex poisoned");
		shared.indexes.get(table).cloned().unwrap_or_default()
	}

	fn commit(&mut self) -> Result<(), Error> {
		debug!(writes = self.undo.len(), "committing transaction");
		self.undo.clear();
		self.closed = true;
		Ok(())
	}

	fn rollback(&mut self) -> Result<(), Error> {
		debug!(writes = self.undo.len(), "rolling back transaction");
		let mut shared = self.shared.lock().expect("memory engine mutex poisoned");
		while let Some(entry) = self.undo.pop() {
			match entry {
				Undo::Put { store, key, previous } => {
					let s = shared.stores.entry(store).or_default();
					match previous {
						Some(v) => {
							s.insert(key, v);
						}
						None => {
							s.remove(&key);
						}
					}
				}
				Undo::Delete { store, key, previous } => {
					shared.stores.entry(store).or_default().insert(key, previous);
				}
				Undo::Truncate { store, previous } => {
					shared.stores.insert(store, previous);
				}
			}
		}
		self.closed = true;
		Ok(())
	}
}

impl Drop for MemoryTransaction {
	fn drop(&mut self) {
		if !self.closed && !self.undo.is_empty() {
			trace!("dropping transaction with uncommitted writes still in the undo log");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rollback_restores_prior_state() {
		let engine = MemoryEngine::new();
		let mut txn = engine.begin(false).unwrap();
		txn.put("t", b"k", b"v1").unwrap();
		txn.commit().unwrap();

		let mut txn = engine.begin(false).unwrap();
		txn.put("t", b"k", b"v2").unwrap();
		txn.rollback().unwrap();

		let txn = engine.begin(true).unwrap();
		assert_eq!(txn.get("t", b"k").unwrap(), Some(b"v1".to_vec()));
	}

	#[test]
	fn read_only_transaction_rejects_writes() {
		let engine = MemoryEngine::new();
		let mut txn = engine.begin(true).unwrap();
		assert!(matches!(txn.put("t", b"k", b"v"), Err(Error::ReadOnlyTransaction)));
	}

	#[test]
	fn ascend_from_returns_key_ordered_rows() {
		let engine = MemoryEngine::new();
		let mut txn = engine.begin(false).unwrap();
		txn.put("t", b"b", b"2").unwrap();
		txn.put("t", b"a", b"1").unwrap();
		txn.put("t", b"c", b"3").unwrap();
		let rows: Vec<_> = txn.ascend_from("t", b"a").collect();
		assert_eq!(rows, vec![(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"2".to_vec()), (b"c".to_vec(), b"3".to_vec())]);
	}

	#[test]
	fn ascend_from_spans_multiple_batches() {
		let engine = MemoryEngine::new();
		let mut txn = engine.begin(false).unwrap();
		let total = *SCAN_BATCH_SIZE + 50;
		for i in 0..total {
			let key = (i as u32).to_be_bytes();
			txn.put("t", &key, &key).unwrap();
		}
		let rows: Vec<_> = txn.ascend_from("t", &0u32.to_be_bytes()).collect();
		assert_eq!(rows.len(), total);
		for (i, (k, v)) in rows.iter().enumerate() {
			let expected = (i as u32).to_be_bytes().to_vec();
			assert_eq!(k, &expected);
			assert_eq!(v, &expected);
		}
	}

	#[test]
	fn duplicate_index_creation_errors() {
		let engine = MemoryEngine::new();
		let mut txn = engine.begin(false).unwrap();
		txn.create_index("t", "idx").unwrap();
		assert!(matches!(txn.create_index("t", "idx"), Err(Error::IndexAlreadyExists(_))));
	}
}
