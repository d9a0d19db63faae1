//! The stream executor: drives a [`Stream`] to completion against a
//! [`Transaction`] and [`RecordCodec`] (§4.2 Stream Operators, §5
//! Transactions).
//!
//! Pull-based and synchronous throughout — each transform is a plain
//! [`Iterator`] adapter rather than the teacher's `async fn next` pipeline
//! (REDESIGN FLAG: this core has no tasks to yield to, so `async` would only
//! add an executor dependency with nothing to schedule around it).

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::catalog::Catalog;
use crate::cnf::DISTINCT_BUFFER_LIMIT;
use crate::codec::RecordCodec;
use crate::env::Environment;
use crate::engine::Transaction;
use crate::err::Error;
use crate::expr::Expr;
use crate::path::Path;
use crate::plan::Plan;
use crate::range::Range;
use crate::stream::{ProjectItem, Stream};
use crate::value::{Document, Value};

/// One row flowing through the pipeline: the document plus the primary-key
/// value it was read under (or will be written under), carried alongside so
/// `pk()` and index maintenance never need to re-derive it from the
/// document's current field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	pub id: Value,
	pub document: Value,
}

impl Row {
	pub fn new(id: Value, document: Value) -> Self {
		Row { id, document }
	}
}

type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, Error>> + 'a>;

/// Executes plans against one transaction and one table/index schema
/// catalog. Stateless beyond its two borrowed collaborators — a fresh
/// `Executor` is cheap to build per statement.
pub struct Executor<'a> {
	codec: &'a dyn RecordCodec,
	catalog: &'a dyn Catalog,
}

impl<'a> Executor<'a> {
	pub fn new(codec: &'a dyn RecordCodec, catalog: &'a dyn Catalog) -> Self {
		Executor { codec, catalog }
	}

	/// Run `plan` to completion, returning every row it produced (the rows
	/// read, for a read-only plan; the rows written, for a mutating one).
	pub fn execute<'e, T: Transaction>(&self, txn: &mut T, plan: &Plan, env: &'e Environment<'e>) -> Result<Vec<Row>, Error> {
		if !plan.read_only && txn.read_only() {
			return Err(Error::ReadOnlyTransaction);
		}
		self.run(txn, &plan.stream, env)
	}

	fn run<'e, T: Transaction>(&self, txn: &mut T, stream: &Stream, env: &'e Environment<'e>) -> Result<Vec<Row>, Error> {
		match stream {
			Stream::TableInsert { input, table } => {
				let rows = self.read(&*txn, input, env)?;
				for row in &rows {
					self.insert(txn, table, row)?;
				}
				trace!(table, inserted = rows.len(), "executed TableInsert");
				Ok(rows)
			}
			Stream::TableDelete { input, table } => {
				let rows = self.read(&*txn, input, env)?;
				for row in &rows {
					self.delete(txn, table, row)?;
				}
				trace!(table, deleted = rows.len(), "executed TableDelete");
				Ok(rows)
			}
			Stream::TableReplace { input, table } => {
				let rows = self.read(&*txn, input, env)?;
				for row in &rows {
					self.replace(txn, table, row)?;
				}
				trace!(table, replaced = rows.len(), "executed TableReplace");
				Ok(rows)
			}
			Stream::Truncate { table } => {
				txn.truncate(table)?;
				if let Some(schema) = self.catalog.schema(table) {
					for ix in &schema.indexes {
						txn.truncate(&index_store(table, &ix.name))?;
					}
				}
				trace!(table, "executed Truncate");
				Ok(Vec::new())
			}
			other => self.read(&*txn, other, env),
		}
	}

	/// Materialize a read-only subtree. Builds a lazy iterator chain and
	/// drains it here, where the transaction's shared borrow ends before
	/// any caller-side mutation begins (§5: a statement's writes are never
	/// interleaved with its own reads).
	fn read<'e, T: Transaction>(&self, txn: &'e T, stream: &Stream, env: &'e Environment<'e>) -> Result<Vec<Row>, Error> {
		build(stream, txn, self.codec, env)?.collect()
	}

	/// Writes a single document under `row.id`, maintaining every declared
	/// index. The public entry point for a literal `INSERT ... VALUES` row,
	/// which (unlike a `TableInsert` whose input is itself a query) has no
	/// stream to pull from (§4.2 supplemental: literal inserts are not
	/// query results).
	pub fn insert<T: Transaction>(&self, txn: &mut T, table: &str, row: &Row) -> Result<(), Error> {
		let schema = self.catalog.schema(table).ok_or_else(|| Error::TableNotFound { table: table.to_string() });
		let pk_key = crate::keycodec::encode_key(&row.id);
		if txn.get(table, &pk_key)?.is_some() {
			return Err(Error::PrimaryKeyCollision { table: table.to_string(), value: row.id.render() });
		}
		let doc = document_of(&row.document)?;
		let bytes = self.codec.encode(doc)?;
		txn.put(table, &pk_key, &bytes)?;
		if let Ok(schema) = schema {
			for ix in &schema.indexes {
				self.index_insert(txn, table, ix, &row.id, &row.document)?;
			}
		}
		Ok(())
	}

	/// Removes the document at `row.id`, if any, cleaning up its index
	/// entries. The public counterpart to [`Executor::insert`] for a literal
	/// `DELETE` by primary key.
	pub fn delete<T: Transaction>(&self, txn: &mut T, table: &str, row: &Row) -> Result<(), Error> {
		let pk_key = crate::keycodec::encode_key(&row.id);
		let existing = txn.get(table, &pk_key)?;
		txn.delete(table, &pk_key)?;
		if let (Some(schema), Some(bytes)) = (self.catalog.schema(table), existing) {
			let old = Value::Document(self.codec.decode(&bytes)?);
			for ix in &schema.indexes {
				self.index_remove(txn, table, ix, &row.id, &old)?;
			}
		}
		Ok(())
	}

	/// Upserts `row.document` at `row.id`: writes the new document and
	/// reconciles index entries against whatever document (if any) is
	/// currently stored there.
	pub fn replace<T: Transaction>(&self, txn: &mut T, table: &str, row: &Row) -> Result<(), Error> {
		let pk_key = crate::keycodec::encode_key(&row.id);
		let existing = txn.get(table, &pk_key)?;
		let doc = document_of(&row.document)?;
		let bytes = self.codec.encode(doc)?;
		txn.put(table, &pk_key, &bytes)?;
		if let Some(schema) = self.catalog.schema(table) {
			if let Some(old_bytes) = existing {
				let old = Value::Document(self.codec.decode(&old_bytes)?);
				for ix in &schema.indexes {
					self.index_remove(txn, table, ix, &row.id, &old)?;
				}
			}
			for ix in &schema.indexes {
				self.index_insert(txn, table, ix, &row.id, &row.document)?;
			}
		}
		Ok(())
	}

	fn index_insert<T: Transaction>(
		&self,
		txn: &mut T,
		table: &str,
		ix: &crate::catalog::IndexDef,
		pk: &Value,
		document: &Value,
	) -> Result<(), Error> {
		let store = index_store(table, &ix.name);
		let value = document.get_path(&ix.path);
		let key = crate::keycodec::encode_key(&value);
		let pk_bytes = crate::keycodec::encode_key(pk);
		let existing = txn.get(&store, &key)?.map(|b| crate::keycodec::decode_pk_list(&b)).unwrap_or_default();
		if ix.unique && !existing.is_empty() && existing != [pk_bytes.clone()] {
			return Err(Error::DuplicateKey { index: ix.name.clone(), value: value.render() });
		}
		let mut pks = existing;
		if !pks.contains(&pk_bytes) {
			pks.push(pk_bytes);
		}
		txn.put(&store, &key, &crate::keycodec::encode_pk_list(&pks))
	}

	fn index_remove<T: Transaction>(
		&self,
		txn: &mut T,
		table: &str,
		ix: &crate::catalog::IndexDef,
		pk: &Value,
		document: &Value,
	) -> Result<(), Error> {
		let store = index_store(table, &ix.name);
		let value = document.get_path(&ix.path);
		let key = crate::keycodec::encode_key(&value);
		let pk_bytes = crate::keycodec::encode_key(pk);
		let Some(existing) = txn.get(&store, &key)? else { return Ok(()) };
		let mut pks = crate::keycodec::decode_pk_list(&existing);
		pks.retain(|p| p != &pk_bytes);
		if pks.is_empty() {
			txn.delete(&store, &key)
		} else {
			txn.put(&store, &key, &crate::keycodec::encode_pk_list(&pks))
		}
	}
}

fn index_store(table: &str, index: &str) -> String {
	format!("index:{table}:{index}")
}

fn document_of(v: &Value) -> Result<&Document, Error> {
	v.as_document().ok_or_else(|| Error::InvalidStatementTarget { value: v.render() })
}

fn build<'a, T: Transaction>(
	stream: &Stream,
	txn: &'a T,
	codec: &'a dyn RecordCodec,
	env: &'a Environment<'a>,
) -> Result<RowIter<'a>, Error> {
	match stream {
		Stream::Empty => Ok(Box::new(std::iter::empty())),
		Stream::SeqScan { table } => Ok(Box::new(TableScan::new(txn, codec, table.clone(), Vec::new()))),
		Stream::PkScan { table, ranges } => Ok(Box::new(TableScan::new(txn, codec, table.clone(), ranges.clone()))),
		Stream::IndexScan { table, index, ranges } => {
			Ok(Box::new(IndexScan::new(txn, codec, table.clone(), index.clone(), ranges.clone())))
		}
		Stream::Filter { input, expr } => {
			let inner = build(input, txn, codec, env)?;
			let expr = expr.clone();
			Ok(Box::new(inner.filter_map(move |item| match item {
				Ok(row) => match expr.eval(&env.child_row(row.id.clone(), row.document.clone())) {
					Ok(v) if v.is_truthy() => Some(Ok(row)),
					Ok(_) => None,
					Err(e) => Some(Err(e)),
				},
				Err(e) => Some(Err(e)),
			})))
		}
		Stream::Project { input, items } => {
			let inner = build(input, txn, codec, env)?;
			let items = items.clone();
			Ok(Box::new(inner.map(move |item| item.and_then(|row| project(&row, &items, env)))))
		}
		Stream::Sort { input, expr, desc } => {
			let mut rows = build(input, txn, codec, env)?.collect::<Result<Vec<_>, _>>()?;
			let mut keys = Vec::with_capacity(rows.len());
			for row in &rows {
				keys.push(expr.eval(&env.child_row(row.id.clone(), row.document.clone()))?);
			}
			let order = sort_order(rows.len(), &keys, *desc);
			let placeholder = Row { id: Value::Null, document: Value::Null };
			let sorted: Vec<Row> = order.into_iter().map(|i| std::mem::replace(&mut rows[i], placeholder.clone())).collect();
			Ok(Box::new(sorted.into_iter().map(Ok)))
		}
		Stream::Take { input, n } => Ok(Box::new(build(input, txn, codec, env)?.take(*n as usize))),
		Stream::Skip { input, n } => Ok(Box::new(build(input, txn, codec, env)?.skip(*n as usize))),
		Stream::Distinct { input } => {
			let inner = build(input, txn, codec, env)?;
			// Dedup key is the document's canonical `render()` string (§9
			// open question (b)), not `Value`'s own `Hash`/`Eq` — those
			// treat `Integer`/`Double` as one numeric equality group (so
			// `=` and `IS` compare across the two kinds), whereas `render()`
			// deliberately keeps them distinct here.
			let mut seen = HashSet::new();
			let mut warned = false;
			Ok(Box::new(inner.filter_map(move |item| match item {
				Ok(row) => {
					if seen.len() >= *DISTINCT_BUFFER_LIMIT && !warned {
						warn!(limit = *DISTINCT_BUFFER_LIMIT, "Distinct dedup set exceeded its advisory limit");
						warned = true;
					}
					if seen.insert(row.document.render()) {
						Some(Ok(row))
					} else {
						None
					}
				}
				Err(e) => Some(Err(e)),
			})))
		}
		Stream::TableInsert { .. }
		| Stream::TableDelete { .. }
		| Stream::TableReplace { .. }
		| Stream::Truncate { .. } => {
			unreachable!("sinks are handled by Executor::run before reaching build()")
		}
	}
}

fn sort_order(len: usize, keys: &[Value], desc: bool) -> Vec<usize> {
	let mut indices: Vec<usize> = (0..len).collect();
	if desc {
		indices.sort_by(|&a, &b| keys[b].cmp(&keys[a]));
	} else {
		indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
	}
	indices
}

fn project<'e>(row: &Row, items: &[ProjectItem], env: &'e Environment<'e>) -> Result<Row, Error> {
	let row_env = env.child_row(row.id.clone(), row.document.clone());
	let mut out = Document::new();
	for item in items {
		match (&item.expr, &item.alias) {
			(Expr::Wildcard, None) => {
				if let Value::Document(doc) = &row.document {
					for (k, v) in doc {
						out.insert(k.clone(), v.clone());
					}
				}
			}
			(Expr::Wildcard, Some(alias)) => {
				out.insert(alias.clone(), row.document.clone());
			}
			(Expr::Path(path), None) => {
				out.insert(field_name(path), item.expr.eval(&row_env)?);
			}
			(expr, None) => {
				out.insert(expr.render(), expr.eval(&row_env)?);
			}
			(expr, Some(alias)) => {
				out.insert(alias.clone(), expr.eval(&row_env)?);
			}
		}
	}
	Ok(Row { id: row.id.clone(), document: Value::Document(out) })
}

fn field_name(path: &Path) -> String {
	match path.fragments().last() {
		Some(crate::path::Fragment::Field(name)) => name.clone(),
		_ => path.to_string(),
	}
}

/// Iterates a table's primary store, restricted to the union of `ranges`
/// (empty means unrestricted — the `SeqScan` case).
struct TableScan<'a, T: Transaction> {
	txn: &'a T,
	codec: &'a dyn RecordCodec,
	table: String,
	ranges: Vec<Range>,
	cursor: Vec<u8>,
}

impl<'a, T: Transaction> TableScan<'a, T> {
	fn new(txn: &'a T, codec: &'a dyn RecordCodec, table: String, ranges: Vec<Range>) -> Self {
		TableScan { txn, codec, table, ranges, cursor: Vec::new() }
	}
}

impl<'a, T: Transaction> Iterator for TableScan<'a, T> {
	type Item = Result<Row, Error>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let mut it = self.txn.ascend_from(&self.table, &self.cursor);
			let (key, bytes) = it.next()?;
			drop(it);
			self.cursor = next_cursor(&key);
			let id = match decode_pk(&key) {
				Some(v) => v,
				None => continue,
			};
			if !self.ranges.is_empty() && !self.ranges.iter().any(|r| r.contains(&id)) {
				continue;
			}
			return Some(self.codec.decode(&bytes).map(|doc| Row { id, document: Value::Document(doc) }));
		}
	}
}

/// Iterates a secondary index store, restricted to `ranges` on the indexed
/// value, resolving each matching entry's primary-key list back into rows.
struct IndexScan<'a, T: Transaction> {
	txn: &'a T,
	codec: &'a dyn RecordCodec,
	table: String,
	store: String,
	ranges: Vec<Range>,
	cursor: Vec<u8>,
	pending: Vec<Vec<u8>>,
	done: bool,
}

impl<'a, T: Transaction> IndexScan<'a, T> {
	fn new(txn: &'a T, codec: &'a dyn RecordCodec, table: String, index: String, ranges: Vec<Range>) -> Self {
		let store = index_store(&table, &index);
		IndexScan { txn, codec, table, store, ranges, cursor: Vec::new(), pending: Vec::new(), done: false }
	}
}

impl<'a, T: Transaction> Iterator for IndexScan<'a, T> {
	type Item = Result<Row, Error>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(pk_bytes) = self.pending.pop() {
				return Some(self.fetch(&pk_bytes));
			}
			if self.done {
				return None;
			}
			let mut it = self.txn.ascend_from(&self.store, &self.cursor);
			let (key, value) = match it.next() {
				Some(entry) => entry,
				None => {
					self.done = true;
					continue;
				}
			};
			drop(it);
			self.cursor = next_cursor(&key);
			let indexed = match decode_pk(&key) {
				Some(v) => v,
				None => continue,
			};
			if !self.ranges.is_empty() && !self.ranges.iter().any(|r| r.contains(&indexed)) {
				continue;
			}
			self.pending = crate::keycodec::decode_pk_list(&value);
		}
	}
}

impl<'a, T: Transaction> IndexScan<'a, T> {
	fn fetch(&self, pk_bytes: &[u8]) -> Result<Row, Error> {
		let bytes = self.txn.get(&self.table, pk_bytes)?.ok_or(Error::KeyNotFound)?;
		let id = decode_pk(pk_bytes).unwrap_or(Value::Null);
		let doc = self.codec.decode(&bytes)?;
		Ok(Row { id, document: Value::Document(doc) })
	}
}

/// The key immediately after `key` in byte order, used to advance
/// `ascend_from`'s inclusive cursor past the entry just read.
fn next_cursor(key: &[u8]) -> Vec<u8> {
	let mut next = key.to_vec();
	next.push(0);
	next
}

/// Recovers the `Value` a store key was encoded from, for keys produced by
/// [`crate::keycodec::encode_key`]. Best-effort: only the scalar kinds
/// `encode_key` actually emits losslessly are recognised; anything else
/// decodes to `Null` rather than failing the scan.
fn decode_pk(key: &[u8]) -> Option<Value> {
	crate::keycodec::decode_key(key)
}
