//! Read-only table/index metadata supplied to the planner (§3 Catalog,
//! supplemental). The core never mutates this; it is handed in by whatever
//! maintains table definitions above this layer (out of scope per §1).

use std::collections::HashMap;

use crate::path::Path;
use crate::value::convert::ValueKind;

/// One secondary index on a table.
#[derive(Debug, Clone)]
pub struct IndexDef {
	pub name: String,
	pub path: Path,
	pub unique: bool,
	/// The declared type of values stored under `path`, if known — used by
	/// `UseIndex`'s type-coercion gate (§4.4).
	pub value_kind: Option<ValueKind>,
}

/// The schema the planner consults when choosing between `SeqScan`,
/// `PkScan` and `IndexScan` for a table (§4.4 Index Selection Rule).
#[derive(Debug, Clone)]
pub struct TableSchema {
	pub table: String,
	pub primary_key: Path,
	/// The declared type of the primary key, if known — gates `UseIndex`'s
	/// `PkScan` candidate the same way `IndexDef::value_kind` gates a
	/// secondary index (§4.4 Type coercion: the primary key is still a
	/// governing index and isn't exempt from the coercion check).
	pub primary_key_kind: Option<ValueKind>,
	pub indexes: Vec<IndexDef>,
}

impl TableSchema {
	pub fn new(table: impl Into<String>, primary_key: Path) -> Self {
		TableSchema {
			table: table.into(),
			primary_key,
			primary_key_kind: None,
			indexes: Vec::new(),
		}
	}

	pub fn with_primary_key_kind(mut self, kind: ValueKind) -> Self {
		self.primary_key_kind = Some(kind);
		self
	}

	pub fn with_index(mut self, index: IndexDef) -> Self {
		self.indexes.push(index);
		self
	}

	/// Every index declared on `path`, in declaration order — a path may be
	/// covered by more than one index (e.g. a unique and a non-unique one).
	pub fn indexes_on<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a IndexDef> + 'a {
		self.indexes.iter().filter(move |ix| &ix.path == path)
	}

	pub fn is_primary_key(&self, path: &Path) -> bool {
		&self.primary_key == path
	}
}

/// What the planner needs from whatever owns table definitions: schema
/// lookup by name. Implemented here for a plain `HashMap` so tests and the
/// in-memory engine don't need a bespoke catalog type.
pub trait Catalog {
	fn schema(&self, table: &str) -> Option<&TableSchema>;
}

impl Catalog for HashMap<String, TableSchema> {
	fn schema(&self, table: &str) -> Option<&TableSchema> {
		self.get(table)
	}
}
