//! The dynamic [`Value`] type: a tagged union over scalar and composite
//! database values (§3 Data model).
//!
//! Arithmetic and comparison are dispatched once per operator call site as a
//! match over the operand-type pair, rather than through virtual dispatch per
//! value, per §9 Design notes.

pub(crate) mod arith;
pub mod convert;
mod ord;
mod render;

use std::fmt;

use indexmap::IndexMap;

use crate::err::Error;

/// A document: an order-preserving mapping of field name to [`Value`].
///
/// Field order is insertion order and is significant — `Project`'s
/// `Wildcard` expands fields in their existing order (§4.2) — which is why
/// this uses [`IndexMap`] rather than a sorted map.
pub type Document = IndexMap<String, Value>;

/// A discriminated union over every representable database value (§3).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Value {
	Null,
	Bool(bool),
	Integer(i64),
	Double(f64),
	Text(String),
	Blob(Vec<u8>),
	Array(Vec<Value>),
	Document(Document),
}

impl Default for Value {
	fn default() -> Self {
		Value::Null
	}
}

impl Value {
	/// Truthiness: non-zero scalar, non-empty collection, non-null (§3).
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Bool(b) => *b,
			Value::Integer(n) => *n != 0,
			Value::Double(d) => *d != 0.0,
			Value::Text(s) => !s.is_empty(),
			Value::Blob(b) => !b.is_empty(),
			Value::Array(a) => !a.is_empty(),
			Value::Document(d) => !d.is_empty(),
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn is_numeric(&self) -> bool {
		matches!(self, Value::Integer(_) | Value::Double(_))
	}

	/// The name of this value's kind, used in error messages and in
	/// `render()`'s disambiguation of otherwise-ambiguous literals.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Integer(_) => "integer",
			Value::Double(_) => "double",
			Value::Text(_) => "text",
			Value::Blob(_) => "blob",
			Value::Array(_) => "array",
			Value::Document(_) => "document",
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Integer(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Integer(n) => Some(*n as f64),
			Value::Double(d) => Some(*d),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(a) => Some(a),
			_ => None,
		}
	}

	pub fn as_document(&self) -> Option<&Document> {
		match self {
			Value::Document(d) => Some(d),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render())
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Integer(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Double(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::Blob(v)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::Array(v)
	}
}

impl From<Document> for Value {
	fn from(v: Document) -> Self {
		Value::Document(v)
	}
}

/// Resolve a dotted/indexed [`crate::path::Path`] against this value,
/// returning `Null` for a missing path rather than an error (§4.1 Path/Param
/// null rule).
impl Value {
	pub fn get_path(&self, path: &crate::path::Path) -> Value {
		let mut cur = self;
		for frag in path.fragments() {
			match (cur, frag) {
				(Value::Document(doc), crate::path::Fragment::Field(name)) => {
					match doc.get(name) {
						Some(v) => cur = v,
						None => return Value::Null,
					}
				}
				(Value::Array(arr), crate::path::Fragment::Index(i)) => {
					match usize::try_from(*i).ok().and_then(|i| arr.get(i)) {
						Some(v) => cur = v,
						None => return Value::Null,
					}
				}
				_ => return Value::Null,
			}
		}
		cur.clone()
	}
}

pub(crate) type ValueResult = Result<Value, Error>;
