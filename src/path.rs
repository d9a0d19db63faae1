//! Field paths: a non-empty sequence of field-name or array-index fragments
//! used to address into a [`crate::value::Value::Document`] (§3, §4.1 Path).

use std::fmt;

/// One step of a [`Path`]: a document field name or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
	Field(String),
	Index(i64),
}

impl fmt::Display for Fragment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Fragment::Field(name) => write!(f, "{name}"),
			Fragment::Index(i) => write!(f, "[{i}]"),
		}
	}
}

/// A non-empty sequence of [`Fragment`]s addressing a value nested inside a
/// document or array, e.g. `user.address.city` or `tags[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<Fragment>);

impl Path {
	/// Construct a path from its fragments. Panics if `fragments` is empty —
	/// a path with no fragments cannot address anything.
	pub fn new(fragments: Vec<Fragment>) -> Self {
		assert!(!fragments.is_empty(), "a Path must have at least one fragment");
		Path(fragments)
	}

	/// A single-field path, the common case (`user`, `name`, ...).
	pub fn field(name: impl Into<String>) -> Self {
		Path(vec![Fragment::Field(name.into())])
	}

	pub fn fragments(&self) -> &[Fragment] {
		&self.0
	}

	/// The leading field name, when this path's first fragment is a field —
	/// used by the planner to match a path against a table's declared
	/// primary key or index paths (§4.4).
	pub fn root_field(&self) -> Option<&str> {
		match self.0.first() {
			Some(Fragment::Field(name)) => Some(name.as_str()),
			_ => None,
		}
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, frag) in self.0.iter().enumerate() {
			match frag {
				Fragment::Field(_) if i > 0 => write!(f, ".{frag}")?,
				_ => write!(f, "{frag}")?,
			}
		}
		Ok(())
	}
}
