//! Evaluation environment: the current document plus bound parameters,
//! with optional parent scoping for nested evaluation contexts (§3).

use std::collections::HashMap;

use crate::value::Value;

/// The context against which an [`crate::expr::Expr`] is evaluated: the row
/// currently in scope (if any) and the parameters bound for this statement.
///
/// A child environment (e.g. for a subquery) may chain to a `parent` so that
/// outer parameters remain visible without copying them.
#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
	current: Option<Value>,
	record_id: Option<Value>,
	positional: HashMap<u32, Value>,
	named: HashMap<String, Value>,
	parent: Option<&'a Environment<'a>>,
}

impl<'a> Environment<'a> {
	pub fn new() -> Self {
		Environment::default()
	}

	pub fn with_current(current: Value) -> Self {
		Environment {
			current: Some(current),
			..Environment::default()
		}
	}

	/// An environment for a single scanned row: its primary-key value (used
	/// by the `pk()` function) and its document.
	pub fn with_row(record_id: Value, document: Value) -> Self {
		Environment {
			current: Some(document),
			record_id: Some(record_id),
			..Environment::default()
		}
	}

	pub fn child(&'a self, current: Value) -> Environment<'a> {
		Environment {
			current: Some(current),
			parent: Some(self),
			..Environment::default()
		}
	}

	/// A child scope for one scanned row, chained to `self` so parameters
	/// bound on the statement remain visible while the row's own document
	/// and primary key take over `current()`/`record_id()` (used by the
	/// executor to evaluate a `Filter`/`Project`/`Sort` expression per row).
	pub fn child_row(&'a self, record_id: Value, current: Value) -> Environment<'a> {
		Environment {
			current: Some(current),
			record_id: Some(record_id),
			parent: Some(self),
			..Environment::default()
		}
	}

	pub fn bind_positional(&mut self, index: u32, value: Value) {
		self.positional.insert(index, value);
	}

	pub fn bind_named(&mut self, name: impl Into<String>, value: Value) {
		self.named.insert(name.into(), value);
	}

	/// The document in scope for an unqualified field reference, or `Null`
	/// if there is none (§4.1 Path/Param null rule).
	pub fn current(&self) -> Value {
		self.current.clone().unwrap_or(Value::Null)
	}

	/// The primary-key value of the row in scope, or `Null` outside a row
	/// context — the value the `pk()` function evaluates to.
	pub fn record_id(&self) -> Value {
		if let Some(id) = &self.record_id {
			return id.clone();
		}
		match self.parent {
			Some(parent) => parent.record_id(),
			None => Value::Null,
		}
	}

	/// A bound positional parameter, or `None` if unbound anywhere up the
	/// parent chain — unlike a missing path, a missing parameter is a
	/// planning error (§4.1 Path/Param type rules).
	pub fn positional(&self, index: u32) -> Option<Value> {
		if let Some(v) = self.positional.get(&index) {
			return Some(v.clone());
		}
		self.parent.and_then(|parent| parent.positional(index))
	}

	/// A bound named parameter, or `None` if unbound anywhere up the parent
	/// chain.
	pub fn named(&self, name: &str) -> Option<Value> {
		if let Some(v) = self.named.get(name) {
			return Some(v.clone());
		}
		self.parent.and_then(|parent| parent.named(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unbound_param_is_none() {
		let env = Environment::new();
		assert_eq!(env.named("missing"), None);
		assert_eq!(env.positional(0), None);
	}

	#[test]
	fn child_sees_parent_params() {
		let mut parent = Environment::new();
		parent.bind_named("x", Value::Integer(1));
		let child = parent.child(Value::Null);
		assert_eq!(child.named("x"), Some(Value::Integer(1)));
	}

	#[test]
	fn no_current_document_is_null() {
		let env = Environment::new();
		assert_eq!(env.current(), Value::Null);
	}

	#[test]
	fn record_id_defaults_to_null() {
		let env = Environment::with_current(Value::Null);
		assert_eq!(env.record_id(), Value::Null);
	}
}
