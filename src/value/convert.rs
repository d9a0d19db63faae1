//! Lossless conversion between compatible [`Value`] kinds (§3, §4.4).
//!
//! A conversion is lossless when it preserves the represented value exactly:
//! integer↔double when representable, text↔blob, and array-of-numbers
//! widened elementwise when every element converts losslessly.

use super::Value;

/// The declared type of a path, as known to the catalog (§3 Catalog). Used
/// by the index-selection rule to decide whether a literal can be
/// losslessly coerced to the type an index actually stores.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueKind {
	Null,
	Bool,
	Integer,
	Double,
	Text,
	Blob,
	/// An array whose elements are each declared to have the given kind.
	Array(Box<ValueKind>),
}

impl ValueKind {
	pub fn name(&self) -> String {
		match self {
			ValueKind::Null => "null".to_string(),
			ValueKind::Bool => "bool".to_string(),
			ValueKind::Integer => "integer".to_string(),
			ValueKind::Double => "double".to_string(),
			ValueKind::Text => "text".to_string(),
			ValueKind::Blob => "blob".to_string(),
			ValueKind::Array(inner) => format!("array<{}>", inner.name()),
		}
	}
}

/// The largest integer magnitude exactly representable as an `f64`.
const MAX_SAFE_DOUBLE_INT: i64 = 1 << 53;

/// Whether `n` can be converted to `f64` and back without loss.
pub fn int_to_double_lossless(n: i64) -> bool {
	n.unsigned_abs() <= MAX_SAFE_DOUBLE_INT as u64
}

/// Whether `d` represents an exact integer that fits in `i64`.
pub fn double_to_int_lossless(d: f64) -> bool {
	d.fract() == 0.0 && d >= i64::MIN as f64 && d <= i64::MAX as f64
}

/// Attempt to coerce `value` to the declared `kind` without losing
/// information. Returns `None` if the literal's kind is incompatible with
/// `kind` or the conversion would be lossy (§4.4 Type coercion).
pub fn coerce_lossless(value: &Value, kind: &ValueKind) -> Option<Value> {
	match (value, kind) {
		(v, ValueKind::Null) => {
			if matches!(v, Value::Null) {
				Some(Value::Null)
			} else {
				None
			}
		}
		(Value::Bool(b), ValueKind::Bool) => Some(Value::Bool(*b)),
		(Value::Integer(n), ValueKind::Integer) => Some(Value::Integer(*n)),
		(Value::Double(d), ValueKind::Double) => Some(Value::Double(*d)),
		(Value::Integer(n), ValueKind::Double) => {
			if int_to_double_lossless(*n) {
				Some(Value::Double(*n as f64))
			} else {
				None
			}
		}
		(Value::Double(d), ValueKind::Integer) => {
			if double_to_int_lossless(*d) {
				Some(Value::Integer(*d as i64))
			} else {
				None
			}
		}
		(Value::Text(s), ValueKind::Text) => Some(Value::Text(s.clone())),
		(Value::Blob(b), ValueKind::Blob) => Some(Value::Blob(b.clone())),
		(Value::Text(s), ValueKind::Blob) => Some(Value::Blob(s.as_bytes().to_vec())),
		(Value::Blob(b), ValueKind::Text) => {
			String::from_utf8(b.clone()).ok().map(Value::Text)
		}
		(Value::Array(items), ValueKind::Array(elem_kind)) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(coerce_lossless(item, elem_kind)?);
			}
			Some(Value::Array(out))
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integer_to_double_lossless() {
		assert_eq!(coerce_lossless(&Value::Integer(1), &ValueKind::Double), Some(Value::Double(1.0)));
	}

	#[test]
	fn double_to_integer_lossy_rejected() {
		assert_eq!(coerce_lossless(&Value::Double(1.1), &ValueKind::Integer), None);
	}

	#[test]
	fn array_elementwise_widening() {
		let lit = Value::Array(vec![Value::Integer(1), Value::Double(1.5)]);
		let coerced = coerce_lossless(&lit, &ValueKind::Array(Box::new(ValueKind::Double)));
		assert_eq!(coerced, Some(Value::Array(vec![Value::Double(1.0), Value::Double(1.5)])));
	}

	#[test]
	fn array_elementwise_lossy_discards_whole_literal() {
		let lit = Value::Array(vec![Value::Integer(1), Value::Double(1.1)]);
		let coerced = coerce_lossless(&lit, &ValueKind::Array(Box::new(ValueKind::Integer)));
		assert_eq!(coerced, None);
	}
}
