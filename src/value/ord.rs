//! Equality, hashing and total ordering for [`Value`] (§3: "total ordering
//! within comparable type groups").
//!
//! Integer and Double share a numeric group and compare by promoting the
//! integer operand to `f64` (mirroring arithmetic promotion); every other
//! kind is only ever compared to its own kind, with cross-kind comparisons
//! falling back to a fixed kind rank so the overall order is still total
//! (needed by `Sort`, range bookkeeping and `BTreeMap`-backed grouping).

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::Value;

fn kind_rank(v: &Value) -> u8 {
	match v {
		Value::Null => 0,
		Value::Bool(_) => 1,
		Value::Integer(_) | Value::Double(_) => 2,
		Value::Text(_) => 3,
		Value::Blob(_) => 4,
		Value::Array(_) => 5,
		Value::Document(_) => 6,
	}
}

impl Value {
	fn numeric_cmp(a: f64, b: f64) -> Ordering {
		a.total_cmp(&b)
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Value {}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Value {
	fn cmp(&self, other: &Self) -> Ordering {
		use Value::*;
		match (self, other) {
			(Null, Null) => Ordering::Equal,
			(Bool(a), Bool(b)) => a.cmp(b),
			(Integer(a), Integer(b)) => a.cmp(b),
			(Double(a), Double(b)) => Self::numeric_cmp(*a, *b),
			(Integer(a), Double(b)) => Self::numeric_cmp(*a as f64, *b),
			(Double(a), Integer(b)) => Self::numeric_cmp(*a, *b as f64),
			(Text(a), Text(b)) => a.cmp(b),
			(Blob(a), Blob(b)) => a.cmp(b),
			(Array(a), Array(b)) => a.cmp(b),
			(Document(a), Document(b)) => {
				let av: Vec<(&String, &Value)> = a.iter().collect();
				let bv: Vec<(&String, &Value)> = b.iter().collect();
				av.cmp(&bv)
			}
			_ => kind_rank(self).cmp(&kind_rank(other)),
		}
	}
}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		kind_rank(self).hash(state);
		match self {
			Value::Null => {}
			Value::Bool(b) => b.hash(state),
			// Integer and Double share a numeric equality group (`cmp`
			// promotes the integer to `f64` via `total_cmp`), so they must
			// hash on the same promoted bit pattern — otherwise values
			// `Eq` to each other could hash differently.
			Value::Integer(n) => (*n as f64).to_bits().hash(state),
			Value::Double(d) => d.to_bits().hash(state),
			Value::Text(s) => s.hash(state),
			Value::Blob(b) => b.hash(state),
			Value::Array(a) => a.hash(state),
			Value::Document(d) => {
				for (k, v) in d.iter() {
					k.hash(state);
					v.hash(state);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_group_orders_across_kinds() {
		assert!(Value::Integer(1) < Value::Integer(2));
		assert!(Value::Integer(1) == Value::Double(1.0));
		assert!(Value::Integer(1) < Value::Double(1.5));
		assert!(Value::Double(0.5) < Value::Integer(1));
	}

	#[test]
	fn kinds_fall_back_to_rank() {
		assert!(Value::Null < Value::Bool(false));
		assert!(Value::Bool(true) < Value::Integer(0));
		assert!(Value::Integer(1_000_000) < Value::Text("a".into()));
	}

	#[test]
	fn arrays_compare_lexicographically() {
		let a = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
		let b = Value::Array(vec![Value::Integer(1), Value::Integer(3)]);
		assert!(a < b);
	}

	#[test]
	fn equal_numeric_values_hash_equally() {
		use std::collections::hash_map::DefaultHasher;

		fn hash_of(v: &Value) -> u64 {
			let mut hasher = DefaultHasher::new();
			v.hash(&mut hasher);
			hasher.finish()
		}

		let a = Value::Integer(1);
		let b = Value::Double(1.0);
		assert_eq!(a, b);
		assert_eq!(hash_of(&a), hash_of(&b));
	}
}
