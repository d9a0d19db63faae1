//! Range algebra over the [`Value`] lattice (§3 Range, §4.5), grounded on
//! the teacher's `idx::planner::plan::RangeValue`/`UnionRangeQueryBuilder`
//! bound-tightening logic, simplified from "from"/"to" bound objects to a
//! single struct with explicit exclusivity flags.

use crate::value::Value;

/// A half-open or point interval on the `Value` lattice (§3 Range).
///
/// `exact: true` denotes a point lookup: `min == max`, both inclusive, and
/// the exclusive flags are meaningless (always left `false`).
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
	pub min: Option<Value>,
	pub max: Option<Value>,
	pub exclusive_min: bool,
	pub exclusive_max: bool,
	pub exact: bool,
}

impl Range {
	pub fn exact(v: Value) -> Self {
		Range {
			min: Some(v.clone()),
			max: Some(v),
			exclusive_min: false,
			exclusive_max: false,
			exact: true,
		}
	}

	pub fn less_than(v: Value) -> Self {
		Range {
			min: None,
			max: Some(v),
			exclusive_min: false,
			exclusive_max: true,
			exact: false,
		}
	}

	pub fn less_than_or_equal(v: Value) -> Self {
		Range {
			min: None,
			max: Some(v),
			exclusive_min: false,
			exclusive_max: false,
			exact: false,
		}
	}

	pub fn more_than(v: Value) -> Self {
		Range {
			min: Some(v),
			max: None,
			exclusive_min: true,
			exclusive_max: false,
			exact: false,
		}
	}

	pub fn more_than_or_equal(v: Value) -> Self {
		Range {
			min: Some(v),
			max: None,
			exclusive_min: false,
			exclusive_max: false,
			exact: false,
		}
	}

	pub fn between(low: Value, high: Value) -> Self {
		Range {
			min: Some(low),
			max: Some(high),
			exclusive_min: false,
			exclusive_max: false,
			exact: false,
		}
	}

	/// Whether this range cannot contain any value (a crossed or empty
	/// bound pair). Representable but never emitted by the planner (§3).
	pub fn is_empty(&self) -> bool {
		match (&self.min, &self.max) {
			(Some(min), Some(max)) => match min.cmp(max) {
				std::cmp::Ordering::Greater => true,
				std::cmp::Ordering::Equal => self.exclusive_min || self.exclusive_max,
				std::cmp::Ordering::Less => false,
			},
			_ => false,
		}
	}

	pub fn contains(&self, v: &Value) -> bool {
		let above_min = match &self.min {
			None => true,
			Some(min) => {
				if self.exclusive_min {
					v > min
				} else {
					v >= min
				}
			}
		};
		let below_max = match &self.max {
			None => true,
			Some(max) => {
				if self.exclusive_max {
					v < max
				} else {
					v <= max
				}
			}
		};
		above_min && below_max
	}

	/// The intersection of two ranges: the tighter of each bound (§9
	/// invariant 6, range derivation is monotonic). Returns a possibly-empty
	/// range rather than an `Option` — callers check `is_empty()`.
	pub fn intersect(&self, other: &Range) -> Range {
		let (min, exclusive_min) = tighter_lower(&self.min, self.exclusive_min, &other.min, other.exclusive_min);
		let (max, exclusive_max) = tighter_upper(&self.max, self.exclusive_max, &other.max, other.exclusive_max);
		let exact = matches!((&min, &max), (Some(a), Some(b)) if a == b) && !exclusive_min && !exclusive_max;
		Range {
			min,
			max,
			exclusive_min,
			exclusive_max,
			exact,
		}
	}

	/// Narrow this range's bounds toward a tighter candidate, in place —
	/// used when successive predicates on the same path each refine the
	/// range further (e.g. `< 5` then `< 3`, §9 invariant 6).
	pub fn tighten(&mut self, other: &Range) {
		*self = self.intersect(other);
	}
}

fn tighter_lower(
	a: &Option<Value>,
	a_exclusive: bool,
	b: &Option<Value>,
	b_exclusive: bool,
) -> (Option<Value>, bool) {
	match (a, b) {
		(None, None) => (None, false),
		(Some(_), None) => (a.clone(), a_exclusive),
		(None, Some(_)) => (b.clone(), b_exclusive),
		(Some(av), Some(bv)) => match av.cmp(bv) {
			std::cmp::Ordering::Greater => (a.clone(), a_exclusive),
			std::cmp::Ordering::Less => (b.clone(), b_exclusive),
			std::cmp::Ordering::Equal => (a.clone(), a_exclusive || b_exclusive),
		},
	}
}

fn tighter_upper(
	a: &Option<Value>,
	a_exclusive: bool,
	b: &Option<Value>,
	b_exclusive: bool,
) -> (Option<Value>, bool) {
	match (a, b) {
		(None, None) => (None, false),
		(Some(_), None) => (a.clone(), a_exclusive),
		(None, Some(_)) => (b.clone(), b_exclusive),
		(Some(av), Some(bv)) => match av.cmp(bv) {
			std::cmp::Ordering::Less => (a.clone(), a_exclusive),
			std::cmp::Ordering::Greater => (b.clone(), b_exclusive),
			std::cmp::Ordering::Equal => (a.clone(), a_exclusive || b_exclusive),
		},
	}
}
