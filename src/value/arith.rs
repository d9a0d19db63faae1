//! Arithmetic and bitwise operators with the promotion rules of §4.1:
//! `int⊕int → int` (overflow reported as an error, never wrapped),
//! `int⊕double` or `double⊕double → double`, and any null operand yields
//! null. Bitwise operators require both operands to be integers.

use super::{Value, ValueResult};
use crate::err::Error;

/// `Some(Value::Null)` if either operand is null, otherwise `None` — the
/// uniform null-propagation rule shared by every arithmetic/bitwise op.
fn null_propagated(a: &Value, b: &Value) -> Option<Value> {
	if a.is_null() || b.is_null() {
		Some(Value::Null)
	} else {
		None
	}
}

macro_rules! checked_int_op {
	($name:ident, $checked:ident, $zero_err:expr) => {
		pub fn $name(a: &Value, b: &Value) -> ValueResult {
			if let Some(null) = null_propagated(a, b) {
				return Ok(null);
			}
			match (a, b) {
				(Value::Integer(x), Value::Integer(y)) => {
					if let Some(err) = $zero_err(*x, *y) {
						return Err(err);
					}
					x.$checked(*y).map(Value::Integer).ok_or_else(|| Error::ArithmeticOverflow {
						op: stringify!($name).to_string(),
						left: a.render(),
						right: b.render(),
					})
				}
				(x, y) if x.is_numeric() && y.is_numeric() => {
					let (fx, fy) = (x.as_f64().unwrap(), y.as_f64().unwrap());
					Ok(Value::Double(float_op(stringify!($name), fx, fy)))
				}
				_ => Err(Error::IncompatibleTypes {
					op: stringify!($name).to_string(),
					left: a.kind_name().to_string(),
					right: b.kind_name().to_string(),
				}),
			}
		}
	};
}

fn float_op(op: &str, x: f64, y: f64) -> f64 {
	match op {
		"try_add" => x + y,
		"try_sub" => x - y,
		"try_mul" => x * y,
		"try_div" => x / y,
		"try_rem" => x % y,
		_ => unreachable!("unknown float op {op}"),
	}
}

checked_int_op!(try_add, checked_add, |_, _| None);
checked_int_op!(try_sub, checked_sub, |_, _| None);
checked_int_op!(try_mul, checked_mul, |_, _| None);
checked_int_op!(try_div, checked_div, |_x, y: i64| {
	if y == 0 {
		Some(Error::DivisionByZero {
			left: Value::Integer(_x).render(),
			right: Value::Integer(y).render(),
		})
	} else {
		None
	}
});
checked_int_op!(try_rem, checked_rem, |_x, y: i64| {
	if y == 0 {
		Some(Error::ModuloByZero {
			left: Value::Integer(_x).render(),
			right: Value::Integer(y).render(),
		})
	} else {
		None
	}
});

pub fn try_neg(a: &Value) -> ValueResult {
	match a {
		Value::Null => Ok(Value::Null),
		Value::Integer(n) => n
			.checked_neg()
			.map(Value::Integer)
			.ok_or_else(|| Error::ArithmeticOverflow {
				op: "neg".to_string(),
				left: a.render(),
				right: String::new(),
			}),
		Value::Double(d) => Ok(Value::Double(-d)),
		_ => Err(Error::IncompatibleTypes {
			op: "neg".to_string(),
			left: a.kind_name().to_string(),
			right: String::new(),
		}),
	}
}

macro_rules! bitwise_op {
	($name:ident, $op:tt) => {
		pub fn $name(a: &Value, b: &Value) -> ValueResult {
			if let Some(null) = null_propagated(a, b) {
				return Ok(null);
			}
			match (a, b) {
				(Value::Integer(x), Value::Integer(y)) => Ok(Value::Integer(x $op y)),
				_ => Err(Error::IncompatibleTypes {
					op: stringify!($name).to_string(),
					left: a.kind_name().to_string(),
					right: b.kind_name().to_string(),
				}),
			}
		}
	};
}

bitwise_op!(try_bitand, &);
bitwise_op!(try_bitor, |);
bitwise_op!(try_bitxor, ^);
