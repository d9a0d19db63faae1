//! The expression tree (§3 Expression, §4.1 Expression algebra): a closed
//! sum-of-variants evaluated against an [`Environment`] to a [`Value`],
//! grounded on the teacher's `sql::expression::Expression` shape but
//! generalized from a two-arity node to the full tree the planner needs to
//! rewrite (§9 "Polymorphic expression tree").

pub mod like;
pub mod operator;

use indexmap::IndexMap;

use crate::env::Environment;
use crate::err::Error;
use crate::path::Path;
use crate::value::{Value, ValueResult};
use operator::{BinaryOperator, UnaryOperator};

/// A parameter reference: positional (`?`, `?1`, ...) or named (`:name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
	Positional(u32),
	Named(String),
}

/// A zero-argument built-in function. `pk()` is the only one the core
/// contract needs — it is what `RemoveUnnecessaryDistinct` (§4.3) matches on
/// to prove a projection's uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
	Pk,
}

/// An expression tree node (§3 Expression).
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Expr {
	Literal(Value),
	Path(Path),
	Param(Param),
	Function(Function),
	/// The `*` marker in a `Project` list; only meaningful there.
	Wildcard,
	Unary {
		op: UnaryOperator,
		expr: Box<Expr>,
	},
	Binary {
		left: Box<Expr>,
		op: BinaryOperator,
		right: Box<Expr>,
	},
	Between {
		expr: Box<Expr>,
		low: Box<Expr>,
		high: Box<Expr>,
	},
	Array(Vec<Expr>),
	Object(Vec<(String, Expr)>),
}

impl Expr {
	pub fn eval(&self, env: &Environment) -> ValueResult {
		match self {
			Expr::Literal(v) => Ok(v.clone()),
			Expr::Path(path) => Ok(env.current().get_path(path)),
			Expr::Param(Param::Positional(i)) => {
				env.positional(*i).ok_or_else(|| Error::ParameterNotFound {
					param: format!("?{i}"),
				})
			}
			Expr::Param(Param::Named(name)) => {
				env.named(name).ok_or_else(|| Error::ParameterNotFound {
					param: name.clone(),
				})
			}
			Expr::Function(Function::Pk) => Ok(env.record_id()),
			Expr::Wildcard => Ok(env.current()),
			Expr::Unary { op, expr } => eval_unary(*op, expr.eval(env)?),
			Expr::Binary { left, op, right } => eval_binary(env, left, *op, right),
			Expr::Between { expr, low, high } => eval_between(env, expr, low, high),
			Expr::Array(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(item.eval(env)?);
				}
				Ok(Value::Array(out))
			}
			Expr::Object(fields) => {
				let mut out = IndexMap::with_capacity(fields.len());
				for (key, value_expr) in fields {
					out.insert(key.clone(), value_expr.eval(env)?);
				}
				Ok(Value::Document(out))
			}
		}
	}

	/// Structural equality (§4.1 `equal`). Plain `PartialEq` suffices since
	/// every leaf kind already compares structurally.
	pub fn equal(&self, other: &Expr) -> bool {
		self == other
	}

	/// Canonical textual rendering (§4.1 `render`), also used by the
	/// planner's stream rendering for test equality.
	pub fn render(&self) -> String {
		match self {
			Expr::Literal(v) => v.render(),
			Expr::Path(p) => p.to_string(),
			Expr::Param(Param::Positional(i)) => format!("?{i}"),
			Expr::Param(Param::Named(name)) => format!(":{name}"),
			Expr::Function(Function::Pk) => "pk()".to_string(),
			Expr::Wildcard => "*".to_string(),
			Expr::Unary { op, expr } => format!("{op}{}", expr.render()),
			Expr::Binary { left, op, right } => {
				format!("({} {op} {})", left.render(), right.render())
			}
			Expr::Between { expr, low, high } => {
				format!("({} BETWEEN {} AND {})", expr.render(), low.render(), high.render())
			}
			Expr::Array(items) => {
				let inner: Vec<String> = items.iter().map(Expr::render).collect();
				format!("[{}]", inner.join(", "))
			}
			Expr::Object(fields) => {
				let inner: Vec<String> =
					fields.iter().map(|(k, v)| format!("{k}: {}", v.render())).collect();
				format!("{{{}}}", inner.join(", "))
			}
		}
	}

	/// Whether this subtree contains no `Path`, `Wildcard`, or parameter
	/// reference (§3 Expression, §4.3 Precalculate). A `Param` node still
	/// present at this check is by definition unbound — `Precalculate`
	/// resolves and replaces every bound one with a `Literal` — so any
	/// remaining `Param` makes the subtree non-constant.
	pub fn is_constant(&self) -> bool {
		match self {
			Expr::Literal(_) => true,
			// `pk()` reads the current row's identity, exactly like a Path
			// lookup, so it can never be folded ahead of execution.
			Expr::Path(_) | Expr::Wildcard | Expr::Param(_) | Expr::Function(_) => false,
			Expr::Unary { expr, .. } => expr.is_constant(),
			Expr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
			Expr::Between { expr, low, high } => {
				expr.is_constant() && low.is_constant() && high.is_constant()
			}
			Expr::Array(items) => items.iter().all(Expr::is_constant),
			Expr::Object(fields) => fields.iter().all(|(_, v)| v.is_constant()),
		}
	}
}

fn eval_unary(op: UnaryOperator, v: Value) -> ValueResult {
	match op {
		UnaryOperator::Neg => crate::value::arith::try_neg(&v),
		UnaryOperator::Not => {
			if v.is_null() {
				Ok(Value::Null)
			} else {
				Ok(Value::Bool(!v.is_truthy()))
			}
		}
	}
}

fn eval_binary(env: &Environment, left: &Expr, op: BinaryOperator, right: &Expr) -> ValueResult {
	use BinaryOperator::*;
	// AND/OR short-circuit and must not evaluate the right operand when the
	// left already determines the three-valued result (§4.1 Short-circuiting).
	if matches!(op, And | Or) {
		return eval_logical(env, left, op, right);
	}
	let l = left.eval(env)?;
	let r = right.eval(env)?;
	match op {
		Add => crate::value::arith::try_add(&l, &r),
		Sub => crate::value::arith::try_sub(&l, &r),
		Mul => crate::value::arith::try_mul(&l, &r),
		Div => crate::value::arith::try_div(&l, &r),
		Rem => crate::value::arith::try_rem(&l, &r),
		BitAnd => crate::value::arith::try_bitand(&l, &r),
		BitOr => crate::value::arith::try_bitor(&l, &r),
		BitXor => crate::value::arith::try_bitxor(&l, &r),
		Equal => null_propagated_cmp(&l, &r, |l, r| l == r),
		NotEqual => null_propagated_cmp(&l, &r, |l, r| l != r),
		LessThan => null_propagated_cmp(&l, &r, |l, r| l < r),
		LessThanOrEqual => null_propagated_cmp(&l, &r, |l, r| l <= r),
		MoreThan => null_propagated_cmp(&l, &r, |l, r| l > r),
		MoreThanOrEqual => null_propagated_cmp(&l, &r, |l, r| l >= r),
		In => eval_in(&l, &r, false),
		NotIn => eval_in(&l, &r, true),
		Like => eval_like(&l, &r, false),
		NotLike => eval_like(&l, &r, true),
		Is => Ok(Value::Bool(l == r)),
		IsNot => Ok(Value::Bool(l != r)),
		And | Or => unreachable!("handled above"),
	}
}

fn null_propagated_cmp(l: &Value, r: &Value, f: impl Fn(&Value, &Value) -> bool) -> ValueResult {
	if l.is_null() || r.is_null() {
		Ok(Value::Null)
	} else {
		Ok(Value::Bool(f(l, r)))
	}
}

fn eval_in(l: &Value, r: &Value, negate: bool) -> ValueResult {
	if l.is_null() {
		return Ok(Value::Null);
	}
	let items = r.as_array().ok_or_else(|| Error::IncompatibleTypes {
		op: "IN".to_string(),
		left: l.kind_name().to_string(),
		right: r.kind_name().to_string(),
	})?;
	let found = items.iter().any(|item| item == l);
	Ok(Value::Bool(found != negate))
}

fn eval_like(l: &Value, r: &Value, negate: bool) -> ValueResult {
	if l.is_null() || r.is_null() {
		return Ok(Value::Null);
	}
	let (text, pattern) = match (l, r) {
		(Value::Text(t), Value::Text(p)) => (t, p),
		_ => {
			return Err(Error::IncompatibleTypes {
				op: "LIKE".to_string(),
				left: l.kind_name().to_string(),
				right: r.kind_name().to_string(),
			})
		}
	};
	let matched = like::matches(text, pattern);
	Ok(Value::Bool(matched != negate))
}

fn eval_between(env: &Environment, expr: &Expr, low: &Expr, high: &Expr) -> ValueResult {
	let v = expr.eval(env)?;
	let lo = low.eval(env)?;
	let hi = high.eval(env)?;
	if v.is_null() || lo.is_null() || hi.is_null() {
		return Ok(Value::Null);
	}
	Ok(Value::Bool(lo <= v && v <= hi))
}

/// Three-valued `AND`/`OR` with short-circuiting (§4.1): `null AND false =
/// false`, `null OR true = true`, otherwise the result propagates null
/// rather than coercing it away.
fn eval_logical(env: &Environment, left: &Expr, op: BinaryOperator, right: &Expr) -> ValueResult {
	let l = left.eval(env)?;
	match op {
		BinaryOperator::And => {
			if !l.is_null() && !l.is_truthy() {
				return Ok(Value::Bool(false));
			}
			let r = right.eval(env)?;
			if !r.is_null() && !r.is_truthy() {
				return Ok(Value::Bool(false));
			}
			if l.is_null() || r.is_null() {
				Ok(Value::Null)
			} else {
				Ok(Value::Bool(true))
			}
		}
		BinaryOperator::Or => {
			if !l.is_null() && l.is_truthy() {
				return Ok(Value::Bool(true));
			}
			let r = right.eval(env)?;
			if !r.is_null() && r.is_truthy() {
				return Ok(Value::Bool(true));
			}
			if l.is_null() || r.is_null() {
				Ok(Value::Null)
			} else {
				Ok(Value::Bool(false))
			}
		}
		_ => unreachable!("eval_logical only handles And/Or"),
	}
}
