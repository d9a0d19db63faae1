//! Rule 2 (§4.3): fold every constant subtree to a literal and resolve
//! parameter references against the statement's bound parameters. Constant
//! array/object literals fold to `Value::Array`/`Value::Document`, and a
//! constant `IN` right-hand side folds to its array along with everything
//! else — no special-casing needed beyond "fold bottom-up, then fold the
//! parent if it became constant".
//!
//! Idempotent by construction (§8 invariant 2): once a `Param` node is
//! replaced by a `Literal`, no `Param` remains for a second pass to touch,
//! and a `Literal` is already maximally folded.

use crate::cnf::MAX_PLAN_DEPTH;
use crate::env::Environment;
use crate::err::Error;
use crate::expr::Expr;
use crate::stream::Stream;

pub fn apply(stream: Stream, env: &Environment) -> Result<Stream, Error> {
	match stream {
		Stream::Filter { input, expr } => {
			let input = apply(*input, env)?;
			let expr = fold(expr, env)?;
			Ok(Stream::Filter { input: Box::new(input), expr })
		}
		Stream::Project { input, items } => {
			let input = apply(*input, env)?;
			let items = items
				.into_iter()
				.map(|mut item| -> Result<_, Error> {
					item.expr = fold(item.expr, env)?;
					Ok(item)
				})
				.collect::<Result<_, _>>()?;
			Ok(Stream::Project { input: Box::new(input), items })
		}
		Stream::Sort { input, expr, desc } => {
			let input = apply(*input, env)?;
			let expr = fold(expr, env)?;
			Ok(Stream::Sort { input: Box::new(input), expr, desc })
		}
		other => {
			let mut err = None;
			let result = other.map_input(|input| match apply(input, env) {
				Ok(s) => s,
				Err(e) => {
					err = Some(e);
					Stream::Empty
				}
			});
			match err {
				Some(e) => Err(e),
				None => Ok(result),
			}
		}
	}
}

/// Fold `expr`'s children bottom-up, then fold `expr` itself if every child
/// is now constant.
fn fold(expr: Expr, env: &Environment) -> Result<Expr, Error> {
	fold_at_depth(expr, env, 0)
}

/// Guards against pathologically nested expression trees (`cnf::MAX_PLAN_DEPTH`):
/// each recursive step into a child costs one unit of depth.
fn fold_at_depth(expr: Expr, env: &Environment, depth: u32) -> Result<Expr, Error> {
	if depth > *MAX_PLAN_DEPTH {
		return Err(Error::PlanDepthExceeded { limit: *MAX_PLAN_DEPTH });
	}
	let folded = match expr {
		Expr::Param(_) => return Ok(Expr::Literal(expr.eval(env)?)),
		Expr::Literal(_) | Expr::Path(_) | Expr::Wildcard | Expr::Function(_) => expr,
		Expr::Unary { op, expr } => {
			Expr::Unary { op, expr: Box::new(fold_at_depth(*expr, env, depth + 1)?) }
		}
		Expr::Binary { left, op, right } => Expr::Binary {
			left: Box::new(fold_at_depth(*left, env, depth + 1)?),
			op,
			right: Box::new(fold_at_depth(*right, env, depth + 1)?),
		},
		Expr::Between { expr, low, high } => Expr::Between {
			expr: Box::new(fold_at_depth(*expr, env, depth + 1)?),
			low: Box::new(fold_at_depth(*low, env, depth + 1)?),
			high: Box::new(fold_at_depth(*high, env, depth + 1)?),
		},
		Expr::Array(items) => Expr::Array(
			items.into_iter().map(|e| fold_at_depth(e, env, depth + 1)).collect::<Result<_, _>>()?,
		),
		Expr::Object(fields) => Expr::Object(
			fields
				.into_iter()
				.map(|(k, v)| Ok::<_, Error>((k, fold_at_depth(v, env, depth + 1)?)))
				.collect::<Result<_, _>>()?,
		),
	};
	if folded.is_constant() {
		Ok(Expr::Literal(folded.eval(env)?))
	} else {
		Ok(folded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::operator::BinaryOperator;
	use crate::value::Value;

	#[test]
	fn resolves_and_promotes_a_bound_parameter() {
		let mut env = Environment::new();
		env.bind_positional(1, Value::Double(2.4));
		let expr = Expr::Binary {
			left: Box::new(Expr::Literal(Value::Integer(3))),
			op: BinaryOperator::Add,
			right: Box::new(Expr::Param(crate::expr::Param::Positional(1))),
		};
		let stream = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr,
		};
		let result = apply(stream, &env).unwrap();
		assert_eq!(result.render(), "SeqScan(foo) |> Filter(5.4)");
	}

	#[test]
	fn path_subtree_is_left_alone() {
		let env = Environment::new();
		let expr = Expr::Binary {
			left: Box::new(Expr::Path(crate::path::Path::field("a"))),
			op: BinaryOperator::Equal,
			right: Box::new(Expr::Literal(Value::Integer(1))),
		};
		let stream = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr: expr.clone(),
		};
		let result = apply(stream, &env).unwrap();
		assert_eq!(result.render(), format!("SeqScan(foo) |> Filter({})", expr.render()));
	}

	#[test]
	fn unbound_parameter_aborts_planning() {
		let env = Environment::new();
		let stream = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr: Expr::Param(crate::expr::Param::Named("missing".to_string())),
		};
		assert!(matches!(apply(stream, &env), Err(Error::ParameterNotFound { .. })));
	}

	#[test]
	fn exceeding_the_configured_plan_depth_is_an_error() {
		let env = Environment::new();
		let mut expr = Expr::Path(crate::path::Path::field("a"));
		for _ in 0..(*crate::cnf::MAX_PLAN_DEPTH as usize + 10) {
			expr = Expr::Unary { op: crate::expr::operator::UnaryOperator::Not, expr: Box::new(expr) };
		}
		let stream = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr,
		};
		assert!(matches!(apply(stream, &env), Err(Error::PlanDepthExceeded { .. })));
	}

	#[test]
	fn idempotent_on_an_already_folded_filter() {
		let env = Environment::new();
		let stream = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr: Expr::Literal(Value::Integer(7)),
		};
		let once = apply(stream, &env).unwrap();
		let twice = apply(once.clone(), &env).unwrap();
		assert_eq!(once, twice);
	}
}
