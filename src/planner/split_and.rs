//! Rule 1 (§4.3): flatten any `AND`-rooted filter expression into a chain of
//! single-condition filters, so every later rule only ever has to consider
//! one predicate per `Filter` node.

use crate::expr::operator::BinaryOperator;
use crate::expr::Expr;
use crate::stream::Stream;

pub fn apply(stream: Stream) -> Stream {
	match stream {
		Stream::Filter { input, expr } => {
			let input = apply(*input);
			split(input, expr)
		}
		other => other.map_input(apply),
	}
}

fn split(input: Stream, expr: Expr) -> Stream {
	match expr {
		Expr::Binary { left, op: BinaryOperator::And, right } => {
			let with_left = split(input, *left);
			split(with_left, *right)
		}
		expr => Stream::Filter { input: Box::new(input), expr },
	}
}
