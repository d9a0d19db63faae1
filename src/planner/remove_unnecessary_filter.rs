//! Rule 3 (§4.3): a `Filter` whose expression is already constant (which, by
//! this point, `Precalculate` has reduced to a `Literal`) can be decided at
//! plan time — it either always keeps every row (drop it) or always drops
//! every row (the whole stream becomes `Empty`, per §3's "the empty stream
//! is a valid terminal state of optimization").

use crate::expr::Expr;
use crate::stream::Stream;

pub fn apply(stream: Stream) -> Stream {
	match stream {
		Stream::Filter { input, expr } => {
			let input = apply(*input);
			match &expr {
				Expr::Literal(v) if v.is_truthy() => input,
				Expr::Literal(_) => Stream::Empty,
				_ => Stream::Filter { input: Box::new(input), expr },
			}
		}
		other => other.map_input(apply),
	}
}
