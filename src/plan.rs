//! The executable unit handed to the executor: a stream paired with a
//! read-only flag (§2 Dataflow, §3 invariants).

use crate::stream::Stream;

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
	pub stream: Stream,
	pub read_only: bool,
}

impl Plan {
	/// Build a plan from a stream, deriving `read_only` from its shape
	/// rather than trusting a caller-supplied flag (§3 invariant: "A plan's
	/// read-only flag is true iff it contains no mutating transform").
	pub fn new(stream: Stream) -> Self {
		let read_only = stream.is_read_only();
		Plan { stream, read_only }
	}
}
