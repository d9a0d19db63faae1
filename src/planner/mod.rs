//! The planner (§2 Dataflow, §4.3): applies a fixed, ordered sequence of
//! rewrite rules to a stream once each, with no fixed-point loop.
//!
//! Each rule lives in its own module, mirroring one rule per file the way
//! the teacher splits `idx::planner::plan`/`rewriter`/`checker` by concern.

pub mod explain;
pub mod precalculate;
pub mod remove_unnecessary_distinct;
pub mod remove_unnecessary_filter;
pub mod split_and;
pub mod use_index;

use crate::catalog::Catalog;
use crate::env::Environment;
use crate::err::Error;
use crate::plan::Plan;

/// Run every rule in §4.3's order exactly once and rebuild the plan's
/// read-only flag from the resulting shape.
pub fn optimize(plan: Plan, env: &Environment, catalog: &dyn Catalog) -> Result<Plan, Error> {
	let stream = split_and::apply(plan.stream);
	let stream = precalculate::apply(stream, env)?;
	let stream = remove_unnecessary_filter::apply(stream);
	let stream = remove_unnecessary_distinct::apply(stream, catalog);
	let stream = use_index::apply(stream, catalog);
	Ok(Plan::new(stream))
}
