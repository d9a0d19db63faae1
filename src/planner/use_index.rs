//! Rule 5 (§4.4): replace `SeqScan(T)` plus the run of `Filter`s directly
//! above it with a `PkScan` or `IndexScan` carrying a derived range,
//! demoting the other filters to residual predicates kept in place.
//!
//! Grounded on the teacher's `idx::planner::plan::PlanBuilder` candidate
//! collection / priority selection, simplified to this core's single-path,
//! single-rewrite contract (no cost-based join ordering, no multi-index
//! intersection — out of scope per §1).

use crate::catalog::{Catalog, TableSchema};
use crate::expr::operator::BinaryOperator;
use crate::expr::Expr;
use crate::path::Path;
use crate::range::Range;
use crate::stream::Stream;
use crate::value::convert::ValueKind;
use crate::value::Value;

/// Priority order for `Selection` (§4.4): lower sorts first.
const PRIORITY_PRIMARY_KEY: u8 = 0;
const PRIORITY_UNIQUE_INDEX: u8 = 1;
const PRIORITY_NON_UNIQUE_INDEX: u8 = 2;

struct Candidate {
	filter_index: usize,
	priority: u8,
	scan: Stream,
}

pub fn apply(stream: Stream, catalog: &dyn Catalog) -> Stream {
	match stream {
		Stream::Filter { .. } => {
			let (filters, source) = collect_filters(stream);
			let source = apply(source, catalog);
			if let Stream::SeqScan { table } = &source {
				if let Some(schema) = catalog.schema(table) {
					let candidates = generate_candidates(&filters, table, schema);
					if let Some(best) = candidates.iter().min_by_key(|c| (c.priority, c.filter_index)) {
						return rebuild(best.scan.clone(), &filters, Some(best.filter_index));
					}
				}
			}
			rebuild(source, &filters, None)
		}
		other => other.map_input(|s| apply(s, catalog)),
	}
}

/// Walk down a chain of `Filter` nodes to its first non-`Filter`
/// predecessor, returning the filter expressions in pipeline order
/// (nearest the source first).
fn collect_filters(stream: Stream) -> (Vec<Expr>, Stream) {
	let mut filters = Vec::new();
	let mut cur = stream;
	loop {
		match cur {
			Stream::Filter { input, expr } => {
				filters.push(expr);
				cur = *input;
			}
			other => {
				filters.reverse();
				return (filters, other);
			}
		}
	}
}

/// Re-wrap `base` with every filter in `filters` except `skip_index` (if
/// any), preserving their original relative order (§4.4 Rewrite).
fn rebuild(base: Stream, filters: &[Expr], skip_index: Option<usize>) -> Stream {
	let mut out = base;
	for (i, expr) in filters.iter().enumerate() {
		if Some(i) == skip_index {
			continue;
		}
		out = Stream::Filter { input: Box::new(out), expr: expr.clone() };
	}
	out
}

fn generate_candidates(filters: &[Expr], table: &str, schema: &TableSchema) -> Vec<Candidate> {
	let mut candidates = Vec::new();
	for (filter_index, expr) in filters.iter().enumerate() {
		let Some((path, raw_ranges)) = extract_path_ranges(expr) else {
			continue;
		};
		if schema.is_primary_key(&path) {
			let pk_ranges = match &schema.primary_key_kind {
				Some(kind) => raw_ranges.iter().map(|r| coerce_range(r, kind)).collect::<Option<Vec<_>>>(),
				None => Some(raw_ranges.clone()),
			};
			if let Some(ranges) = pk_ranges {
				candidates.push(Candidate {
					filter_index,
					priority: PRIORITY_PRIMARY_KEY,
					scan: Stream::PkScan { table: table.to_string(), ranges },
				});
			}
		}
		for ix in schema.indexes_on(&path) {
			let ranges = match &ix.value_kind {
				Some(kind) => raw_ranges.iter().map(|r| coerce_range(r, kind)).collect::<Option<Vec<_>>>(),
				None => Some(raw_ranges.clone()),
			};
			let Some(ranges) = ranges else { continue };
			let priority = if ix.unique { PRIORITY_UNIQUE_INDEX } else { PRIORITY_NON_UNIQUE_INDEX };
			candidates.push(Candidate {
				filter_index,
				priority,
				scan: Stream::IndexScan { table: table.to_string(), index: ix.name.clone(), ranges },
			});
		}
	}
	candidates
}

/// Interpret `expr` as an indexable predicate on a single path (§4.4
/// Candidate generation): `path OP literal`, `literal OP path`, `path IN
/// [...]`, or `path BETWEEN lo AND hi`. Returns the path and the range(s) it
/// derives, ungated by any index's declared type — coercion happens later,
/// per candidate index.
fn extract_path_ranges(expr: &Expr) -> Option<(Path, Vec<Range>)> {
	match expr {
		Expr::Binary { left, op, right } => match (left.as_ref(), right.as_ref()) {
			(Expr::Path(p), Expr::Literal(v)) if *op == BinaryOperator::In => {
				in_ranges(p, v)
			}
			(Expr::Path(p), Expr::Literal(v)) => {
				comparator_range(*op, v.clone()).map(|r| (p.clone(), vec![r]))
			}
			(Expr::Literal(v), Expr::Path(p)) => {
				comparator_range(flip(*op), v.clone()).map(|r| (p.clone(), vec![r]))
			}
			_ => None,
		},
		Expr::Between { expr, low, high } => match (expr.as_ref(), low.as_ref(), high.as_ref()) {
			(Expr::Path(p), Expr::Literal(lo), Expr::Literal(hi)) => {
				Some((p.clone(), vec![Range::between(lo.clone(), hi.clone())]))
			}
			_ => None,
		},
		_ => None,
	}
}

fn in_ranges(path: &Path, literal: &Value) -> Option<(Path, Vec<Range>)> {
	let items = literal.as_array()?;
	Some((path.clone(), items.iter().cloned().map(Range::exact).collect()))
}

fn comparator_range(op: BinaryOperator, v: Value) -> Option<Range> {
	match op {
		BinaryOperator::Equal => Some(Range::exact(v)),
		BinaryOperator::LessThan => Some(Range::less_than(v)),
		BinaryOperator::LessThanOrEqual => Some(Range::less_than_or_equal(v)),
		BinaryOperator::MoreThan => Some(Range::more_than(v)),
		BinaryOperator::MoreThanOrEqual => Some(Range::more_than_or_equal(v)),
		// `!=` is not directly indexable (§4.4 Range derivation).
		_ => None,
	}
}

fn flip(op: BinaryOperator) -> BinaryOperator {
	match op {
		BinaryOperator::LessThan => BinaryOperator::MoreThan,
		BinaryOperator::LessThanOrEqual => BinaryOperator::MoreThanOrEqual,
		BinaryOperator::MoreThan => BinaryOperator::LessThan,
		BinaryOperator::MoreThanOrEqual => BinaryOperator::LessThanOrEqual,
		other => other,
	}
}

/// Coerce every present bound of `range` to `kind`, discarding the whole
/// range if any bound is lossy (§4.4 Type coercion).
fn coerce_range(range: &Range, kind: &ValueKind) -> Option<Range> {
	let min = match &range.min {
		Some(v) => Some(crate::value::convert::coerce_lossless(v, kind)?),
		None => None,
	};
	let max = match &range.max {
		Some(v) => Some(crate::value::convert::coerce_lossless(v, kind)?),
		None => None,
	};
	Some(Range { min, max, exclusive_min: range.exclusive_min, exclusive_max: range.exclusive_max, exact: range.exact })
}
