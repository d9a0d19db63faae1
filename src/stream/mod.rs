//! The stream plan tree: a singly-linked pipeline whose head is a source
//! operator and whose tail is zero or more transforms (§3 Stream, §4.2
//! Stream Operators).
//!
//! Represented as a sum-of-variants rather than a trait-object chain (§9
//! "Polymorphic expression tree" applies equally here): the operator set is
//! closed, so the planner's rewrite rules and the executor's dispatch both
//! match exhaustively over `Stream` instead of downcasting.

use crate::expr::Expr;
use crate::range::Range;

/// A single projected output column: an expression and an optional alias.
/// `None` alias means the column is named by the expression's own render
/// (or, for `Wildcard`, expands to every field of the input document).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
	pub expr: Expr,
	pub alias: Option<String>,
}

impl ProjectItem {
	pub fn new(expr: Expr) -> Self {
		ProjectItem { expr, alias: None }
	}

	pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
		ProjectItem {
			expr,
			alias: Some(alias.into()),
		}
	}
}

/// The plan tree (§3 Stream). Sources have no predecessor; every transform
/// wraps the `Box<Stream>` it reads from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Stream {
	/// The empty stream: a valid terminal state of optimization, emitting
	/// no rows (§3).
	Empty,
	SeqScan {
		table: String,
	},
	PkScan {
		table: String,
		ranges: Vec<Range>,
	},
	IndexScan {
		table: String,
		index: String,
		ranges: Vec<Range>,
	},
	Filter {
		input: Box<Stream>,
		expr: Expr,
	},
	Project {
		input: Box<Stream>,
		items: Vec<ProjectItem>,
	},
	Sort {
		input: Box<Stream>,
		expr: Expr,
		desc: bool,
	},
	Take {
		input: Box<Stream>,
		n: u64,
	},
	Skip {
		input: Box<Stream>,
		n: u64,
	},
	Distinct {
		input: Box<Stream>,
	},
	TableInsert {
		input: Box<Stream>,
		table: String,
	},
	TableDelete {
		input: Box<Stream>,
		table: String,
	},
	TableReplace {
		input: Box<Stream>,
		table: String,
	},
	/// Unconditionally empties a table; does not read its rows (§4.2
	/// supplemental sink).
	Truncate {
		table: String,
	},
}

impl Stream {
	/// This node's immediate predecessor, if it is a transform.
	pub fn input(&self) -> Option<&Stream> {
		match self {
			Stream::Empty
			| Stream::SeqScan { .. }
			| Stream::PkScan { .. }
			| Stream::IndexScan { .. }
			| Stream::Truncate { .. } => None,
			Stream::Filter { input, .. }
			| Stream::Project { input, .. }
			| Stream::Sort { input, .. }
			| Stream::Take { input, .. }
			| Stream::Skip { input, .. }
			| Stream::Distinct { input }
			| Stream::TableInsert { input, .. }
			| Stream::TableDelete { input, .. }
			| Stream::TableReplace { input, .. } => Some(input),
		}
	}

	pub fn input_mut(&mut self) -> Option<&mut Stream> {
		match self {
			Stream::Empty
			| Stream::SeqScan { .. }
			| Stream::PkScan { .. }
			| Stream::IndexScan { .. }
			| Stream::Truncate { .. } => None,
			Stream::Filter { input, .. }
			| Stream::Project { input, .. }
			| Stream::Sort { input, .. }
			| Stream::Take { input, .. }
			| Stream::Skip { input, .. }
			| Stream::Distinct { input }
			| Stream::TableInsert { input, .. }
			| Stream::TableDelete { input, .. }
			| Stream::TableReplace { input, .. } => Some(input),
		}
	}

	/// Rebuild this node with its immediate input (if any) replaced by
	/// applying `f` to it; source and sink nodes with no input pass through
	/// unchanged. Shared by every planner rule that needs to recurse down
	/// the pipeline without a bespoke match per rule.
	pub fn map_input(self, f: impl FnOnce(Stream) -> Stream) -> Stream {
		match self {
			Stream::Filter { input, expr } => Stream::Filter { input: Box::new(f(*input)), expr },
			Stream::Project { input, items } => Stream::Project { input: Box::new(f(*input)), items },
			Stream::Sort { input, expr, desc } => {
				Stream::Sort { input: Box::new(f(*input)), expr, desc }
			}
			Stream::Take { input, n } => Stream::Take { input: Box::new(f(*input)), n },
			Stream::Skip { input, n } => Stream::Skip { input: Box::new(f(*input)), n },
			Stream::Distinct { input } => Stream::Distinct { input: Box::new(f(*input)) },
			Stream::TableInsert { input, table } => {
				Stream::TableInsert { input: Box::new(f(*input)), table }
			}
			Stream::TableDelete { input, table } => {
				Stream::TableDelete { input: Box::new(f(*input)), table }
			}
			Stream::TableReplace { input, table } => {
				Stream::TableReplace { input: Box::new(f(*input)), table }
			}
			other => other,
		}
	}

	/// The table the leaf source of this pipeline reads from, if any — used
	/// by rules that need schema for the table still being scanned
	/// (`RemoveUnnecessaryDistinct`, `UseIndex`).
	pub fn source_table(&self) -> Option<&str> {
		match self {
			Stream::SeqScan { table }
			| Stream::PkScan { table, .. }
			| Stream::IndexScan { table, .. } => Some(table),
			Stream::Empty => None,
			_ => self.input().and_then(Stream::source_table),
		}
	}

	/// A plan is read-only iff no node along the chain mutates the engine
	/// (§3 invariant, §5 Transactions).
	pub fn is_read_only(&self) -> bool {
		match self {
			Stream::TableInsert { .. }
			| Stream::TableDelete { .. }
			| Stream::TableReplace { .. }
			| Stream::Truncate { .. } => false,
			_ => self.input().map(Stream::is_read_only).unwrap_or(true),
		}
	}

	/// Canonical textual rendering, used as the equality check in planner
	/// tests (§3 Stream).
	pub fn render(&self) -> String {
		match self {
			Stream::Empty => "Empty".to_string(),
			Stream::SeqScan { table } => format!("SeqScan({table})"),
			Stream::PkScan { table, ranges } => {
				format!("PkScan({table}, {})", render_ranges(ranges))
			}
			Stream::IndexScan { index, ranges, .. } => {
				format!("IndexScan({index}, {})", render_ranges(ranges))
			}
			Stream::Filter { input, expr } => {
				format!("{} |> Filter({})", input.render(), expr.render())
			}
			Stream::Project { input, items } => {
				let cols: Vec<String> = items
					.iter()
					.map(|item| match &item.alias {
						Some(alias) => format!("{} AS {alias}", item.expr.render()),
						None => item.expr.render(),
					})
					.collect();
				format!("{} |> Project({})", input.render(), cols.join(", "))
			}
			Stream::Sort { input, expr, desc } => {
				let dir = if *desc { " DESC" } else { "" };
				format!("{} |> Sort({}{dir})", input.render(), expr.render())
			}
			Stream::Take { input, n } => format!("{} |> Take({n})", input.render()),
			Stream::Skip { input, n } => format!("{} |> Skip({n})", input.render()),
			Stream::Distinct { input } => format!("{} |> Distinct()", input.render()),
			Stream::TableInsert { input, table } => {
				format!("{} |> TableInsert({table})", input.render())
			}
			Stream::TableDelete { input, table } => {
				format!("{} |> TableDelete({table})", input.render())
			}
			Stream::TableReplace { input, table } => {
				format!("{} |> TableReplace({table})", input.render())
			}
			Stream::Truncate { table } => format!("Truncate({table})"),
		}
	}
}

fn render_ranges(ranges: &[Range]) -> String {
	let rendered: Vec<String> = ranges
		.iter()
		.map(|r| {
			if r.exact {
				format!("[= {}]", r.min.as_ref().map(|v| v.render()).unwrap_or_default())
			} else {
				let min = match &r.min {
					Some(v) => format!("{}{}", if r.exclusive_min { ">" } else { ">=" }, v.render()),
					None => String::new(),
				};
				let max = match &r.max {
					Some(v) => format!("{}{}", if r.exclusive_max { "<" } else { "<=" }, v.render()),
					None => String::new(),
				};
				format!("[{min}{}{max}]", if !min.is_empty() && !max.is_empty() { ", " } else { "" })
			}
		})
		.collect();
	rendered.join(", ")
}

/// Assembles a [`Stream`] by hand without a parser, mirroring the way the
/// teacher's planner tests build `Cond`/`Expression` trees directly rather
/// than through `surrealdb-core`'s SQL grammar (§6 Parser interface). Each
/// transform method wraps the stream built so far; sources and `truncate`
/// start a fresh chain.
#[derive(Debug, Clone)]
pub struct StreamBuilder {
	stream: Stream,
}

impl StreamBuilder {
	pub fn seq_scan(table: impl Into<String>) -> Self {
		StreamBuilder { stream: Stream::SeqScan { table: table.into() } }
	}

	pub fn pk_scan(table: impl Into<String>, ranges: Vec<Range>) -> Self {
		StreamBuilder { stream: Stream::PkScan { table: table.into(), ranges } }
	}

	pub fn index_scan(table: impl Into<String>, index: impl Into<String>, ranges: Vec<Range>) -> Self {
		StreamBuilder {
			stream: Stream::IndexScan { table: table.into(), index: index.into(), ranges },
		}
	}

	/// A standalone `Truncate` sink; it has no input, so it never joins a
	/// chain under construction.
	pub fn truncate(table: impl Into<String>) -> Stream {
		Stream::Truncate { table: table.into() }
	}

	pub fn filter(mut self, expr: Expr) -> Self {
		self.stream = Stream::Filter { input: Box::new(self.stream), expr };
		self
	}

	pub fn project(mut self, items: Vec<ProjectItem>) -> Self {
		self.stream = Stream::Project { input: Box::new(self.stream), items };
		self
	}

	pub fn sort(mut self, expr: Expr, desc: bool) -> Self {
		self.stream = Stream::Sort { input: Box::new(self.stream), expr, desc };
		self
	}

	pub fn take(mut self, n: u64) -> Self {
		self.stream = Stream::Take { input: Box::new(self.stream), n };
		self
	}

	pub fn skip(mut self, n: u64) -> Self {
		self.stream = Stream::Skip { input: Box::new(self.stream), n };
		self
	}

	pub fn distinct(mut self) -> Self {
		self.stream = Stream::Distinct { input: Box::new(self.stream) };
		self
	}

	pub fn table_insert(mut self, table: impl Into<String>) -> Self {
		self.stream = Stream::TableInsert { input: Box::new(self.stream), table: table.into() };
		self
	}

	pub fn table_delete(mut self, table: impl Into<String>) -> Self {
		self.stream = Stream::TableDelete { input: Box::new(self.stream), table: table.into() };
		self
	}

	pub fn table_replace(mut self, table: impl Into<String>) -> Self {
		self.stream = Stream::TableReplace { input: Box::new(self.stream), table: table.into() };
		self
	}

	pub fn build(self) -> Stream {
		self.stream
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::Value;

	#[test]
	fn read_only_is_false_under_a_mutating_sink() {
		let s = Stream::TableDelete {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			table: "foo".to_string(),
		};
		assert!(!s.is_read_only());
	}

	#[test]
	fn read_only_is_true_for_a_pure_scan() {
		let s = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr: Expr::Literal(Value::Bool(true)),
		};
		assert!(s.is_read_only());
	}

	#[test]
	fn renders_pipeline_left_to_right() {
		let s = Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
			expr: Expr::Literal(Value::Integer(1)),
		};
		assert_eq!(s.render(), "SeqScan(foo) |> Filter(1)");
	}

	#[test]
	fn exact_range_renders_as_equality() {
		let s = Stream::PkScan {
			table: "foo".to_string(),
			ranges: vec![Range::exact(Value::Integer(1))],
		};
		assert_eq!(s.render(), "PkScan(foo, [= 1])");
	}

	#[test]
	fn stream_builder_produces_the_same_tree_as_hand_assembled_variants() {
		let built = StreamBuilder::seq_scan("foo")
			.filter(Expr::Literal(Value::Bool(true)))
			.take(5)
			.build();
		let hand_assembled = Stream::Take {
			input: Box::new(Stream::Filter {
				input: Box::new(Stream::SeqScan { table: "foo".to_string() }),
				expr: Expr::Literal(Value::Bool(true)),
			}),
			n: 5,
		};
		assert_eq!(built, hand_assembled);
		assert_eq!(built.render(), hand_assembled.render());
	}
}
