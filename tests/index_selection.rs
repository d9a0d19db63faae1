//! §4.4 Index Selection Rule scenarios driven through `planner::optimize`:
//! priority among a primary key, a unique index and a non-unique index; the
//! type-coercion gate that discards a candidate rather than risk a lossy
//! range; and `IN`/`BETWEEN` predicates lowered to their range form.

use std::collections::HashMap;

use surrealdoc_core::catalog::{IndexDef, TableSchema};
use surrealdoc_core::env::Environment;
use surrealdoc_core::expr::operator::BinaryOperator;
use surrealdoc_core::expr::Expr;
use surrealdoc_core::path::Path;
use surrealdoc_core::plan::Plan;
use surrealdoc_core::planner::optimize;
use surrealdoc_core::stream::Stream;
use surrealdoc_core::value::convert::ValueKind;
use surrealdoc_core::value::Value;

fn eq(path: &str, v: Value) -> Expr {
	Expr::Binary {
		left: Box::new(Expr::Path(Path::field(path))),
		op: BinaryOperator::Equal,
		right: Box::new(Expr::Literal(v)),
	}
}

fn optimized(table: &str, schema: TableSchema, expr: Expr) -> Stream {
	let mut catalog = HashMap::new();
	catalog.insert(table.to_string(), schema);
	let env = Environment::new();
	let stream = Stream::Filter {
		input: Box::new(Stream::SeqScan { table: table.to_string() }),
		expr,
	};
	optimize(Plan::new(stream), &env, &catalog).unwrap().stream
}

#[test]
fn primary_key_equality_beats_a_unique_index_on_another_column() {
	let schema = TableSchema::new("t", Path::field("id")).with_index(IndexDef {
		name: "idx_t_email".to_string(),
		path: Path::field("email"),
		unique: true,
		value_kind: Some(ValueKind::Text),
	});
	// Both predicates are independently satisfiable by a different index;
	// the primary key must win on priority regardless of filter position.
	let expr = Expr::Binary {
		left: Box::new(eq("email", Value::Text("x@y.com".to_string()))),
		op: BinaryOperator::And,
		right: Box::new(eq("id", Value::Integer(7))),
	};
	let stream = optimized("t", schema, expr);
	assert_eq!(
		stream.render(),
		"PkScan(t, [= 7]) |> Filter((email = 'x@y.com'))"
	);
}

#[test]
fn unique_index_beats_a_non_unique_index_on_another_column() {
	let schema = TableSchema::new("t", Path::field("id"))
		.with_index(IndexDef {
			name: "idx_t_city".to_string(),
			path: Path::field("city"),
			unique: false,
			value_kind: Some(ValueKind::Text),
		})
		.with_index(IndexDef {
			name: "idx_t_email".to_string(),
			path: Path::field("email"),
			unique: true,
			value_kind: Some(ValueKind::Text),
		});
	let expr = Expr::Binary {
		left: Box::new(eq("city", Value::Text("ny".to_string()))),
		op: BinaryOperator::And,
		right: Box::new(eq("email", Value::Text("x@y.com".to_string()))),
	};
	let stream = optimized("t", schema, expr);
	assert_eq!(
		stream.render(),
		"IndexScan(idx_t_email, [= 'x@y.com']) |> Filter((city = 'ny'))"
	);
}

#[test]
fn lossy_literal_discards_the_indexed_candidate_and_falls_back_to_seq_scan() {
	// `amount` is declared Integer; `1.5` can't be coerced to it losslessly,
	// so the index candidate is dropped and the filter stays a residual
	// predicate over a plain scan (§4.4 Type coercion).
	let schema = TableSchema::new("t", Path::field("id")).with_index(IndexDef {
		name: "idx_t_amount".to_string(),
		path: Path::field("amount"),
		unique: false,
		value_kind: Some(ValueKind::Integer),
	});
	let stream = optimized("t", schema, eq("amount", Value::Double(1.5)));
	assert_eq!(stream.render(), "SeqScan(t) |> Filter((amount = 1.5))");
}

#[test]
fn lossless_literal_is_coerced_to_the_indexs_declared_kind() {
	// `amount` declared Double; an integer literal widens losslessly and the
	// index is used.
	let schema = TableSchema::new("t", Path::field("id")).with_index(IndexDef {
		name: "idx_t_amount".to_string(),
		path: Path::field("amount"),
		unique: false,
		value_kind: Some(ValueKind::Double),
	});
	let stream = optimized("t", schema, eq("amount", Value::Integer(5)));
	assert_eq!(stream.render(), "IndexScan(idx_t_amount, [= 5])");
}

#[test]
fn in_predicate_lowers_to_one_exact_range_per_element() {
	let schema = TableSchema::new("t", Path::field("id")).with_index(IndexDef {
		name: "idx_t_tag".to_string(),
		path: Path::field("tag"),
		unique: false,
		value_kind: Some(ValueKind::Text),
	});
	let expr = Expr::Binary {
		left: Box::new(Expr::Path(Path::field("tag"))),
		op: BinaryOperator::In,
		right: Box::new(Expr::Literal(Value::Array(vec![
			Value::Text("a".to_string()),
			Value::Text("b".to_string()),
		]))),
	};
	let stream = optimized("t", schema, expr);
	assert_eq!(stream.render(), "IndexScan(idx_t_tag, [= 'a'], [= 'b'])");
}

#[test]
fn between_predicate_lowers_to_a_single_range_on_the_primary_key() {
	let schema = TableSchema::new("t", Path::field("id"));
	let expr = Expr::Between {
		expr: Box::new(Expr::Path(Path::field("id"))),
		low: Box::new(Expr::Literal(Value::Integer(10))),
		high: Box::new(Expr::Literal(Value::Integer(20))),
	};
	let stream = optimized("t", schema, expr);
	assert_eq!(stream.render(), "PkScan(t, [>=10, <=20])");
}

#[test]
fn not_equal_is_never_indexable() {
	let schema = TableSchema::new("t", Path::field("id")).with_index(IndexDef {
		name: "idx_t_a".to_string(),
		path: Path::field("a"),
		unique: false,
		value_kind: None,
	});
	let expr = Expr::Binary {
		left: Box::new(Expr::Path(Path::field("a"))),
		op: BinaryOperator::NotEqual,
		right: Box::new(Expr::Literal(Value::Integer(1))),
	};
	let stream = optimized("t", schema, expr);
	assert_eq!(stream.render(), "SeqScan(t) |> Filter((a != 1))");
}

#[test]
fn a_literal_on_the_left_hand_side_is_still_recognized() {
	let schema = TableSchema::new("t", Path::field("id"));
	let expr = Expr::Binary {
		left: Box::new(Expr::Literal(Value::Integer(5))),
		op: BinaryOperator::MoreThan,
		right: Box::new(Expr::Path(Path::field("id"))),
	};
	// `5 > id` flips to `id < 5`.
	let stream = optimized("t", schema, expr);
	assert_eq!(stream.render(), "PkScan(t, [<5])");
}
