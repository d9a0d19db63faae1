//! End-to-end query execution (§4.2, §5) against
//! `engine::memory::MemoryEngine`, driven entirely through the public
//! `Executor`/`Plan`/`planner::optimize` surface — no internal module is
//! reached into here.

use std::collections::HashMap;

use surrealdoc_core::catalog::{Catalog, IndexDef, TableSchema};
use surrealdoc_core::codec::JsonCodec;
use surrealdoc_core::engine::memory::MemoryEngine;
use surrealdoc_core::engine::{Engine, Transaction};
use surrealdoc_core::env::Environment;
use surrealdoc_core::err::Error;
use surrealdoc_core::expr::operator::BinaryOperator;
use surrealdoc_core::expr::Expr;
use surrealdoc_core::path::Path;
use surrealdoc_core::plan::Plan;
use surrealdoc_core::planner::optimize;
use surrealdoc_core::stream::{ProjectItem, Stream};
use surrealdoc_core::value::convert::ValueKind;
use surrealdoc_core::value::{Document, Value};
use surrealdoc_core::{Executor, Row};

fn doc(pairs: &[(&str, Value)]) -> Value {
	let mut d = Document::new();
	for (k, v) in pairs {
		d.insert((*k).to_string(), v.clone());
	}
	Value::Document(d)
}

fn field<'a>(row_doc: &'a Value, name: &str) -> &'a Value {
	match row_doc {
		Value::Document(d) => d.get(name).unwrap(),
		_ => panic!("expected a document row"),
	}
}

fn text(v: &Value) -> &str {
	match v {
		Value::Text(s) => s.as_str(),
		other => panic!("expected text, found {other:?}"),
	}
}

fn seed_people(executor: &Executor, txn: &mut impl Transaction) {
	for (id, name, age) in [(1i64, "ada", 30i64), (2, "bob", 22), (3, "cleo", 41)] {
		let row = Row::new(
			Value::Integer(id),
			doc(&[("name", Value::Text(name.to_string())), ("age", Value::Integer(age))]),
		);
		executor.insert(txn, "people", &row).unwrap();
	}
}

#[test]
fn filter_project_and_sort_compose_through_a_read_only_transaction() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let catalog: HashMap<String, TableSchema> = HashMap::new();
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	seed_people(&executor, &mut txn);
	txn.commit().unwrap();

	let stream = Stream::Sort {
		input: Box::new(Stream::Project {
			input: Box::new(Stream::Filter {
				input: Box::new(Stream::SeqScan { table: "people".to_string() }),
				expr: Expr::Binary {
					left: Box::new(Expr::Path(Path::field("age"))),
					op: BinaryOperator::MoreThanOrEqual,
					right: Box::new(Expr::Literal(Value::Integer(30))),
				},
			}),
			items: vec![ProjectItem::new(Expr::Path(Path::field("name")))],
		}),
		expr: Expr::Path(Path::field("name")),
		desc: false,
	};
	let plan = Plan::new(stream);
	assert!(plan.read_only);

	let mut txn = engine.begin(true).unwrap();
	let rows = executor.execute(&mut txn, &plan, &Environment::new()).unwrap();
	let names: Vec<&str> = rows.iter().map(|r| text(field(&r.document, "name"))).collect();
	assert_eq!(names, vec!["ada", "cleo"]);
}

#[test]
fn take_and_skip_page_through_sorted_results() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let catalog: HashMap<String, TableSchema> = HashMap::new();
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	seed_people(&executor, &mut txn);
	txn.commit().unwrap();

	let stream = Stream::Take {
		input: Box::new(Stream::Skip {
			input: Box::new(Stream::Sort {
				input: Box::new(Stream::SeqScan { table: "people".to_string() }),
				expr: Expr::Path(Path::field("age")),
				desc: false,
			}),
			n: 1,
		}),
		n: 1,
	};
	let plan = Plan::new(stream);
	let mut txn = engine.begin(true).unwrap();
	let rows = executor.execute(&mut txn, &plan, &Environment::new()).unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].id, Value::Integer(1));
}

#[test]
fn full_pipeline_optimizes_to_an_index_scan_and_returns_the_matching_row() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let mut catalog: HashMap<String, TableSchema> = HashMap::new();
	catalog.insert(
		"people".to_string(),
		TableSchema::new("people", Path::field("id")).with_index(IndexDef {
			name: "idx_people_name".to_string(),
			path: Path::field("name"),
			unique: true,
			value_kind: Some(ValueKind::Text),
		}),
	);
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	seed_people(&executor, &mut txn);
	txn.commit().unwrap();

	let stream = Stream::Filter {
		input: Box::new(Stream::SeqScan { table: "people".to_string() }),
		expr: Expr::Binary {
			left: Box::new(Expr::Path(Path::field("name"))),
			op: BinaryOperator::Equal,
			right: Box::new(Expr::Literal(Value::Text("bob".to_string()))),
		},
	};
	let env = Environment::new();
	let plan = optimize(Plan::new(stream), &env, &catalog).unwrap();
	assert_eq!(plan.stream.render(), "IndexScan(idx_people_name, [= 'bob'])");

	let mut txn = engine.begin(true).unwrap();
	let rows = executor.execute(&mut txn, &plan, &env).unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].id, Value::Integer(2));
}

#[test]
fn table_delete_removes_the_matching_rows_and_their_index_entries() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let mut catalog: HashMap<String, TableSchema> = HashMap::new();
	catalog.insert(
		"people".to_string(),
		TableSchema::new("people", Path::field("id")).with_index(IndexDef {
			name: "idx_people_age".to_string(),
			path: Path::field("age"),
			unique: false,
			value_kind: Some(ValueKind::Integer),
		}),
	);
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	seed_people(&executor, &mut txn);
	txn.commit().unwrap();

	let delete_plan = Plan::new(Stream::TableDelete {
		input: Box::new(Stream::Filter {
			input: Box::new(Stream::SeqScan { table: "people".to_string() }),
			expr: Expr::Binary {
				left: Box::new(Expr::Path(Path::field("age"))),
				op: BinaryOperator::LessThan,
				right: Box::new(Expr::Literal(Value::Integer(25))),
			},
		}),
		table: "people".to_string(),
	});
	assert!(!delete_plan.read_only);

	let mut txn = engine.begin(false).unwrap();
	let deleted = executor.execute(&mut txn, &delete_plan, &Environment::new()).unwrap();
	assert_eq!(deleted.len(), 1);
	assert_eq!(deleted[0].id, Value::Integer(2));
	txn.commit().unwrap();

	let mut txn = engine.begin(true).unwrap();
	let remaining = executor
		.execute(&mut txn, &Plan::new(Stream::SeqScan { table: "people".to_string() }), &Environment::new())
		.unwrap();
	assert_eq!(remaining.len(), 2);
}

#[test]
fn writing_through_a_read_only_transaction_is_rejected() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let catalog: HashMap<String, TableSchema> = HashMap::new();
	let executor = Executor::new(&codec, &catalog);

	let plan = Plan::new(Stream::Truncate { table: "people".to_string() });
	let mut txn = engine.begin(true).unwrap();
	assert!(matches!(executor.execute(&mut txn, &plan, &Environment::new()), Err(Error::ReadOnlyTransaction)));
}

#[test]
fn distinct_deduplicates_by_projected_document() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let catalog: HashMap<String, TableSchema> = HashMap::new();
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	for (id, city) in [(1i64, "ny"), (2, "ny"), (3, "sf")] {
		let row = Row::new(Value::Integer(id), doc(&[("city", Value::Text(city.to_string()))]));
		executor.insert(&mut txn, "checkins", &row).unwrap();
	}
	txn.commit().unwrap();

	let stream = Stream::Distinct {
		input: Box::new(Stream::Project {
			input: Box::new(Stream::SeqScan { table: "checkins".to_string() }),
			items: vec![ProjectItem::new(Expr::Path(Path::field("city")))],
		}),
	};
	let mut txn = engine.begin(true).unwrap();
	let rows = executor.execute(&mut txn, &Plan::new(stream), &Environment::new()).unwrap();
	assert_eq!(rows.len(), 2);
}

#[test]
fn insert_against_a_table_with_no_catalog_entry_still_succeeds() {
	let engine = MemoryEngine::new();
	let codec = JsonCodec;
	let catalog: HashMap<String, TableSchema> = HashMap::new();
	assert!(catalog.schema("ghost").is_none());
	let executor = Executor::new(&codec, &catalog);

	let mut txn = engine.begin(false).unwrap();
	let row = Row::new(Value::Integer(1), doc(&[("x", Value::Integer(1))]));
	executor.insert(&mut txn, "ghost", &row).unwrap();
	txn.commit().unwrap();

	let mut txn = engine.begin(true).unwrap();
	let rows = executor
		.execute(&mut txn, &Plan::new(Stream::SeqScan { table: "ghost".to_string() }), &Environment::new())
		.unwrap();
	assert_eq!(rows.len(), 1);
}
