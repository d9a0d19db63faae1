//! `EXPLAIN` (§4.3 supplemental): render a stream's chosen scan and
//! surviving residual filters as a document, grounded on the teacher's
//! `dbs::explanation::Explanation` / `IndexOption::explain` output shape,
//! simplified to a single plan rather than a per-table breakdown.

use indexmap::IndexMap;

use crate::stream::Stream;
use crate::value::Value;

pub fn explain(stream: &Stream) -> Value {
	let mut doc = IndexMap::new();
	doc.insert("plan".to_string(), Value::Text(stream.render()));
	doc.insert("scan".to_string(), describe_scan(stream));
	let filters: Vec<Value> = collect_filters(stream).into_iter().map(Value::Text).collect();
	doc.insert("residualFilters".to_string(), Value::Array(filters));
	Value::Document(doc)
}

fn describe_scan(stream: &Stream) -> Value {
	let mut doc = IndexMap::new();
	match stream {
		Stream::SeqScan { table } => {
			doc.insert("type".to_string(), Value::Text("SeqScan".to_string()));
			doc.insert("table".to_string(), Value::Text(table.clone()));
		}
		Stream::PkScan { table, ranges } => {
			doc.insert("type".to_string(), Value::Text("PkScan".to_string()));
			doc.insert("table".to_string(), Value::Text(table.clone()));
			doc.insert("ranges".to_string(), Value::Integer(ranges.len() as i64));
		}
		Stream::IndexScan { table, index, ranges } => {
			doc.insert("type".to_string(), Value::Text("IndexScan".to_string()));
			doc.insert("table".to_string(), Value::Text(table.clone()));
			doc.insert("index".to_string(), Value::Text(index.clone()));
			doc.insert("ranges".to_string(), Value::Integer(ranges.len() as i64));
		}
		Stream::Empty => {
			doc.insert("type".to_string(), Value::Text("Empty".to_string()));
		}
		_ => return stream.input().map(describe_scan).unwrap_or(Value::Null),
	}
	Value::Document(doc)
}

fn collect_filters(stream: &Stream) -> Vec<String> {
	let mut out = Vec::new();
	walk(stream, &mut out);
	out
}

fn walk(stream: &Stream, out: &mut Vec<String>) {
	if let Some(input) = stream.input() {
		walk(input, out);
	}
	if let Stream::Filter { expr, .. } = stream {
		out.push(expr.render());
	}
}
