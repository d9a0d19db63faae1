//! The record codec consumed by the core (§6 External interfaces): encodes
//! a [`Value::Document`] to bytes for storage. The core only requires that
//! encode/decode round-trip exactly (§8 round-trip law); `JsonCodec` is the
//! reference implementation used by tests and [`crate::engine::memory`].

use indexmap::IndexMap;

use crate::err::Error;
use crate::value::{Document, Value};

pub trait RecordCodec {
	fn encode(&self, doc: &Document) -> Result<Vec<u8>, Error>;
	fn decode(&self, bytes: &[u8]) -> Result<Document, Error>;
}

/// Encodes documents as JSON via `serde_json`, the teacher's own
/// serialization crate for everything outside its custom binary `revision`
/// format. Blobs are tagged `{"$blob": "<hex>"}` since raw JSON has no byte
/// string type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
	fn encode(&self, doc: &Document) -> Result<Vec<u8>, Error> {
		let json = value_to_json(&Value::Document(doc.clone()));
		serde_json::to_vec(&json).map_err(|e| Error::Codec(e.to_string()))
	}

	fn decode(&self, bytes: &[u8]) -> Result<Document, Error> {
		let json: serde_json::Value =
			serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))?;
		match json_to_value(json) {
			Value::Document(doc) => Ok(doc),
			other => Err(Error::Codec(format!("decoded record was not a document: {}", other.render()))),
		}
	}
}

fn value_to_json(value: &Value) -> serde_json::Value {
	use serde_json::Value as J;
	match value {
		Value::Null => J::Null,
		Value::Bool(b) => J::Bool(*b),
		Value::Integer(n) => J::Number((*n).into()),
		Value::Double(d) => serde_json::Number::from_f64(*d).map(J::Number).unwrap_or(J::Null),
		Value::Text(s) => J::String(s.clone()),
		Value::Blob(b) => {
			let mut obj = serde_json::Map::new();
			obj.insert("$blob".to_string(), J::String(hex_encode(b)));
			J::Object(obj)
		}
		Value::Array(items) => J::Array(items.iter().map(value_to_json).collect()),
		Value::Document(doc) => {
			let mut obj = serde_json::Map::new();
			for (k, v) in doc {
				obj.insert(k.clone(), value_to_json(v));
			}
			J::Object(obj)
		}
	}
}

fn json_to_value(json: serde_json::Value) -> Value {
	use serde_json::Value as J;
	match json {
		J::Null => Value::Null,
		J::Bool(b) => Value::Bool(b),
		J::Number(n) => {
			if let Some(i) = n.as_i64() {
				Value::Integer(i)
			} else {
				Value::Double(n.as_f64().unwrap_or(0.0))
			}
		}
		J::String(s) => Value::Text(s),
		J::Array(items) => Value::Array(items.into_iter().map(json_to_value).collect()),
		J::Object(obj) => {
			if obj.len() == 1 {
				if let Some(J::String(hex)) = obj.get("$blob") {
					if let Some(bytes) = hex_decode(hex) {
						return Value::Blob(bytes);
					}
				}
			}
			let mut doc: Document = IndexMap::with_capacity(obj.len());
			for (k, v) in obj {
				doc.insert(k, json_to_value(v));
			}
			Value::Document(doc)
		}
	}
}

fn hex_encode(bytes: &[u8]) -> String {
	use std::fmt::Write;
	let mut out = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		let _ = write!(out, "{b:02x}");
	}
	out
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
	if s.len() % 2 != 0 {
		return None;
	}
	(0..s.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
		.collect()
}
