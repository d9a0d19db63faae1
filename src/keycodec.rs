//! Key encoding for [`crate::engine::memory::MemoryEngine`] (§4.5: "ranges
//! are translated to encoded key prefixes by a transaction-supplied
//! encoder"). Production engines own this encoding entirely — it is outside
//! this core's contract (§6) — so this module exists only to make the
//! bundled reference engine's scans return rows in `Value` order.
//!
//! Numbers are encoded through the IEEE-754 sign/exponent flip trick so
//! unsigned-byte comparison matches `f64::total_cmp`; integers outside the
//! 2^53 exactly-representable range lose key-order precision, which is an
//! accepted limitation of a test fixture, not of the core itself.

use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_NUMBER: u8 = 2;
const TAG_TEXT: u8 = 3;
const TAG_BLOB: u8 = 4;
const TAG_OTHER: u8 = 5;

/// Order-preserving byte encoding of a scalar `Value`, used as a store key.
pub fn encode_key(value: &Value) -> Vec<u8> {
	match value {
		Value::Null => vec![TAG_NULL],
		Value::Bool(b) => vec![TAG_BOOL, *b as u8],
		Value::Integer(n) => encode_number(*n as f64),
		Value::Double(d) => encode_number(*d),
		Value::Text(s) => {
			let mut out = vec![TAG_TEXT];
			out.extend_from_slice(s.as_bytes());
			out
		}
		Value::Blob(b) => {
			let mut out = vec![TAG_BLOB];
			out.extend_from_slice(b);
			out
		}
		other => {
			let mut out = vec![TAG_OTHER];
			out.extend_from_slice(other.render().as_bytes());
			out
		}
	}
}

fn encode_number(d: f64) -> Vec<u8> {
	let bits = d.to_bits();
	let flipped = if bits & (1 << 63) != 0 { !bits } else { bits | (1 << 63) };
	let mut out = vec![TAG_NUMBER];
	out.extend_from_slice(&flipped.to_be_bytes());
	out
}

/// Recovers the `Value` a key was encoded from, for the scalar kinds
/// `encode_key` emits. `Integer` and `Double` are indistinguishable once
/// encoded (both share the numeric tag) and always decode as `Double`,
/// which is lossless for any value that went through `encode_key` to begin
/// with. Returns `None` for a malformed or `Array`/`Document`-tagged key.
pub fn decode_key(key: &[u8]) -> Option<Value> {
	match *key.first()? {
		TAG_NULL => Some(Value::Null),
		TAG_BOOL => key.get(1).map(|b| Value::Bool(*b != 0)),
		TAG_NUMBER => {
			let bits = u64::from_be_bytes(key.get(1..9)?.try_into().ok()?);
			let unflipped = if bits & (1 << 63) != 0 { bits & !(1 << 63) } else { !bits };
			Some(Value::Double(f64::from_bits(unflipped)))
		}
		TAG_TEXT => String::from_utf8(key[1..].to_vec()).ok().map(Value::Text),
		TAG_BLOB => Some(Value::Blob(key[1..].to_vec())),
		_ => None,
	}
}

/// Length-prefixed concatenation of primary-key bytes sharing one index
/// entry, for a non-unique index's value payload.
pub fn encode_pk_list(pks: &[Vec<u8>]) -> Vec<u8> {
	let mut out = Vec::new();
	for pk in pks {
		out.extend_from_slice(&(pk.len() as u32).to_be_bytes());
		out.extend_from_slice(pk);
	}
	out
}

pub fn decode_pk_list(bytes: &[u8]) -> Vec<Vec<u8>> {
	let mut out = Vec::new();
	let mut i = 0;
	while i + 4 <= bytes.len() {
		let len = u32::from_be_bytes(bytes[i..i + 4].try_into().unwrap()) as usize;
		i += 4;
		if i + len > bytes.len() {
			break;
		}
		out.push(bytes[i..i + len].to_vec());
		i += len;
	}
	out
}
