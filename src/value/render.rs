//! Canonical textual rendering of [`Value`], used for `Expression::render`
//! (§4.1) and as the dedup key for `Distinct` (§9 open question (b)).

use std::fmt::Write;

use super::Value;

impl Value {
	/// Render this value to its canonical textual form.
	///
	/// The rendering includes a type tag implicitly through syntax (quoting
	/// for text, `x'..'` for blobs) so that values of different kinds never
	/// render identically — this is what lets `Distinct` use `render()` as
	/// a dedup key without conflating e.g. `Integer(1)` and `Double(1.0)`.
	pub fn render(&self) -> String {
		let mut out = String::new();
		self.render_into(&mut out);
		out
	}

	fn render_into(&self, out: &mut String) {
		match self {
			Value::Null => out.push_str("NULL"),
			Value::Bool(true) => out.push_str("true"),
			Value::Bool(false) => out.push_str("false"),
			Value::Integer(n) => {
				let _ = write!(out, "{n}");
			}
			Value::Double(d) => {
				if d.fract() == 0.0 && d.is_finite() {
					let _ = write!(out, "{d:.1}");
				} else {
					let _ = write!(out, "{d}");
				}
			}
			Value::Text(s) => {
				out.push('\'');
				for c in s.chars() {
					if c == '\'' || c == '\\' {
						out.push('\\');
					}
					out.push(c);
				}
				out.push('\'');
			}
			Value::Blob(b) => {
				out.push_str("x'");
				for byte in b {
					let _ = write!(out, "{byte:02x}");
				}
				out.push('\'');
			}
			Value::Array(items) => {
				out.push('[');
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						out.push_str(", ");
					}
					item.render_into(out);
				}
				out.push(']');
			}
			Value::Document(doc) => {
				out.push('{');
				for (i, (k, v)) in doc.iter().enumerate() {
					if i > 0 {
						out.push_str(", ");
					}
					let _ = write!(out, "{k}: ");
					v.render_into(out);
				}
				out.push('}');
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integers_and_doubles_render_distinctly() {
		assert_ne!(Value::Integer(1).render(), Value::Double(1.0).render());
		assert_eq!(Value::Double(1.0).render(), "1.0");
		assert_eq!(Value::Integer(1).render(), "1");
	}

	#[test]
	fn text_escapes_quotes() {
		assert_eq!(Value::from("it's").render(), "'it\\'s'");
	}

	#[test]
	fn array_renders_elements_in_order() {
		let v = Value::Array(vec![Value::Integer(1), Value::from("a")]);
		assert_eq!(v.render(), "[1, 'a']");
	}
}
