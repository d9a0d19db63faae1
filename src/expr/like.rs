//! `LIKE` pattern matching: `%` matches any run of characters (including
//! none), `_` matches exactly one character, and `\` escapes the character
//! that follows it, including a literal `%`, `_` or `\` (§4.1).

/// Compile a `LIKE` pattern into a flat token list, so escaping is resolved
/// once rather than re-inspected on every backtrack.
enum Token {
	Any,       // %
	One,       // _
	Char(char),
}

fn compile(pattern: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut chars = pattern.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				if let Some(escaped) = chars.next() {
					tokens.push(Token::Char(escaped));
				} else {
					tokens.push(Token::Char('\\'));
				}
			}
			'%' => tokens.push(Token::Any),
			'_' => tokens.push(Token::One),
			c => tokens.push(Token::Char(c)),
		}
	}
	tokens
}

pub fn matches(text: &str, pattern: &str) -> bool {
	let tokens = compile(pattern);
	let chars: Vec<char> = text.chars().collect();
	matches_from(&chars, &tokens)
}

fn matches_from(text: &[char], tokens: &[Token]) -> bool {
	match tokens.first() {
		None => text.is_empty(),
		Some(Token::Any) => {
			let rest = &tokens[1..];
			(0..=text.len()).any(|i| matches_from(&text[i..], rest))
		}
		Some(Token::One) => match text.split_first() {
			Some((_, rest_text)) => matches_from(rest_text, &tokens[1..]),
			None => false,
		},
		Some(Token::Char(c)) => match text.split_first() {
			Some((head, rest_text)) if head == c => matches_from(rest_text, &tokens[1..]),
			_ => false,
		},
	}
}
