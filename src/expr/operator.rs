//! The closed set of binary and unary operators an [`super::Expr`] can carry
//! (§4.1), grounded on the teacher's `sql::operator::Operator` enum shape.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UnaryOperator {
	Neg,
	Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BinaryOperator {
	// logical
	And,
	Or,
	// arithmetic
	Add,
	Sub,
	Mul,
	Div,
	Rem,
	// bitwise
	BitAnd,
	BitOr,
	BitXor,
	// comparison
	Equal,
	NotEqual,
	LessThan,
	LessThanOrEqual,
	MoreThan,
	MoreThanOrEqual,
	// membership / range
	In,
	NotIn,
	// pattern
	Like,
	NotLike,
	// total, non-null-propagating identity comparison
	Is,
	IsNot,
}

impl BinaryOperator {
	/// Whether this operator reads as a range bound candidate for the
	/// index-selection rule (§4.4 Range derivation table).
	pub fn is_range_comparator(&self) -> bool {
		matches!(
			self,
			BinaryOperator::Equal
				| BinaryOperator::LessThan
				| BinaryOperator::LessThanOrEqual
				| BinaryOperator::MoreThan
				| BinaryOperator::MoreThanOrEqual
		)
	}
}

impl fmt::Display for UnaryOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			UnaryOperator::Neg => "-",
			UnaryOperator::Not => "NOT",
		})
	}
}

impl fmt::Display for BinaryOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			BinaryOperator::And => "AND",
			BinaryOperator::Or => "OR",
			BinaryOperator::Add => "+",
			BinaryOperator::Sub => "-",
			BinaryOperator::Mul => "*",
			BinaryOperator::Div => "/",
			BinaryOperator::Rem => "%",
			BinaryOperator::BitAnd => "&",
			BinaryOperator::BitOr => "|",
			BinaryOperator::BitXor => "^",
			BinaryOperator::Equal => "=",
			BinaryOperator::NotEqual => "!=",
			BinaryOperator::LessThan => "<",
			BinaryOperator::LessThanOrEqual => "<=",
			BinaryOperator::MoreThan => ">",
			BinaryOperator::MoreThanOrEqual => ">=",
			BinaryOperator::In => "IN",
			BinaryOperator::NotIn => "NOT IN",
			BinaryOperator::Like => "LIKE",
			BinaryOperator::NotLike => "NOT LIKE",
			BinaryOperator::Is => "IS",
			BinaryOperator::IsNot => "IS NOT",
		})
	}
}
