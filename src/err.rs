//! Error taxonomy for the planner, expression evaluator and executor.
//!
//! Every error carries enough context (the offending expression or value,
//! rendered, plus the table/field name where relevant) to be surfaced to a
//! caller without further lookups. No panics cross the planner or executor
//! boundary; every fallible path here returns `Result<_, Error>`.

use thiserror::Error;

/// The single error type produced by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
	// ---------------------------------------------------------------
	// Type errors
	// ---------------------------------------------------------------
	#[error("incompatible types in `{op}`: {left} and {right}")]
	IncompatibleTypes {
		op: String,
		left: String,
		right: String,
	},

	#[error("cannot losslessly convert {value} to {target}")]
	LossyConversion {
		value: String,
		target: String,
	},

	#[error("expected a boolean value, found {value}")]
	NotBoolean {
		value: String,
	},

	// ---------------------------------------------------------------
	// Arithmetic errors
	// ---------------------------------------------------------------
	#[error("integer overflow evaluating `{left} {op} {right}`")]
	ArithmeticOverflow {
		op: String,
		left: String,
		right: String,
	},

	#[error("division by zero evaluating `{left} / {right}`")]
	DivisionByZero {
		left: String,
		right: String,
	},

	#[error("modulo by zero evaluating `{left} % {right}`")]
	ModuloByZero {
		left: String,
		right: String,
	},

	// ---------------------------------------------------------------
	// Not found errors
	// ---------------------------------------------------------------
	#[error("table `{table}` not found")]
	TableNotFound {
		table: String,
	},

	#[error("index `{index}` not found")]
	IndexNotFound {
		index: String,
	},

	#[error("missing parameter {param}")]
	ParameterNotFound {
		param: String,
	},

	// ---------------------------------------------------------------
	// Constraint errors
	// ---------------------------------------------------------------
	#[error("duplicate key in unique index `{index}`: {value}")]
	DuplicateKey {
		index: String,
		value: String,
	},

	#[error("primary key collision in table `{table}`: {value}")]
	PrimaryKeyCollision {
		table: String,
		value: String,
	},

	// ---------------------------------------------------------------
	// Engine errors (wrapping the storage boundary, §6)
	// ---------------------------------------------------------------
	#[error("storage engine error: {0}")]
	Engine(String),

	#[error("key not found")]
	KeyNotFound,

	#[error("store `{0}` already exists")]
	StoreAlreadyExists(String),

	#[error("index `{0}` already exists")]
	IndexAlreadyExists(String),

	// ---------------------------------------------------------------
	// Transaction errors (§5)
	// ---------------------------------------------------------------
	#[error("statement requires a read-write transaction")]
	ReadOnlyTransaction,

	// ---------------------------------------------------------------
	// Cancellation (§5, §7)
	// ---------------------------------------------------------------
	#[error("execution cancelled")]
	Cancelled,

	// ---------------------------------------------------------------
	// Planner-internal failures
	// ---------------------------------------------------------------
	#[error("invalid statement target: {value}")]
	InvalidStatementTarget {
		value: String,
	},

	#[error("expression tree exceeds the maximum planning depth of {limit}")]
	PlanDepthExceeded {
		limit: u32,
	},

	#[error("codec error: {0}")]
	Codec(String),
}

impl Error {
	/// Whether this error represents cooperative cancellation rather than a
	/// genuine failure (§5 Cancellation, §7 Propagation policy).
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Error::Cancelled)
	}
}
