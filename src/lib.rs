//! Query-plan representation, rule-based optimizer and stream execution
//! engine for an embedded document database.
//!
//! This crate owns the middle of the stack: given a parsed expression tree
//! and an initial [`stream::Stream`], it rewrites the plan (`planner`) and
//! runs it (`exec`) against anything implementing the storage contract in
//! `engine` and the record contract in `codec`. Parsing SQL text into that
//! expression tree, encoding records on disk, and the top-level
//! transaction/statement lifecycle all live above this crate.
//!
//! A typical caller:
//!
//! ```ignore
//! let mut txn = engine.begin(false)?;
//! let plan = planner::optimize(Plan::new(stream), &env, &catalog)?;
//! let rows = Executor::new(&codec, &catalog).execute(&mut txn, &plan, &env)?;
//! txn.commit()?;
//! ```

pub mod catalog;
pub mod cnf;
pub mod codec;
pub mod engine;
pub mod env;
pub mod err;
pub mod exec;
pub mod expr;
mod keycodec;
pub mod path;
pub mod plan;
pub mod planner;
pub mod range;
pub mod stream;
pub mod value;

pub use env::Environment;
pub use err::Error;
pub use exec::{Executor, Row};
pub use expr::Expr;
pub use plan::Plan;
pub use stream::{Stream, StreamBuilder};
pub use value::{Document, Value};
