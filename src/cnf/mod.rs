//! Crate-wide tunables, resolved from the environment with typed defaults.
//!
//! Mirrors the `once_cell::sync::Lazy` + environment-parsing pattern used
//! throughout `surrealdb-core::cnf`, scaled down to the handful of knobs the
//! planner and executor in this crate actually need.

use once_cell::sync::Lazy;

macro_rules! lazy_env_parse {
	($key:expr, $t:ty, $default:expr) => {
		Lazy::new(|| {
			std::env::var($key).ok().and_then(|v| v.parse::<$t>().ok()).unwrap_or($default)
		})
	};
}

/// Batch size used by the in-memory reference engine when scanning a range
/// (`ascend_from`); mirrors `surrealdb-core::cnf::PROCESSOR_BATCH_SIZE`.
pub static SCAN_BATCH_SIZE: Lazy<usize> =
	lazy_env_parse!("SURREALDOC_SCAN_BATCH_SIZE", usize, 256);

/// Upper bound on how many rows `Distinct` buffers before it considers the
/// dedup set unbounded; purely advisory in this synchronous, in-memory
/// implementation, kept for parity with `EXTERNAL_SORTING_BUFFER_LIMIT`.
pub static DISTINCT_BUFFER_LIMIT: Lazy<usize> =
	lazy_env_parse!("SURREALDOC_DISTINCT_BUFFER_LIMIT", usize, 50_000);

/// Maximum depth the planner will descend into a single expression tree
/// while looking for constant subtrees or indexable predicates, guarding
/// against pathological inputs. Mirrors
/// `surrealdb-core::cnf::MAX_COMPUTATION_DEPTH`.
pub static MAX_PLAN_DEPTH: Lazy<u32> = lazy_env_parse!("SURREALDOC_MAX_PLAN_DEPTH", u32, 128);
