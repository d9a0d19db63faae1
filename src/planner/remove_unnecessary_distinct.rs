//! Rule 4 (§4.3): drop a `Distinct` immediately downstream of a `Project`
//! whose single column is already guaranteed unique by schema — a primary
//! key path, a uniquely-indexed path, or the `pk()` function (aliased or
//! not; the alias doesn't change which values come out of the expression).

use crate::catalog::{Catalog, TableSchema};
use crate::expr::{Expr, Function};
use crate::stream::Stream;

pub fn apply(stream: Stream, catalog: &dyn Catalog) -> Stream {
	match stream {
		Stream::Distinct { input } => {
			let input = apply(*input, catalog);
			if is_guaranteed_unique(&input, catalog) {
				input
			} else {
				Stream::Distinct { input: Box::new(input) }
			}
		}
		other => other.map_input(|s| apply(s, catalog)),
	}
}

fn is_guaranteed_unique(stream: &Stream, catalog: &dyn Catalog) -> bool {
	let Stream::Project { input, items } = stream else {
		return false;
	};
	let [item] = items.as_slice() else {
		return false;
	};
	let Some(table) = input.source_table() else {
		return false;
	};
	let Some(schema) = catalog.schema(table) else {
		return false;
	};
	is_unique_expr(&item.expr, schema)
}

fn is_unique_expr(expr: &Expr, schema: &TableSchema) -> bool {
	match expr {
		Expr::Path(path) => schema.is_primary_key(path) || schema.indexes_on(path).any(|ix| ix.unique),
		Expr::Function(Function::Pk) => true,
		_ => false,
	}
}
