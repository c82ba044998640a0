//! Schema loading.
//!
//! Reads an entity-model JSON document into the IR [`Schema`](crate::ir::Schema).

mod schema;

pub use schema::{LoadError, load_schema, parse_schema};
