//! Entity-model schema compiler.
//!
//! `entitygen-typegen` compiles one JSON entity-model document into the
//! artifacts downstream code depends on: Go struct projections, an OpenAPI 3.1
//! component document and relational DDL for Postgres and SQLite.
//!
//! # Architecture
//!
//! ```text
//! Input            IR               Output Backends
//! ─────────    ─────────────     ──────────────────────────
//!                               ┌─> Go structs + enums
//! JSON file ──> Schema ─────────┼─> OpenAPI 3.1 YAML
//!              (ir.rs)          └─> SQL DDL (Postgres, SQLite)
//!                 │
//!                 └── resolve.rs: property -> SemanticType
//! ```
//!
//! Every map in the IR is ordered, so every artifact is byte-for-byte
//! reproducible for a given input.
//!
//! # Example
//!
//! ```
//! use entitygen_typegen::{input, output};
//!
//! let schema = input::parse_schema(r##"{
//!     "entities": {
//!         "Facility": {
//!             "required": ["id", "name"],
//!             "properties": {
//!                 "id": {"type": "string", "format": "uuid"},
//!                 "name": {"type": "string"}
//!             }
//!         }
//!     }
//! }"##).unwrap();
//!
//! let ddl = output::generate_sql(&schema, output::Dialect::Postgres).unwrap();
//! assert!(ddl.contains("CREATE TABLE IF NOT EXISTS facilities"));
//! ```
//!
//! # Feature Flags
//!
//! - `backend-go` - Go structs with json tags
//! - `backend-openapi` - OpenAPI 3.1 components as YAML
//! - `backend-sql` - Postgres and SQLite DDL

pub mod error;
pub mod input;
pub mod ir;
pub mod naming;
pub mod output;
pub mod resolve;
pub mod traits;

pub use error::{FormatError, GenerateError};
pub use input::{LoadError, load_schema, parse_schema};
pub use ir::{Schema, SchemaError};
pub use resolve::{ResolveError, SemanticType, TypeResolver, resolve_property};
pub use traits::{Backend, BackendCategory};

#[cfg(feature = "backend-go")]
pub use output::{GoBackend, generate_go_types};

#[cfg(feature = "backend-openapi")]
pub use output::{OpenApiBackend, generate_openapi};

#[cfg(feature = "backend-sql")]
pub use output::{Dialect, SqlBackend, generate_sql};
