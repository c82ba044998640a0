//! Output backends.
//!
//! Each backend takes an IR [`Schema`](crate::ir::Schema) and produces one
//! artifact. All backends implement the [`Backend`](crate::traits::Backend)
//! trait so callers can drive them uniformly.

// Go
#[cfg(feature = "backend-go")]
pub mod go;
#[cfg(feature = "backend-go")]
pub mod gofmt;

#[cfg(feature = "backend-go")]
pub use go::{GoBackend, GoOptions, generate_go_types};

// OpenAPI
#[cfg(feature = "backend-openapi")]
pub mod openapi;
#[cfg(feature = "backend-openapi")]
pub mod yaml;

#[cfg(feature = "backend-openapi")]
pub use openapi::{OpenApiBackend, OpenApiOptions, build_openapi_document, generate_openapi};

// SQL
#[cfg(feature = "backend-sql")]
pub mod sql;

#[cfg(feature = "backend-sql")]
pub use sql::{
    Dialect, SqlBackend, SqlBundle, SqlOptions, generate_sql, generate_sql_bundle,
    generate_sql_with_options, split_statements,
};
