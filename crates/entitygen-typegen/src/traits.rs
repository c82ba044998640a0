//! Traits for generation backends.

use crate::error::GenerateError;
use crate::ir::Schema;

/// Category of backend output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCategory {
    /// Typed struct projections for application code.
    Types,
    /// API contract documents.
    Contract,
    /// Relational DDL.
    Ddl,
}

/// A generation backend.
///
/// Backends transform an IR [`Schema`] into the bytes of one artifact. They
/// hold their own options, never share state, and return either the full
/// artifact or an error; there is no partial output.
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "go", "openapi", "sql-postgres").
    fn name(&self) -> &'static str;

    /// File extension for the artifact (e.g., "go", "yaml", "sql").
    fn extension(&self) -> &'static str;

    fn category(&self) -> BackendCategory;

    /// Generate the artifact from the IR schema.
    fn generate(&self, schema: &Schema) -> Result<String, GenerateError>;
}
