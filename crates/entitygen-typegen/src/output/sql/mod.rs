//! Relational DDL backend for Postgres and SQLite.
//!
//! Generation runs in two stages. [`plan::build_plan`] validates the schema
//! and decides where every relationship is stored; rendering turns the plan
//! into dialect-specific text and cannot fail. Both dialects render from the
//! same plan, so their table and join-table sets always agree.

mod bundle;
pub mod dialect;
pub mod plan;
mod render;
pub mod storage;
mod triggers;

pub use bundle::split_statements;
pub use dialect::{ColumnType, Dialect};
pub use plan::{Plan, build_plan};

use crate::error::GenerateError;
use crate::ir::Schema;
use crate::traits::{Backend, BackendCategory};
use render::SqlWriter;

/// Options shared by both dialects.
#[derive(Debug, Clone)]
pub struct SqlOptions {
    /// Tool named in the banner.
    pub generator: String,
    /// Schema path named in the banner, if known.
    pub source: Option<String>,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            generator: "entitygen".to_string(),
            source: Some("docs/schema/entity-model.json".to_string()),
        }
    }
}

/// SQL backend implementing the Backend trait, one per dialect.
#[derive(Debug, Clone)]
pub struct SqlBackend {
    pub dialect: Dialect,
    pub options: SqlOptions,
}

impl SqlBackend {
    pub fn new(dialect: Dialect, options: SqlOptions) -> Self {
        Self { dialect, options }
    }
}

impl Backend for SqlBackend {
    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::Postgres => "sql-postgres",
            Dialect::Sqlite => "sql-sqlite",
        }
    }

    fn extension(&self) -> &'static str {
        "sql"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Ddl
    }

    fn generate(&self, schema: &Schema) -> Result<String, GenerateError> {
        generate_sql_with_options(schema, self.dialect, &self.options)
    }
}

/// DDL for both dialects from a single plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBundle {
    pub postgres: String,
    pub sqlite: String,
}

impl SqlBundle {
    pub fn get(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Postgres => &self.postgres,
            Dialect::Sqlite => &self.sqlite,
        }
    }
}

/// Generate DDL for one dialect with default options.
pub fn generate_sql(schema: &Schema, dialect: Dialect) -> Result<String, GenerateError> {
    generate_sql_with_options(schema, dialect, &SqlOptions::default())
}

pub fn generate_sql_with_options(
    schema: &Schema,
    dialect: Dialect,
    options: &SqlOptions,
) -> Result<String, GenerateError> {
    let plan = build_plan(schema)?;
    Ok(render_plan(&plan, dialect, options))
}

/// Generate DDL for every dialect. The schema is planned once.
pub fn generate_sql_bundle(
    schema: &Schema,
    options: &SqlOptions,
) -> Result<SqlBundle, GenerateError> {
    let plan = build_plan(schema)?;
    tracing::debug!(
        tables = plan.tables.len(),
        join_tables = plan.join_tables.len(),
        required_joins = plan.required_joins.len(),
        "planned relational model"
    );
    Ok(SqlBundle {
        postgres: render_plan(&plan, Dialect::Postgres, options),
        sqlite: render_plan(&plan, Dialect::Sqlite, options),
    })
}

/// Render an already-built plan.
pub fn render_plan(plan: &Plan, dialect: Dialect, options: &SqlOptions) -> String {
    let mut writer = SqlWriter::new(dialect);
    writer.banner(&options.generator, options.source.as_deref());
    writer.plan(plan);
    writer.finish()
}
