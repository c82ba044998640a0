//! Command-line driver for the entity-model compiler.
//!
//! The driver resolves settings (flags over config over defaults), loads the
//! schema, renders every requested artifact in memory and only then touches
//! the filesystem: either writing the artifacts or, with `--check`, comparing
//! them to what is already on disk.

pub mod config;

use anyhow::{Context, Result, bail};
use clap::Parser;
use config::EntitygenConfig;
use entitygen_typegen::output::{
    GoOptions, OpenApiOptions, SqlOptions, generate_go_types, generate_openapi,
    generate_sql_bundle,
};
use entitygen_typegen::{Schema, load_schema};
use std::fmt;
use std::path::{Path, PathBuf};

pub const GENERATOR: &str = "entitygen";
pub const DEFAULT_SCHEMA: &str = "docs/schema/entity-model.json";
pub const DEFAULT_GO_OUT: &str = "pkg/domain/entitymodel/model_gen.go";
pub const DEFAULT_PACKAGE: &str = "entitymodel";
pub const DEFAULT_TITLE: &str = "Entity Model";

/// Compile an entity-model JSON schema into Go types, OpenAPI components and SQL DDL.
#[derive(Debug, Default, Parser)]
#[command(name = "entitygen", version, about)]
pub struct Cli {
    /// Schema file [default: docs/schema/entity-model.json]
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Go output file; an empty value skips it [default: pkg/domain/entitymodel/model_gen.go]
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// OpenAPI YAML output file
    #[arg(long, value_name = "PATH")]
    pub openapi: Option<PathBuf>,

    /// Postgres DDL output file
    #[arg(long, value_name = "PATH")]
    pub sql_postgres: Option<PathBuf>,

    /// SQLite DDL output file
    #[arg(long, value_name = "PATH")]
    pub sql_sqlite: Option<PathBuf>,

    /// Go package name [default: entitymodel]
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Config file to use instead of the global and project config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Compare generated artifacts with the files on disk instead of writing
    #[arg(long)]
    pub check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved inputs and outputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub schema: PathBuf,
    pub go: Option<PathBuf>,
    pub openapi: Option<PathBuf>,
    pub sql_postgres: Option<PathBuf>,
    pub sql_sqlite: Option<PathBuf>,
    pub package: String,
    pub title: String,
}

impl Settings {
    /// Apply flags over `config` over built-in defaults.
    pub fn resolve(cli: &Cli, config: EntitygenConfig) -> Self {
        let pick = |flag: &Option<PathBuf>, configured: Option<PathBuf>| {
            flag.clone()
                .or(configured)
                .filter(|p| !p.as_os_str().is_empty())
        };
        Self {
            schema: cli
                .schema
                .clone()
                .or(config.schema)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA)),
            go: pick(
                &cli.out,
                Some(config.outputs.go.unwrap_or_else(|| PathBuf::from(DEFAULT_GO_OUT))),
            ),
            openapi: pick(&cli.openapi, config.outputs.openapi),
            sql_postgres: pick(&cli.sql_postgres, config.outputs.sql_postgres),
            sql_sqlite: pick(&cli.sql_sqlite, config.outputs.sql_sqlite),
            package: cli
                .package
                .clone()
                .or(config.go.package)
                .unwrap_or_else(|| DEFAULT_PACKAGE.to_string()),
            title: config
                .openapi
                .title
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }
}

/// Load the config selected by `cli`.
pub fn load_config(cli: &Cli, root: &Path) -> Result<EntitygenConfig> {
    let config = match &cli.config {
        Some(path) => EntitygenConfig::load_file(path)?,
        None => EntitygenConfig::load(root)?,
    };
    Ok(config)
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// An artifact whose file on disk does not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    Missing(PathBuf),
    Differs(PathBuf),
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "{}: missing", path.display()),
            Self::Differs(path) => write!(f, "{}: out of date", path.display()),
        }
    }
}

/// Load and validate the schema named by `settings`.
pub fn load(settings: &Settings) -> Result<Schema> {
    let schema = load_schema(&settings.schema)?;
    schema
        .validate_states()
        .with_context(|| format!("validate {}", settings.schema.display()))?;
    Ok(schema)
}

/// Render every requested artifact. Nothing is written.
pub fn render(schema: &Schema, settings: &Settings) -> Result<Vec<Artifact>> {
    let source = Some(settings.schema.display().to_string());
    let mut artifacts = Vec::new();

    if let Some(path) = &settings.go {
        let options = GoOptions {
            package: settings.package.clone(),
            generator: GENERATOR.to_string(),
        };
        let contents = generate_go_types(schema, &options).context("generate Go types")?;
        artifacts.push(Artifact {
            path: path.clone(),
            contents,
        });
    }

    if let Some(path) = &settings.openapi {
        let options = OpenApiOptions {
            title: settings.title.clone(),
            generator: GENERATOR.to_string(),
            source: source.clone(),
        };
        let contents = generate_openapi(schema, &options).context("generate OpenAPI")?;
        artifacts.push(Artifact {
            path: path.clone(),
            contents,
        });
    }

    if settings.sql_postgres.is_some() || settings.sql_sqlite.is_some() {
        let options = SqlOptions {
            generator: GENERATOR.to_string(),
            source,
        };
        let bundle = generate_sql_bundle(schema, &options).context("generate SQL")?;
        if let Some(path) = &settings.sql_postgres {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: bundle.postgres,
            });
        }
        if let Some(path) = &settings.sql_sqlite {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: bundle.sqlite,
            });
        }
    }

    Ok(artifacts)
}

/// Write artifacts, creating parent directories.
pub fn write(artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        if let Some(parent) = artifact.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        std::fs::write(&artifact.path, &artifact.contents)
            .with_context(|| format!("write {}", artifact.path.display()))?;
        tracing::info!(path = %artifact.path.display(), bytes = artifact.contents.len(), "wrote");
    }
    Ok(())
}

/// Compare artifacts with the files on disk.
pub fn check(artifacts: &[Artifact]) -> Result<Vec<Drift>> {
    let mut drift = Vec::new();
    for artifact in artifacts {
        match std::fs::read(&artifact.path) {
            Ok(existing) if existing == artifact.contents.as_bytes() => {
                tracing::debug!(path = %artifact.path.display(), "up to date");
            }
            Ok(_) => drift.push(Drift::Differs(artifact.path.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                drift.push(Drift::Missing(artifact.path.clone()));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", artifact.path.display()));
            }
        }
    }
    Ok(drift)
}

/// Render, then write or check.
pub fn run(settings: &Settings, check_only: bool) -> Result<()> {
    let schema = load(settings)?;
    let artifacts = render(&schema, settings)?;

    if check_only {
        let drift = check(&artifacts)?;
        if !drift.is_empty() {
            let report = drift
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            bail!("generated artifacts are stale:\n{report}");
        }
        tracing::info!(artifacts = artifacts.len(), "generated artifacts are up to date");
        return Ok(());
    }

    write(&artifacts)
}
