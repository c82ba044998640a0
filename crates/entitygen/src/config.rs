//! Configuration for entitygen.
//!
//! Loads config from:
//! 1. Global: ~/.config/entitygen/config.toml
//! 2. Per-project: .entitygen/config.toml (overrides global)
//!
//! or from a single file passed with `--config`.
//!
//! Example config.toml:
//! ```toml
//! schema = "docs/schema/entity-model.json"
//!
//! [outputs]
//! go = "pkg/domain/entitymodel/model_gen.go"
//! openapi = "api/openapi/entity-model.yaml"
//! sql_postgres = "db/postgres/schema.sql"
//! sql_sqlite = "db/sqlite/schema.sql"
//!
//! [go]
//! package = "entitymodel"
//!
//! [openapi]
//! title = "Entity Model"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Artifact paths. An unset path skips that artifact.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputsConfig {
    pub go: Option<PathBuf>,
    pub openapi: Option<PathBuf>,
    pub sql_postgres: Option<PathBuf>,
    pub sql_sqlite: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GoConfig {
    /// Go package name of the generated file.
    pub package: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiConfig {
    /// `info.title` of the generated document.
    pub title: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EntitygenConfig {
    pub schema: Option<PathBuf>,
    pub outputs: OutputsConfig,
    pub go: GoConfig,
    pub openapi: OpenApiConfig,
}

impl EntitygenConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/entitygen/config.toml, then merges
    /// per-project config from .entitygen/config.toml on top. Missing files
    /// are skipped; files that exist must parse.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path()
            && let Some(global) = Self::load_optional(&global_path)?
        {
            tracing::debug!(path = %global_path.display(), "loaded global config");
            config = config.merge(global);
        }

        let project_path = root.join(".entitygen").join("config.toml");
        if let Some(project) = Self::load_optional(&project_path)? {
            tracing::debug!(path = %project_path.display(), "loaded project config");
            config = config.merge(project);
        }

        Ok(config)
    }

    /// Load exactly one config file, which must exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::load_file(path).map(Some)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("entitygen").join("config.toml"))
    }

    /// Merge another config into this one. Values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            schema: other.schema.or(self.schema),
            outputs: OutputsConfig {
                go: other.outputs.go.or(self.outputs.go),
                openapi: other.outputs.openapi.or(self.outputs.openapi),
                sql_postgres: other.outputs.sql_postgres.or(self.outputs.sql_postgres),
                sql_sqlite: other.outputs.sql_sqlite.or(self.outputs.sql_sqlite),
            },
            go: GoConfig {
                package: other.go.package.or(self.go.package),
            },
            openapi: OpenApiConfig {
                title: other.openapi.title.or(self.openapi.title),
            },
        }
    }
}
