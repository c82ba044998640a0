//! Entity-model JSON to IR.

use crate::ir::Schema;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("read schema {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse schema {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load and parse the schema at `path`.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, LoadError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = parse_schema(&raw).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        version = %schema.version,
        enums = schema.enums.len(),
        definitions = schema.definitions.len(),
        entities = schema.entities.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Parse a schema from JSON text.
pub fn parse_schema(raw: &str) -> Result<Schema, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Cardinality, Storage};
    use std::io::Write;

    const MINIMAL: &str = r##"{
        "version": "0.4.0",
        "metadata": {"status": "draft"},
        "id_semantics": {"type": "uuid", "scope": "global", "required": true, "description": "opaque"},
        "enums": {"status": {"values": ["active", "archived"], "initial": "active", "terminal": ["archived"]}},
        "definitions": {"id": {"type": "string", "format": "uuid"}},
        "entities": {
            "Thing": {
                "required": ["id"],
                "properties": {
                    "id": {"$ref": "#/definitions/id"},
                    "owner_ids": {"type": "array", "items": {"$ref": "#/definitions/id"}, "uniqueItems": true}
                },
                "relationships": {"owner_ids": {"target": "Thing", "cardinality": "0..n", "storage": "json"}},
                "natural_keys": [{"fields": ["id"], "scope": "global"}],
                "invariants": ["thing_is_unique"]
            }
        }
    }"##;

    #[test]
    fn parse_full_shape() {
        let schema = parse_schema(MINIMAL).unwrap();
        assert_eq!(schema.version, "0.4.0");
        assert_eq!(schema.metadata.status, "draft");
        assert!(schema.id_semantics.as_ref().unwrap().required);
        assert_eq!(schema.enums["status"].values, vec!["active", "archived"]);

        let thing = schema.entity("Thing").unwrap();
        let rel = &thing.relationships["owner_ids"];
        assert_eq!(rel.cardinality, Cardinality::ZeroOrMany);
        assert_eq!(rel.storage, Storage::Json);
        assert_eq!(thing.natural_keys[0].fields, vec!["id"]);
        assert_eq!(thing.invariants, vec!["thing_is_unique"]);
        assert!(thing.properties["owner_ids"].items.is_some());
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.entities.len(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_schema(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().starts_with("read schema"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"entities\": ").unwrap();
        let err = load_schema(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().starts_with("parse schema"));
    }
}
