//! Errors raised while generating an artifact.

use crate::resolve::ResolveError;

/// Generated Go source the formatter refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: unbalanced {delimiter:?}")]
    Unbalanced { line: usize, delimiter: char },
    #[error("unterminated {0} literal")]
    UnterminatedLiteral(&'static str),
    #[error("{0:?} is not a valid identifier")]
    InvalidIdentifier(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("enum {name:?}: {source}")]
    Enum {
        name: String,
        #[source]
        source: FormatError,
    },
    #[error("definition {definition:?}: {source}")]
    Definition {
        definition: String,
        #[source]
        source: ResolveError,
    },
    #[error("definition {definition:?}: property {property:?}: {source}")]
    DefinitionProperty {
        definition: String,
        property: String,
        #[source]
        source: ResolveError,
    },
    #[error("entity {entity:?}: property {property:?}: {source}")]
    Property {
        entity: String,
        property: String,
        #[source]
        source: ResolveError,
    },
    #[error("entity {entity:?} has no id property")]
    MissingId { entity: String },
    #[error("entity {entity:?}: id must resolve to a string or uuid shape")]
    InvalidId { entity: String },
    #[error("entity {entity:?}: relationship {field:?} uses fk storage but property is an array")]
    FkStorageOnArray { entity: String, field: String },
    #[error("entity {entity:?}: relationship {field:?} targets unknown entity {target:?}")]
    UnknownTarget {
        entity: String,
        field: String,
        target: String,
    },
    #[error("entity {entity:?}: relationship {field:?} has no matching property")]
    RelationshipWithoutProperty { entity: String, field: String },
    #[error("entity {entity:?}: natural key field {field:?} is not a column")]
    UnknownNaturalKeyField { entity: String, field: String },
    #[error("entities {first:?} and {second:?} both map to table {table:?}")]
    DuplicateTable {
        first: String,
        second: String,
        table: String,
    },
    #[error("format generated code: {0}")]
    Format(#[from] FormatError),
}
