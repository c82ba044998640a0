//! Intermediate representation of an entity-model schema.
//!
//! The IR mirrors the JSON document one-to-one. Every map is a `BTreeMap`, so
//! iteration is always sorted by the original (unmangled) name and all
//! backends inherit deterministic ordering for free.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A complete entity-model schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version, surfaced as `info.version` in OpenAPI output.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Global semantics of the `id` field shared by every entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_semantics: Option<IdSemantics>,
    #[serde(default)]
    pub enums: BTreeMap<String, Enum>,
    #[serde(default)]
    pub definitions: BTreeMap<String, Property>,
    #[serde(default)]
    pub entities: BTreeMap<String, Entity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSemantics {
    #[serde(default, rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// An enum of string values. Order of `values` is significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enum {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub terminal: Vec<String>,
}

/// A property shape, shared by `definitions` and entity/object properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Raw `additionalProperties`; only a boolean value is meaningful here.
    #[serde(
        default,
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Value>,
}

/// A domain entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default)]
    pub natural_keys: Vec<NaturalKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<States>,
    /// Documentation-only labels.
    #[serde(default)]
    pub invariants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub target: String,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub storage: Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "0..1")]
    ZeroOrOne,
    #[serde(rename = "1..1")]
    ExactlyOne,
    #[serde(rename = "0..n")]
    ZeroOrMany,
    #[serde(rename = "1..n")]
    OneOrMany,
}

impl Cardinality {
    /// `0..1` and `1..1`.
    pub fn is_singular(self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ExactlyOne)
    }
}

/// Declared storage for a relationship field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Storage {
    /// Empty string: the compiler decides.
    #[default]
    #[serde(rename = "")]
    Auto,
    #[serde(rename = "fk")]
    ForeignKey,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaturalKey {
    pub fields: Vec<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub description: String,
}

/// State-machine metadata attached to an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct States {
    #[serde(rename = "enum")]
    pub enum_name: String,
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub terminal: Vec<String>,
}

/// State-machine metadata that does not agree with its enum.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("entity {entity:?}: states reference unknown enum {enum_name:?}")]
    UnknownStateEnum { entity: String, enum_name: String },
    #[error("entity {entity:?}: initial state {state:?} is not a value of enum {enum_name:?}")]
    InitialNotInEnum {
        entity: String,
        enum_name: String,
        state: String,
    },
    #[error("entity {entity:?}: terminal state {state:?} is not a value of enum {enum_name:?}")]
    TerminalNotInEnum {
        entity: String,
        enum_name: String,
        state: String,
    },
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Check every entity's `states` block against the enum it names.
    ///
    /// An empty `initial` is accepted; a non-empty one must be an enum value.
    pub fn validate_states(&self) -> Result<(), SchemaError> {
        for (entity_name, entity) in &self.entities {
            let Some(states) = &entity.states else {
                continue;
            };
            let Some(enumeration) = self.enums.get(&states.enum_name) else {
                return Err(SchemaError::UnknownStateEnum {
                    entity: entity_name.clone(),
                    enum_name: states.enum_name.clone(),
                });
            };
            if !states.initial.is_empty() && !enumeration.contains(&states.initial) {
                return Err(SchemaError::InitialNotInEnum {
                    entity: entity_name.clone(),
                    enum_name: states.enum_name.clone(),
                    state: states.initial.clone(),
                });
            }
            if let Some(state) = states.terminal.iter().find(|s| !enumeration.contains(s)) {
                return Err(SchemaError::TerminalNotInEnum {
                    entity: entity_name.clone(),
                    enum_name: states.enum_name.clone(),
                    state: state.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Enum {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl Entity {
    /// Whether `field` is listed in `required`. Matching ignores ASCII case.
    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r.eq_ignore_ascii_case(field))
    }
}

impl Property {
    /// A primitive property of the given JSON type.
    pub fn primitive(ty: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            ..Default::default()
        }
    }

    /// A `$ref` property.
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn array_of(items: Property) -> Self {
        Self {
            ty: Some("array".into()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// `additionalProperties` when it is a literal boolean.
    pub fn additional_properties_flag(&self) -> Option<bool> {
        self.additional_properties.as_ref().and_then(Value::as_bool)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r.eq_ignore_ascii_case(field))
    }
}
