//! Type resolution shared by every backend.
//!
//! A property's declared `type`/`$ref` is resolved structurally into a
//! [`SemanticType`]. Resolution never looks at backend concerns; each backend
//! maps the semantic type onto its own type system.

use crate::ir::{Enum, Property, Schema};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";
pub const ENUMS_PREFIX: &str = "#/enums/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown definition reference {0:?}")]
    UnknownDefinition(String),
    #[error("unknown enum reference {0:?}")]
    UnknownEnum(String),
    #[error("unsupported ref {0:?}")]
    UnsupportedRef(String),
    #[error("definition reference cycle through {0:?}")]
    RefCycle(String),
}

/// The resolved meaning of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    Primitive(Primitive),
    /// `#/enums/<name>`.
    EnumRef(String),
    /// `#/definitions/<name>`; the definition is known to exist.
    DefinitionRef(String),
    Array(Box<SemanticType>),
    Object(ObjectShape),
    /// Missing or unrecognized `type`.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub format: Option<String>,
}

/// An inline object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    pub properties: BTreeMap<String, Property>,
    pub required: Vec<String>,
    pub additional_properties: Option<bool>,
}

/// Definitions every backend treats specially by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    /// `#/definitions/id`
    Id,
    /// `#/definitions/entity_id`
    EntityId,
    /// `#/definitions/timestamp`
    Timestamp,
}

impl WellKnown {
    pub fn from_definition(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "entity_id" => Some(Self::EntityId),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// `id` and `entity_id` are identifier-shaped.
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::Id | Self::EntityId)
    }
}

impl Primitive {
    /// `date-time` (or `timestamp`) formatted strings.
    pub fn is_chronological(&self) -> bool {
        self.kind == PrimitiveKind::String
            && matches!(self.format.as_deref(), Some("date-time" | "timestamp"))
    }

    pub fn is_uuid(&self) -> bool {
        self.kind == PrimitiveKind::String && self.format.as_deref() == Some("uuid")
    }

    /// JSON type keyword.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

impl SemanticType {
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

/// Resolves properties against a schema's enums and definitions.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    enums: &'a BTreeMap<String, Enum>,
    definitions: &'a BTreeMap<String, Property>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        enums: &'a BTreeMap<String, Enum>,
        definitions: &'a BTreeMap<String, Property>,
    ) -> Self {
        Self { enums, definitions }
    }

    pub fn for_schema(schema: &'a Schema) -> Self {
        Self::new(&schema.enums, &schema.definitions)
    }

    pub fn enumeration(&self, name: &str) -> Option<&'a Enum> {
        self.enums.get(name)
    }

    /// Resolve a property to its semantic type.
    pub fn resolve(&self, prop: &Property) -> Result<SemanticType, ResolveError> {
        if let Some(reference) = &prop.reference {
            return self.resolve_ref(reference);
        }

        let ty = match prop.ty.as_deref() {
            Some("string") => primitive(PrimitiveKind::String, prop),
            Some("integer") => primitive(PrimitiveKind::Integer, prop),
            Some("number") => primitive(PrimitiveKind::Number, prop),
            Some("boolean") => primitive(PrimitiveKind::Boolean, prop),
            Some("array") => {
                let items = match &prop.items {
                    Some(items) => self.resolve(items)?,
                    None => SemanticType::Any,
                };
                SemanticType::Array(Box::new(items))
            }
            Some("object") => object(prop),
            None if !prop.properties.is_empty() => object(prop),
            _ => SemanticType::Any,
        };
        Ok(ty)
    }

    fn resolve_ref(&self, reference: &str) -> Result<SemanticType, ResolveError> {
        if let Some(name) = reference.strip_prefix(DEFINITIONS_PREFIX) {
            if self.definitions.contains_key(name) {
                return Ok(SemanticType::DefinitionRef(name.to_string()));
            }
            return Err(ResolveError::UnknownDefinition(reference.to_string()));
        }
        if let Some(name) = reference.strip_prefix(ENUMS_PREFIX) {
            if self.enums.contains_key(name) {
                return Ok(SemanticType::EnumRef(name.to_string()));
            }
            return Err(ResolveError::UnknownEnum(reference.to_string()));
        }
        Err(ResolveError::UnsupportedRef(reference.to_string()))
    }

    /// Follow definition references until a non-reference shape is reached.
    pub fn underlying(&self, ty: &SemanticType) -> Result<SemanticType, ResolveError> {
        let mut current = ty.clone();
        let mut seen = BTreeSet::new();
        while let SemanticType::DefinitionRef(name) = &current {
            if !seen.insert(name.clone()) {
                return Err(ResolveError::RefCycle(name.clone()));
            }
            let def = self
                .definitions
                .get(name)
                .ok_or_else(|| {
                    ResolveError::UnknownDefinition(format!("{DEFINITIONS_PREFIX}{name}"))
                })?;
            current = self.resolve(def)?;
        }
        Ok(current)
    }

    /// Whether the property is array-valued, looking through definition refs.
    pub fn is_array(&self, prop: &Property) -> Result<bool, ResolveError> {
        let resolved = self.resolve(prop)?;
        Ok(self.underlying(&resolved)?.is_array())
    }
}

/// Resolve `prop` against explicit enum and definition tables.
pub fn resolve_property(
    prop: &Property,
    enums: &BTreeMap<String, Enum>,
    definitions: &BTreeMap<String, Property>,
) -> Result<SemanticType, ResolveError> {
    TypeResolver::new(enums, definitions).resolve(prop)
}

fn primitive(kind: PrimitiveKind, prop: &Property) -> SemanticType {
    SemanticType::Primitive(Primitive {
        kind,
        format: prop.format.clone(),
    })
}

fn object(prop: &Property) -> SemanticType {
    SemanticType::Object(ObjectShape {
        properties: prop.properties.clone(),
        required: prop.required.clone(),
        additional_properties: prop.additional_properties_flag(),
    })
}
