//! OpenAPI 3.1 component backend.
//!
//! Every enum and definition becomes one component schema keyed by its
//! camel-cased name. Every entity becomes three: the read shape (keyed by the
//! entity name), `<Entity>Create` and `<Entity>Update`.

use crate::error::GenerateError;
use crate::ir::{Entity, Property, Schema};
use crate::naming::to_camel;
use crate::output::yaml::encode_yaml;
use crate::resolve::{Primitive, ResolveError, SemanticType, TypeResolver};
use crate::traits::{Backend, BackendCategory};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const OPENAPI_VERSION: &str = "3.1.0";

const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Server-managed fields: read-only on reads, absent from writes.
const SERVER_MANAGED: [&str; 3] = ["id", "created_at", "updated_at"];

/// Options for OpenAPI generation.
#[derive(Debug, Clone)]
pub struct OpenApiOptions {
    /// `info.title`.
    pub title: String,
    /// Tool named in the banner.
    pub generator: String,
    /// Schema path named in the banner, if known.
    pub source: Option<String>,
}

impl Default for OpenApiOptions {
    fn default() -> Self {
        Self {
            title: "Entity Model".to_string(),
            generator: "entitygen".to_string(),
            source: Some("docs/schema/entity-model.json".to_string()),
        }
    }
}

/// OpenAPI backend implementing the Backend trait.
#[derive(Debug, Clone, Default)]
pub struct OpenApiBackend {
    pub options: OpenApiOptions,
}

impl OpenApiBackend {
    pub fn new(options: OpenApiOptions) -> Self {
        Self { options }
    }
}

impl Backend for OpenApiBackend {
    fn name(&self) -> &'static str {
        "openapi"
    }

    fn extension(&self) -> &'static str {
        "yaml"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Contract
    }

    fn generate(&self, schema: &Schema) -> Result<String, GenerateError> {
        generate_openapi(schema, &self.options)
    }
}

/// Render the OpenAPI document as YAML, banner included.
pub fn generate_openapi(
    schema: &Schema,
    options: &OpenApiOptions,
) -> Result<String, GenerateError> {
    let document = build_openapi_document(schema, options)?;

    let mut out = format!("# Code generated by {}. DO NOT EDIT.\n", options.generator);
    if let Some(source) = &options.source {
        out.push_str(&format!("# Source of truth: {source}\n"));
    }
    out.push_str(&encode_yaml(&document));
    Ok(out)
}

/// Build the OpenAPI document as a JSON value.
pub fn build_openapi_document(
    schema: &Schema,
    options: &OpenApiOptions,
) -> Result<Value, GenerateError> {
    let builder = SchemaBuilder {
        resolver: TypeResolver::for_schema(schema),
    };
    let mut components = Map::new();

    for (name, enumeration) in &schema.enums {
        components.insert(
            to_camel(name),
            json!({"type": "string", "enum": enumeration.values}),
        );
    }

    for (name, def) in &schema.definitions {
        let component =
            builder
                .definition(def)
                .map_err(|source| GenerateError::Definition {
                    definition: name.clone(),
                    source,
                })?;
        components.insert(to_camel(name), component);
    }

    for (name, entity) in &schema.entities {
        let [read, create, update] = builder.entity(name, entity)?;
        components.insert(name.clone(), read);
        components.insert(format!("{name}Create"), create);
        components.insert(format!("{name}Update"), update);
    }

    tracing::debug!(components = components.len(), "built openapi components");

    Ok(json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": options.title,
            "version": schema.version,
        },
        "components": {
            "schemas": components,
        },
    }))
}

struct SchemaBuilder<'a> {
    resolver: TypeResolver<'a>,
}

impl SchemaBuilder<'_> {
    fn definition(&self, def: &Property) -> Result<Value, ResolveError> {
        let ty = self.resolver.resolve(def)?;
        self.schema_for(&ty)
    }

    /// Read, Create and Update schemas.
    fn entity(&self, name: &str, entity: &Entity) -> Result<[Value; 3], GenerateError> {
        let mut properties = Map::new();
        for (prop_name, prop) in &entity.properties {
            let schema = self
                .property(prop)
                .map_err(|source| GenerateError::Property {
                    entity: name.to_string(),
                    property: prop_name.clone(),
                    source,
                })?;
            properties.insert(prop_name.clone(), schema);
        }

        for field in SERVER_MANAGED {
            if let Some(Value::Object(schema)) = properties.get_mut(field) {
                schema.insert("readOnly".to_string(), Value::Bool(true));
            }
        }

        let mut read = Map::new();
        read.insert("type".into(), json!("object"));
        read.insert("properties".into(), Value::Object(properties.clone()));
        if !entity.required.is_empty() {
            read.insert("required".into(), json!(entity.required));
        }

        for field in SERVER_MANAGED {
            properties.remove(field);
        }

        let mut create_required: Vec<&String> = entity
            .required
            .iter()
            .filter(|r| !SERVER_MANAGED.iter().any(|m| r.eq_ignore_ascii_case(m)))
            .collect();
        create_required.sort();

        let mut create = Map::new();
        create.insert("type".into(), json!("object"));
        create.insert("properties".into(), Value::Object(properties.clone()));
        if !create_required.is_empty() {
            create.insert("required".into(), json!(create_required));
        }

        let update = json!({"type": "object", "properties": properties});

        Ok([Value::Object(read), Value::Object(create), update])
    }

    fn property(&self, prop: &Property) -> Result<Value, ResolveError> {
        let ty = self.resolver.resolve(prop)?;
        self.schema_for(&ty)
    }

    fn schema_for(&self, ty: &SemanticType) -> Result<Value, ResolveError> {
        let schema = match ty {
            SemanticType::Primitive(p) => primitive(p),
            SemanticType::EnumRef(name) | SemanticType::DefinitionRef(name) => {
                json!({"$ref": format!("{COMPONENTS_PREFIX}{}", to_camel(name))})
            }
            SemanticType::Array(items) => {
                let items = self.schema_for(items)?;
                json!({"type": "array", "items": items})
            }
            SemanticType::Object(shape) => self.object(
                &shape.properties,
                &shape.required,
                shape.additional_properties,
            )?,
            SemanticType::Any => json!({}),
        };
        Ok(schema)
    }

    fn object(
        &self,
        properties: &BTreeMap<String, Property>,
        required: &[String],
        additional_properties: Option<bool>,
    ) -> Result<Value, ResolveError> {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));

        if !properties.is_empty() {
            let mut props = Map::new();
            for (name, prop) in properties {
                props.insert(name.clone(), self.property(prop)?);
            }
            schema.insert("properties".into(), Value::Object(props));
            if !required.is_empty() {
                schema.insert("required".into(), json!(required));
            }
        }
        if let Some(flag) = additional_properties {
            schema.insert("additionalProperties".into(), Value::Bool(flag));
        }
        Ok(Value::Object(schema))
    }
}

fn primitive(p: &Primitive) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!(p.type_name()));
    if let Some(format) = &p.format {
        schema.insert("format".into(), json!(format));
    }
    Value::Object(schema)
}
