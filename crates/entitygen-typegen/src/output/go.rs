//! Go struct projection backend.
//!
//! Emits one named string type plus a const block per enum, one struct per
//! object definition that has required fields, and one struct per entity.
//! Struct fields are sorted by property name and carry `json` tags.

use crate::error::{FormatError, GenerateError};
use crate::ir::{Entity, Enum, Property, Schema};
use crate::naming::to_camel;
use crate::output::gofmt::{self, CELL};
use crate::resolve::{PrimitiveKind, ResolveError, SemanticType, TypeResolver, WellKnown};
use crate::traits::{Backend, BackendCategory};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Options for Go code generation.
#[derive(Debug, Clone)]
pub struct GoOptions {
    /// Package clause of the generated file.
    pub package: String,
    /// Tool named in the `Code generated by` header.
    pub generator: String,
}

impl Default for GoOptions {
    fn default() -> Self {
        Self {
            package: "entitymodel".to_string(),
            generator: "entitygen".to_string(),
        }
    }
}

/// Go backend implementing the Backend trait.
#[derive(Debug, Clone, Default)]
pub struct GoBackend {
    pub options: GoOptions,
}

impl GoBackend {
    pub fn new(options: GoOptions) -> Self {
        Self { options }
    }
}

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Types
    }

    fn generate(&self, schema: &Schema) -> Result<String, GenerateError> {
        generate_go_types(schema, &self.options)
    }
}

/// Generate a formatted Go source file from a schema.
pub fn generate_go_types(schema: &Schema, options: &GoOptions) -> Result<String, GenerateError> {
    gofmt::identifier(&options.package)?;

    let mut writer = GoWriter::new(schema);
    writer.write_enums(&schema.enums)?;
    writer.write_definitions(&schema.definitions)?;
    writer.write_entities(&schema.entities)?;

    let mut file = String::new();
    let _ = writeln!(
        file,
        "// Code generated by {}. DO NOT EDIT.",
        options.generator
    );
    let _ = writeln!(file, "package {}\n", options.package);
    if writer.uses_time {
        file.push_str("import \"time\"\n\n");
    }
    file.push_str(&writer.output);

    tracing::debug!(
        enums = schema.enums.len(),
        structs = writer.structs,
        "rendered go projection"
    );
    Ok(gofmt::format_source(&file)?)
}

/// Definitions emitted as named structs: objects with properties and at
/// least one required field.
fn is_struct_definition(def: &Property) -> bool {
    !def.properties.is_empty() && !def.required.is_empty()
}

/// Slices, maps and pointers already have a meaningful zero value.
fn apply_optional(base: String, required: bool) -> String {
    if required || base.starts_with("[]") || base.starts_with("map[") || base.starts_with('*') {
        base
    } else {
        format!("*{base}")
    }
}

fn json_tag(name: &str, required: bool) -> String {
    if required {
        format!("`json:\"{name}\"`")
    } else {
        format!("`json:\"{name},omitempty\"`")
    }
}

/// Emits the body of the Go file; the header is added once imports are known.
struct GoWriter<'a> {
    resolver: TypeResolver<'a>,
    named_definitions: BTreeSet<&'a str>,
    output: String,
    uses_time: bool,
    structs: usize,
}

impl<'a> GoWriter<'a> {
    fn new(schema: &'a Schema) -> Self {
        let named_definitions = schema
            .definitions
            .iter()
            .filter(|(_, def)| is_struct_definition(def))
            .map(|(name, _)| name.as_str())
            .collect();
        Self {
            resolver: TypeResolver::for_schema(schema),
            named_definitions,
            output: String::new(),
            uses_time: false,
            structs: 0,
        }
    }

    fn write_enums(&mut self, enums: &BTreeMap<String, Enum>) -> Result<(), GenerateError> {
        for (name, enumeration) in enums {
            let type_name = to_camel(name);
            let wrap = |source: FormatError| GenerateError::Enum {
                name: name.clone(),
                source,
            };
            gofmt::identifier(&type_name).map_err(wrap)?;

            let _ = writeln!(self.output, "// {type_name} enumerates values for {name}.");
            let _ = writeln!(self.output, "type {type_name} string\n");
            if enumeration.values.is_empty() {
                continue;
            }
            self.output.push_str("const (\n");
            for value in &enumeration.values {
                let suffix = to_camel(value);
                if suffix.is_empty() {
                    return Err(wrap(FormatError::InvalidIdentifier(value.clone())));
                }
                let constant = format!("{type_name}{suffix}");
                gofmt::identifier(&constant).map_err(wrap)?;
                let _ = writeln!(
                    self.output,
                    "\t{constant}{CELL}{type_name}{CELL}= {}",
                    gofmt::quote(value)
                );
            }
            self.output.push_str(")\n\n");
        }
        Ok(())
    }

    fn write_definitions(
        &mut self,
        definitions: &'a BTreeMap<String, Property>,
    ) -> Result<(), GenerateError> {
        for (name, def) in definitions {
            if !is_struct_definition(def) {
                continue;
            }
            let type_name = to_camel(name);
            gofmt::identifier(&type_name)?;

            let mut fields = Vec::with_capacity(def.properties.len());
            for (prop_name, prop) in &def.properties {
                let required = def.is_required(prop_name);
                let go_type = self.go_type(prop, required).map_err(|source| {
                    GenerateError::DefinitionProperty {
                        definition: name.clone(),
                        property: prop_name.clone(),
                        source,
                    }
                })?;
                fields.push((prop_name.as_str(), go_type, required));
            }

            let _ = writeln!(
                self.output,
                "// {type_name} is generated from the entity model definitions."
            );
            self.write_struct(&type_name, &fields)?;
        }
        Ok(())
    }

    fn write_entities(
        &mut self,
        entities: &'a BTreeMap<String, Entity>,
    ) -> Result<(), GenerateError> {
        for (name, entity) in entities {
            gofmt::identifier(name)?;

            let mut fields = Vec::with_capacity(entity.properties.len());
            for (prop_name, prop) in &entity.properties {
                let required = entity.is_required(prop_name);
                let go_type =
                    self.go_type(prop, required)
                        .map_err(|source| GenerateError::Property {
                            entity: name.clone(),
                            property: prop_name.clone(),
                            source,
                        })?;
                fields.push((prop_name.as_str(), go_type, required));
            }

            let _ = writeln!(
                self.output,
                "// {name} is generated from the entity model entities."
            );
            self.write_struct(name, &fields)?;
        }
        Ok(())
    }

    fn write_struct(
        &mut self,
        type_name: &str,
        fields: &[(&str, String, bool)],
    ) -> Result<(), GenerateError> {
        let _ = writeln!(self.output, "type {type_name} struct {{");
        for (prop_name, go_type, required) in fields {
            let field = to_camel(prop_name);
            gofmt::identifier(&field)?;
            let _ = writeln!(
                self.output,
                "\t{field}{CELL}{go_type}{CELL}{}",
                json_tag(prop_name, *required)
            );
        }
        self.output.push_str("}\n\n");
        self.structs += 1;
        Ok(())
    }

    fn go_type(&mut self, prop: &Property, required: bool) -> Result<String, ResolveError> {
        let ty = self.resolver.resolve(prop)?;
        let base = self.type_for(&ty)?;
        Ok(apply_optional(base, required))
    }

    fn type_for(&mut self, ty: &SemanticType) -> Result<String, ResolveError> {
        let go = match ty {
            SemanticType::Primitive(p) if p.is_chronological() => self.time(),
            SemanticType::Primitive(p) => match p.kind {
                PrimitiveKind::String => "string".to_string(),
                PrimitiveKind::Integer => "int".to_string(),
                PrimitiveKind::Number => "float64".to_string(),
                PrimitiveKind::Boolean => "bool".to_string(),
            },
            SemanticType::EnumRef(name) => to_camel(name),
            SemanticType::DefinitionRef(name) => match WellKnown::from_definition(name) {
                Some(known) if known.is_identifier() => "string".to_string(),
                Some(_) => self.time(),
                None if self.named_definitions.contains(name.as_str()) => to_camel(name),
                None => {
                    let underlying = self.resolver.underlying(ty)?;
                    self.type_for(&underlying)?
                }
            },
            // Slice elements are never pointer-wrapped.
            SemanticType::Array(items) => format!("[]{}", self.type_for(items)?),
            SemanticType::Object(_) => "map[string]any".to_string(),
            SemanticType::Any => "any".to_string(),
        };
        Ok(go)
    }

    fn time(&mut self) -> String {
        self.uses_time = true;
        "time.Time".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_schema;

    fn generate(json: &str) -> String {
        let schema = parse_schema(json).unwrap();
        generate_go_types(&schema, &GoOptions::default()).unwrap()
    }

    #[test]
    fn enums_become_string_types_with_constants() {
        let out = generate(
            r#"{"enums": {"housing_state": {"values": ["quarantine", "in_use", "api_hold"]}}}"#,
        );
        insta::assert_snapshot!(out, @r#"
        // Code generated by entitygen. DO NOT EDIT.
        package entitymodel

        // HousingState enumerates values for housing_state.
        type HousingState string

        const (
        	HousingStateQuarantine HousingState = "quarantine"
        	HousingStateInUse      HousingState = "in_use"
        	HousingStateAPIHold    HousingState = "api_hold"
        )
        "#);
    }

    #[test]
    fn entity_fields_are_sorted_and_optional_fields_wrapped() {
        let out = generate(
            r##"{
                "definitions": {
                    "id": {"type": "string", "format": "uuid"},
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "enums": {"status": {"values": ["active"]}},
                "entities": {
                    "Project": {
                        "required": ["id", "name", "created_at"],
                        "properties": {
                            "name": {"type": "string"},
                            "id": {"$ref": "#/definitions/id"},
                            "created_at": {"$ref": "#/definitions/timestamp"},
                            "status": {"$ref": "#/enums/status"},
                            "budget": {"type": "number"},
                            "facility_ids": {"type": "array", "items": {"$ref": "#/definitions/id"}},
                            "attributes": {"type": "object", "additionalProperties": true}
                        }
                    }
                }
            }"##,
        );
        assert!(out.contains("import \"time\""));
        let start = out.find("type Project struct").unwrap();
        insta::assert_snapshot!(&out[start..], @r#"
        type Project struct {
        	Attributes  map[string]any `json:"attributes,omitempty"`
        	Budget      *float64       `json:"budget,omitempty"`
        	CreatedAt   time.Time      `json:"created_at"`
        	FacilityIDs []string       `json:"facility_ids,omitempty"`
        	ID          string         `json:"id"`
        	Name        string         `json:"name"`
        	Status      *Status        `json:"status,omitempty"`
        }
        "#);
    }

    #[test]
    fn time_import_only_when_needed() {
        let out = generate(r#"{"entities": {"Tag": {"properties": {"label": {"type": "string"}}}}}"#);
        assert!(!out.contains("import"));
        assert!(out.contains("Label *string `json:\"label,omitempty\"`"));
    }

    #[test]
    fn definitions_need_properties_and_required() {
        let out = generate(
            r##"{
                "definitions": {
                    "address": {
                        "type": "object",
                        "required": ["line1"],
                        "properties": {"line1": {"type": "string"}, "zip": {"type": "integer"}}
                    },
                    "extension_attributes": {"type": "object", "additionalProperties": true},
                    "loose": {"type": "object", "properties": {"a": {"type": "string"}}},
                    "code": {"type": "string"}
                },
                "entities": {
                    "Site": {
                        "required": ["address"],
                        "properties": {
                            "address": {"$ref": "#/definitions/address"},
                            "extra": {"$ref": "#/definitions/extension_attributes"},
                            "loose": {"$ref": "#/definitions/loose"},
                            "code": {"$ref": "#/definitions/code"}
                        }
                    }
                }
            }"##,
        );
        assert!(out.contains("type Address struct {"));
        assert!(out.contains("\tLine1 string `json:\"line1\"`"));
        assert!(out.contains("\tZip   *int   `json:\"zip,omitempty\"`"));
        assert!(!out.contains("type Loose struct"));
        assert!(!out.contains("type ExtensionAttributes"));
        assert!(out.contains("\tAddress Address"));
        assert!(out.contains("\tCode    *string"));
        assert!(out.contains("\tExtra   map[string]any"));
        assert!(out.contains("\tLoose   map[string]any"));
    }

    #[test]
    fn unresolved_refs_name_entity_and_property() {
        let schema = parse_schema(
            r##"{"entities": {"Cage": {"properties": {"room": {"$ref": "#/definitions/room"}}}}}"##,
        )
        .unwrap();
        let err = generate_go_types(&schema, &GoOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Property { ref entity, ref property, .. }
                if entity == "Cage" && property == "room"
        ));
    }

    #[test]
    fn invalid_identifiers_are_format_errors() {
        let schema =
            parse_schema(r#"{"entities": {"cage card": {"properties": {}}}}"#).unwrap();
        assert!(matches!(
            generate_go_types(&schema, &GoOptions::default()),
            Err(GenerateError::Format(FormatError::InvalidIdentifier(_)))
        ));

        let schema = parse_schema("{}").unwrap();
        let options = GoOptions {
            package: "entity-model".into(),
            ..Default::default()
        };
        assert!(generate_go_types(&schema, &options).is_err());
    }

    #[test]
    fn enum_values_without_a_name_are_rejected() {
        for value in ["", "_"] {
            let schema = parse_schema(&format!(
                r#"{{"enums": {{"mood": {{"values": ["calm", "{value}"]}}}}}}"#
            ))
            .unwrap();
            let err = generate_go_types(&schema, &GoOptions::default()).unwrap_err();
            assert!(
                matches!(
                    err,
                    GenerateError::Enum {
                        ref name,
                        source: FormatError::InvalidIdentifier(_),
                    } if name == "mood"
                ),
                "{err:?}"
            );
        }
    }

    #[test]
    fn pointer_wrapping_rules() {
        assert_eq!(apply_optional("string".into(), false), "*string");
        assert_eq!(apply_optional("string".into(), true), "string");
        assert_eq!(apply_optional("[]string".into(), false), "[]string");
        assert_eq!(apply_optional("map[string]any".into(), false), "map[string]any");
        assert_eq!(apply_optional("*Thing".into(), false), "*Thing");
        assert_eq!(apply_optional("any".into(), false), "*any");
    }

    #[test]
    fn backend_metadata() {
        let backend = GoBackend::default();
        assert_eq!(backend.name(), "go");
        assert_eq!(backend.extension(), "go");
        assert_eq!(backend.category(), BackendCategory::Types);
        let out = backend.generate(&Schema::new()).unwrap();
        assert_eq!(
            out,
            "// Code generated by entitygen. DO NOT EDIT.\npackage entitymodel\n"
        );
    }
}
