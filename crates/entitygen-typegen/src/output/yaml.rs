//! Minimal YAML emitter for generated documents.
//!
//! Handles maps, sequences and scalars only. Map keys are always written in
//! sorted order, strings are always double-quoted, empty containers render as
//! `{}` / `[]`, and each nesting level indents by two spaces. The output for a
//! given [`Value`] never depends on the version of any YAML library.

use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Encode `value` as a YAML document.
pub fn encode_yaml(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Object(map) if !map.is_empty() => write_map(out, map, indent),
        Value::Array(items) if !items.is_empty() => write_sequence(out, items, indent),
        scalar => {
            pad(out, indent);
            out.push_str(&inline(scalar));
            out.push('\n');
        }
    }
}

fn write_map(out: &mut String, map: &Map<String, Value>, indent: usize) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        pad(out, indent);
        out.push_str(&format_key(key));
        out.push(':');
        write_entry(out, value, indent);
    }
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize) {
    for item in items {
        pad(out, indent);
        out.push('-');
        write_entry(out, item, indent);
    }
}

/// The part after `key:` or `-`.
fn write_entry(out: &mut String, value: &Value, indent: usize) {
    if is_block(value) {
        out.push('\n');
        write_value(out, value, indent + 1);
    } else {
        out.push(' ');
        out.push_str(&inline(value));
        out.push('\n');
    }
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
    }
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

/// Keys that read back as the same string when left unquoted.
fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '$' | '/'))
        && !matches!(
            key,
            "true" | "false" | "null" | "yes" | "no" | "on" | "off" | "True" | "False" | "Null"
        )
        && key.parse::<f64>().is_err()
}

fn format_key(key: &str) -> String {
    if is_plain_key(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// YAML double-quoted scalar.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_document_layout() {
        let doc = json!({
            "openapi": "3.1.0",
            "components": {
                "schemas": {
                    "Status": {"type": "string", "enum": ["active", "archived"]},
                    "Empty": {},
                    "Tags": {"type": "array", "items": {}}
                }
            },
            "flags": [true, 2, null, [], [["x"]], {"a": 1}]
        });
        insta::assert_snapshot!(encode_yaml(&doc), @r#"
        components:
          schemas:
            Empty: {}
            Status:
              enum:
                - "active"
                - "archived"
              type: "string"
            Tags:
              items: {}
              type: "array"
        flags:
          - true
          - 2
          - null
          - []
          -
            -
              - "x"
          -
            a: 1
        openapi: "3.1.0"
        "#);
    }

    #[test]
    fn empty_containers_at_top_level() {
        assert_eq!(encode_yaml(&json!({})), "{}\n");
        assert_eq!(encode_yaml(&json!([])), "[]\n");
        assert_eq!(encode_yaml(&json!("x")), "\"x\"\n");
    }

    #[test]
    fn strings_are_escaped() {
        let doc = json!({"note": "say \"hi\"\\\n\tnow\u{7}"});
        assert_eq!(
            encode_yaml(&doc),
            "note: \"say \\\"hi\\\"\\\\\\n\\tnow\\u0007\"\n"
        );
    }

    #[test]
    fn awkward_keys_are_quoted() {
        assert_eq!(format_key("$ref"), "$ref");
        assert_eq!(format_key("created_at"), "created_at");
        assert_eq!(format_key("true"), "\"true\"");
        assert_eq!(format_key("42"), "\"42\"");
        assert_eq!(format_key("has space"), "\"has space\"");
        assert_eq!(format_key("-dash"), "\"-dash\"");
        assert_eq!(format_key(""), "\"\"");
    }

    #[test]
    fn output_parses_back_to_the_same_value() {
        let doc = json!({
            "a": {"b": [1, 2.5, "three", {"c": false}], "d": {}},
            "yes": "no",
            "odd key": ["line\nbreak", "quote\"", "unicodé"],
            "nested": [[], [{}], {"x": null}]
        });
        let yaml = encode_yaml(&doc);
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn keys_sorted_regardless_of_insertion_order() {
        let mut map = Map::new();
        map.insert("zeta".into(), json!(1));
        map.insert("alpha".into(), json!(2));
        map.insert("Mid".into(), json!(3));
        assert_eq!(
            encode_yaml(&Value::Object(map)),
            "Mid: 3\nalpha: 2\nzeta: 1\n"
        );
    }
}
