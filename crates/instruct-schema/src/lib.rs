//! JSON Schema generation for structured LLM output.
//!
//! Provider structured-output endpoints accept a restricted schema dialect:
//! no unresolved `$ref`, no union keywords, closed objects with every
//! property required, and no decorative metadata. [`generate`] derives a
//! schema from a type and [`normalize`] rewrites any schema into that
//! dialect.

use schemars::{JsonSchema, SchemaGenerator};
use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum `$ref` expansion depth before a branch is truncated.
///
/// Self-referential types would otherwise inline forever; providers reject
/// recursive schemas anyway, so truncation is the only workable outcome.
const MAX_REF_DEPTH: usize = 16;

/// Metadata keys stripped from every level of the schema
const STRIPPED_KEYS: [&str; 5] = ["$schema", "title", "format", "default", "nullable"];

/// Errors from schema generation
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The derived schema could not be serialized to JSON
    #[error("schema serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The schema root is not a JSON object
    #[error("generated schema is not a JSON object")]
    NotAnObject,
}

/// Generate a normalized JSON Schema for `T`
///
/// The result is ready to attach to any provider's structured-output
/// mechanism without further processing.
pub fn generate<T: JsonSchema>() -> Result<Value, SchemaError> {
    let schema = SchemaGenerator::default().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(schema)?;
    normalize(&mut value)?;
    Ok(value)
}

/// Rewrite `schema` in place into the restricted provider dialect
///
/// Guarantees after return: definitions inlined (no `$ref`), union keywords
/// flattened to a representative variant, `additionalProperties: false` on
/// every object, every declared property required, metadata keys stripped,
/// and the root carrying an explicit `"type": "object"`.
pub fn normalize(schema: &mut Value) -> Result<(), SchemaError> {
    let definitions = take_definitions(schema);
    inline_refs(schema, &definitions, 0);
    flatten_unions(schema);
    strip_metadata(schema);
    annotate_types(schema);
    close_objects(schema);
    require_all_properties(schema);

    let Value::Object(root) = schema else {
        return Err(SchemaError::NotAnObject);
    };
    root.insert("type".to_owned(), Value::String("object".to_owned()));
    Ok(())
}

/// Remove and return the root definitions table (`$defs` or `definitions`)
fn take_definitions(schema: &mut Value) -> Map<String, Value> {
    let mut definitions = Map::new();
    if let Value::Object(root) = schema {
        for key in ["$defs", "definitions"] {
            if let Some(Value::Object(defs)) = root.remove(key) {
                definitions.extend(defs);
            }
        }
    }
    definitions
}

/// Replace every `$ref` node with a clone of its definition
fn inline_refs(node: &mut Value, definitions: &Map<String, Value>, depth: usize) {
    match node {
        Value::Object(obj) => {
            if let Some(target) = obj.get("$ref").and_then(Value::as_str) {
                let name = target
                    .rsplit('/')
                    .next()
                    .unwrap_or(target)
                    .to_owned();
                let replacement = if depth < MAX_REF_DEPTH {
                    definitions.get(&name).cloned()
                } else {
                    None
                };
                *node = replacement.unwrap_or_else(
                    || serde_json::json!({"type": "object", "additionalProperties": false}),
                );
                inline_refs(node, definitions, depth + 1);
                return;
            }
            for value in obj.values_mut() {
                inline_refs(value, definitions, depth);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, definitions, depth);
            }
        }
        _ => {}
    }
}

/// Collapse `oneOf`/`anyOf` to their first variant and merge `allOf` members
fn flatten_unions(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            for value in obj.values_mut() {
                flatten_unions(value);
            }

            for key in ["oneOf", "anyOf"] {
                if let Some(Value::Array(variants)) = obj.remove(key)
                    && let Some(Value::Object(first)) = variants.into_iter().next()
                {
                    for (k, v) in first {
                        obj.entry(k).or_insert(v);
                    }
                }
            }

            if let Some(Value::Array(members)) = obj.remove("allOf") {
                for member in members {
                    if let Value::Object(member) = member {
                        for (k, v) in member {
                            obj.entry(k).or_insert(v);
                        }
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_unions(item);
            }
        }
        _ => {}
    }
}

/// Strip decorative metadata keys at every level
fn strip_metadata(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            for key in STRIPPED_KEYS {
                obj.remove(key);
            }
            for value in obj.values_mut() {
                strip_metadata(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_metadata(item);
            }
        }
        _ => {}
    }
}

/// Ensure objects and arrays carry an explicit `type`
fn annotate_types(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            if !obj.contains_key("type") {
                if obj.contains_key("properties") {
                    obj.insert("type".to_owned(), Value::String("object".to_owned()));
                } else if obj.contains_key("items") {
                    obj.insert("type".to_owned(), Value::String("array".to_owned()));
                }
            }
            for value in obj.values_mut() {
                annotate_types(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                annotate_types(item);
            }
        }
        _ => {}
    }
}

/// Set `additionalProperties: false` on every object schema
fn close_objects(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            let is_object_schema = obj.contains_key("properties")
                || obj.get("type").and_then(Value::as_str) == Some("object");
            if is_object_schema {
                obj.insert("additionalProperties".to_owned(), Value::Bool(false));
            }
            for value in obj.values_mut() {
                close_objects(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                close_objects(item);
            }
        }
        _ => {}
    }
}

/// Mark every declared property as required, recursively
fn require_all_properties(node: &mut Value) {
    match node {
        Value::Object(obj) => {
            if let Some(Value::Object(properties)) = obj.get("properties") {
                let names: Vec<Value> = properties
                    .keys()
                    .map(|k| Value::String(k.clone()))
                    .collect();
                obj.insert("required".to_owned(), Value::Array(names));
            }
            for value in obj.values_mut() {
                require_all_properties(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                require_all_properties(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Review {
        sentiment: String,
        score: i32,
        highlights: Vec<Highlight>,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Highlight {
        quote: String,
        positive: bool,
    }

    fn contains_key(node: &Value, key: &str) -> bool {
        match node {
            Value::Object(obj) => {
                obj.contains_key(key) || obj.values().any(|v| contains_key(v, key))
            }
            Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
            _ => false,
        }
    }

    #[test]
    fn root_is_closed_object() {
        let schema = generate::<Review>().unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn all_properties_required() {
        let schema = generate::<Review>().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for name in ["sentiment", "score", "highlights"] {
            assert!(required.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn refs_are_inlined() {
        let schema = generate::<Review>().unwrap();
        assert!(!contains_key(&schema, "$ref"));
        assert!(!contains_key(&schema, "$defs"));
        // Nested type was expanded in place
        let item = &schema["properties"]["highlights"]["items"];
        assert_eq!(item["type"], "object");
        assert_eq!(item["additionalProperties"], false);
        assert!(item["properties"]["quote"].is_object());
    }

    #[test]
    fn metadata_is_stripped() {
        let schema = generate::<Review>().unwrap();
        for key in ["$schema", "title", "format"] {
            assert!(!contains_key(&schema, key), "found {key}");
        }
    }

    #[test]
    fn unions_are_flattened() {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": {
                "value": {
                    "oneOf": [
                        {"type": "string"},
                        {"type": "integer"},
                    ]
                }
            }
        });
        normalize(&mut schema).unwrap();
        assert!(!contains_key(&schema, "oneOf"));
        assert_eq!(schema["properties"]["value"]["type"], "string");
    }

    #[test]
    fn arrays_carry_explicit_type() {
        let mut schema = serde_json::json!({
            "properties": {
                "tags": {"items": {"type": "string"}}
            }
        });
        normalize(&mut schema).unwrap();
        assert_eq!(schema["properties"]["tags"]["type"], "array");
    }
}
