//! Response schemas for structured generation.
//!
//! `schemars` emits JSON Schema draft-07 with `$ref`s into a `definitions`
//! table. The generative service accepts only an OpenAPI subset: no refs, no
//! `$schema`/`title`/`default`, and nullability expressed as `nullable: true`
//! instead of a `["string", "null"]` type union. [`response_schema`] rewrites
//! the schemars output into that subset.

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

const ALLOWED_KEYS: [&str; 7] = [
    "type",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
];

/// Generates the service-compatible response schema for `T`.
pub fn response_schema<T: JsonSchema>() -> Value {
    let root = schema_for!(T);
    let mut value = serde_json::to_value(root).unwrap_or_default();

    let definitions = match &mut value {
        Value::Object(map) => map.remove("definitions").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    inline_refs(&mut value, &definitions);
    simplify(&mut value);
    value
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut resolved) = target {
                inline_refs(&mut resolved, definitions);
                *value = resolved;
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

fn simplify(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    map.retain(|key, _| ALLOWED_KEYS.contains(&key.as_str()));

    // ["string", "null"] -> "string" + nullable
    if let Some(Value::Array(types)) = map.get("type").cloned() {
        let concrete: Vec<Value> = types
            .iter()
            .filter(|t| t.as_str() != Some("null"))
            .cloned()
            .collect();
        let nullable = concrete.len() < types.len();
        if let Some(first) = concrete.into_iter().next() {
            map.insert("type".to_string(), first);
        }
        if nullable {
            map.insert("nullable".to_string(), Value::Bool(true));
        }
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for (_, property) in properties.iter_mut() {
            simplify(property);
        }
    }

    if let Some(items) = map.get_mut("items") {
        simplify(items);
    }

    // schemars omits `required` when empty; keep the key explicit for objects
    if map.get("type").and_then(Value::as_str) == Some("object") && !map.contains_key("required") {
        map.insert("required".to_string(), Value::Array(Vec::new()));
    }
}

/// Property names listed as required by an object schema.
pub fn required_fields(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
