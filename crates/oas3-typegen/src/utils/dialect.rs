//! Rewrites OpenAPI 3.0 schema syntax into its 3.1 equivalent before the document is typed.

use serde_json::{Map, Value};

/// Keywords whose value is a single schema.
const SCHEMA_KEYWORDS: &[&str] = &["items", "additionalProperties", "not", "contains", "propertyNames", "if", "then", "else"];
/// Keywords whose value is a list of schemas.
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf", "prefixItems"];
/// Keywords whose value is a map of name to schema.
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "$defs", "definitions", "dependentSchemas"];

/// Normalizes every schema reachable in the document, in place.
///
/// Applied regardless of the declared `openapi` version: a 3.1 document never carries the
/// 3.0 forms, so rewriting them is a no-op there.
pub fn normalize(document: &mut Value) {
  walk_document(document);
}

fn walk_document(value: &mut Value) {
  match value {
    Value::Object(map) => {
      for (key, child) in map.iter_mut() {
        if key == "schema" {
          normalize_schema(child);
        } else if key == "schemas" {
          if let Value::Object(schemas) = child {
            schemas.values_mut().for_each(normalize_schema);
          }
        } else {
          walk_document(child);
        }
      }
    }
    Value::Array(items) => items.iter_mut().for_each(walk_document),
    _ => {}
  }
}

/// Normalizes one schema object and its subschemas.
pub fn normalize_schema(schema: &mut Value) {
  let Value::Object(map) = schema else {
    return;
  };

  lower_nullable(map);
  lower_exclusive_bound(map, "exclusiveMinimum", "minimum");
  lower_exclusive_bound(map, "exclusiveMaximum", "maximum");

  for keyword in SCHEMA_KEYWORDS {
    if let Some(child) = map.get_mut(*keyword) {
      normalize_schema(child);
    }
  }
  for keyword in SCHEMA_LIST_KEYWORDS {
    if let Some(Value::Array(children)) = map.get_mut(*keyword) {
      children.iter_mut().for_each(normalize_schema);
    }
  }
  for keyword in SCHEMA_MAP_KEYWORDS {
    if let Some(Value::Object(children)) = map.get_mut(*keyword) {
      children.values_mut().for_each(normalize_schema);
    }
  }
}

/// `nullable: true` becomes a `null` member of the type set. The flag survives as `x-nullable`
/// so schemas without a `type` still carry it.
fn lower_nullable(map: &mut Map<String, Value>) {
  let Some(nullable) = map.remove("nullable") else {
    return;
  };
  if nullable != Value::Bool(true) {
    return;
  }

  match map.get_mut("type") {
    Some(Value::String(name)) if name != "null" => {
      let single = std::mem::take(name);
      map.insert(
        "type".to_string(),
        Value::Array(vec![Value::String(single), Value::String("null".to_string())]),
      );
    }
    Some(Value::Array(types)) if !types.iter().any(|t| t == "null") => {
      types.push(Value::String("null".to_string()));
    }
    _ => {}
  }
  map.insert("x-nullable".to_string(), Value::Bool(true));
}

/// 3.0 `exclusiveMinimum: true` + `minimum: 5` becomes 3.1 `exclusiveMinimum: 5`.
fn lower_exclusive_bound(map: &mut Map<String, Value>, exclusive: &str, inclusive: &str) {
  match map.get(exclusive) {
    Some(Value::Bool(true)) => {
      if let Some(bound) = map.remove(inclusive) {
        map.insert(exclusive.to_string(), bound);
      } else {
        map.remove(exclusive);
      }
    }
    Some(Value::Bool(false)) => {
      map.remove(exclusive);
    }
    _ => {}
  }
}
