use serde_json::json;

use crate::{
  generator::{
    compiler::{RustType, StructShape, TypeDescriptor, TypeShape},
    config::GeneratorConfig,
    errors::GenerationError,
    metrics::GenerationWarning,
  },
  tests::common::{compile, compile_component, compile_error, compile_with, with_compiler},
};

fn struct_shape(descriptor: &TypeDescriptor) -> &StructShape {
  match &descriptor.shape {
    TypeShape::Struct(shape) => shape,
    other => panic!("expected a struct, got {other:?}"),
  }
}

fn property_names(shape: &StructShape) -> Vec<&str> {
  shape.properties.iter().map(|p| p.json_name.as_str()).collect()
}

#[test]
fn test_single_member_equals_direct_compilation() -> anyhow::Result<()> {
  let schemas = json!({
    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Wrapped": { "allOf": [{ "$ref": "#/components/schemas/Pet" }] },
    "Direct": { "$ref": "#/components/schemas/Pet" },
    "WrappedInline": { "allOf": [{ "type": "string", "format": "uuid" }] },
    "DirectInline": { "type": "string", "format": "uuid" }
  });

  let wrapped = compile(schemas.clone(), "Wrapped")?;
  let direct = compile(schemas.clone(), "Direct")?;
  assert_eq!(wrapped.rust_type, direct.rust_type, "single ref member should compile like the ref");
  assert_eq!(wrapped.rust_type, RustType::Named("Pet".to_string()));

  let wrapped_inline = compile(schemas.clone(), "WrappedInline")?;
  let direct_inline = compile(schemas, "DirectInline")?;
  assert_eq!(wrapped_inline, direct_inline, "single inline member should compile like the member");
  Ok(())
}

#[test]
fn test_all_of_two_refs_embeds_both() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
      "Named": { "type": "object", "properties": { "name": { "type": "string" } } },
      "Entity": {
        "allOf": [
          { "$ref": "#/components/schemas/Base" },
          { "$ref": "#/components/schemas/Named" }
        ]
      }
    }),
    "Entity",
  )?;
  let shape = struct_shape(&descriptor);
  assert_eq!(
    shape.embedded,
    vec![RustType::Named("Base".to_string()), RustType::Named("Named".to_string())],
    "both references should be embedded"
  );
  assert!(shape.properties.is_empty(), "no flattened property merge");
  Ok(())
}

#[test]
fn test_ref_plus_inline_appends_properties() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
      "Dog": {
        "allOf": [
          { "$ref": "#/components/schemas/Base" },
          { "type": "object", "properties": { "bark": { "type": "boolean" } }, "required": ["bark"] }
        ]
      }
    }),
    "Dog",
  )?;
  let shape = struct_shape(&descriptor);
  assert_eq!(shape.embedded, vec![RustType::Named("Base".to_string())]);
  assert_eq!(property_names(shape), vec!["bark"]);
  assert!(shape.properties[0].required, "required from the inline member applies");
  Ok(())
}

#[test]
fn test_inline_members_merge_properties_and_required() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Merged": {
        "allOf": [
          { "type": "object", "properties": { "a": { "type": "string" } }, "required": ["a"] },
          { "type": "object", "properties": { "b": { "type": "integer" } }, "required": ["b"] }
        ]
      }
    }),
    "Merged",
  )?;
  let shape = struct_shape(&descriptor);
  assert_eq!(property_names(shape), vec!["a", "b"]);
  assert!(shape.properties.iter().all(|p| p.required), "required sets are united");
  Ok(())
}

#[test]
fn test_equal_properties_merge_in_any_order() -> anyhow::Result<()> {
  let first = json!({ "type": "object", "properties": { "id": { "type": "string" } }, "required": ["id"] });
  let second = json!({
    "type": "object",
    "properties": { "id": { "type": "string" }, "extra": { "type": "boolean" } },
    "required": ["id"]
  });

  for members in [json!([first.clone(), second.clone()]), json!([second, first])] {
    let descriptor = compile(json!({ "Both": { "allOf": members } }), "Both")?;
    assert_eq!(property_names(struct_shape(&descriptor)), vec!["extra", "id"]);
  }

  // Declarations that spell the same Rust type agree even when their format text differs.
  let plain = json!({
    "type": "object",
    "properties": { "ratio": { "type": "number" }, "host": { "type": "string" } }
  });
  let formatted = json!({
    "type": "object",
    "properties": {
      "ratio": { "type": "number", "format": "float" },
      "host": { "type": "string", "format": "hostname" }
    }
  });
  for members in [json!([plain.clone(), formatted.clone()]), json!([formatted, plain])] {
    let descriptor = compile(json!({ "Spelled": { "allOf": members } }), "Spelled")?;
    let spellings: Vec<String> = struct_shape(&descriptor)
      .properties
      .iter()
      .map(|p| p.descriptor.rust_type.to_string())
      .collect();
    assert_eq!(spellings, vec!["String", "f32"]);
  }
  Ok(())
}

#[test]
fn test_different_formats_of_one_type_still_conflict() {
  let err = compile_error(
    json!({
      "Precision": {
        "allOf": [
          { "type": "object", "properties": { "ratio": { "type": "number", "format": "float" } } },
          { "type": "object", "properties": { "ratio": { "type": "number", "format": "double" } } }
        ]
      }
    }),
    "Precision",
  );
  assert!(
    matches!(err.root_cause(), GenerationError::IncompatibleProperty(name) if name == "ratio"),
    "f32 and f64 must not be merged silently: {err}"
  );
}

#[test]
fn test_conflicting_properties_fail_with_path() {
  let err = compile_error(
    json!({
      "Conflict": {
        "allOf": [
          { "type": "object", "properties": { "id": { "type": "string" } } },
          { "type": "object", "properties": { "id": { "type": "integer" } } }
        ]
      }
    }),
    "Conflict",
  );
  assert!(
    matches!(err.root_cause(), GenerationError::IncompatibleProperty(name) if name == "id"),
    "unexpected error: {err}"
  );
  assert_eq!(err.path(), Some("Conflict"));
}

#[test]
fn test_enum_declaration_wins_over_plain() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Ticket": {
        "allOf": [
          { "type": "object", "properties": { "status": { "type": "string" } } },
          { "type": "object", "properties": { "status": { "type": "string", "enum": ["open", "done"] } } }
        ]
      }
    }),
    "Ticket",
  )?;
  let status = &struct_shape(&descriptor).properties[0];
  assert_eq!(status.descriptor.rust_type.to_string(), "TicketStatus", "the enum-bearing declaration wins");
  Ok(())
}

#[test]
fn test_array_declaration_wins_over_object() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Listing": {
        "allOf": [
          { "type": "object", "properties": { "items": { "type": "object" } } },
          { "type": "object", "properties": { "items": { "type": "array", "items": { "type": "string" } } } }
        ]
      }
    }),
    "Listing",
  )?;
  let items = &struct_shape(&descriptor).properties[0];
  assert_eq!(items.descriptor.rust_type.to_string(), "Vec<String>", "the array declaration wins");
  Ok(())
}

#[test]
fn test_array_declaration_does_not_beat_a_scalar() {
  for (first, second) in [
    (json!({ "type": "string" }), json!({ "type": "array", "items": { "type": "integer" } })),
    (json!({ "type": "array", "items": { "type": "integer" } }), json!({ "type": "string" })),
  ] {
    let err = compile_error(
      json!({
        "Mixed": {
          "allOf": [
            { "type": "object", "properties": { "x": first } },
            { "type": "object", "properties": { "x": second } }
          ]
        }
      }),
      "Mixed",
    );
    assert!(
      matches!(err.root_cause(), GenerationError::IncompatibleProperty(name) if name == "x"),
      "only a generic object gives way to an array: {err}"
    );
  }
}

#[test]
fn test_arrays_of_different_items_conflict() {
  let err = compile_error(
    json!({
      "Lists": {
        "allOf": [
          { "type": "object", "properties": { "ids": { "type": "array", "items": { "type": "string" } } } },
          { "type": "object", "properties": { "ids": { "type": "array", "items": { "type": "integer" } } } }
        ]
      }
    }),
    "Lists",
  );
  assert!(
    matches!(err.root_cause(), GenerationError::IncompatibleProperty(name) if name == "ids"),
    "unexpected error: {err}"
  );
}

#[test]
fn test_enclosing_properties_join_the_merge() -> anyhow::Result<()> {
  let descriptor = compile(
    json!({
      "Mixed": {
        "type": "object",
        "description": "outer",
        "properties": { "outer": { "type": "string" } },
        "allOf": [
          { "type": "object", "properties": { "inner": { "type": "string" } }, "description": "inner" }
        ]
      }
    }),
    "Mixed",
  )?;
  assert_eq!(property_names(struct_shape(&descriptor)), vec!["inner", "outer"]);
  assert_eq!(descriptor.description.as_deref(), Some("outer"), "description comes from the enclosing schema");
  Ok(())
}

#[test]
fn test_self_referencing_all_of_is_skipped_with_warning() -> anyhow::Result<()> {
  let config = GeneratorConfig::default();
  with_compiler(
    json!({
      "Loop": {
        "allOf": [
          { "$ref": "#/components/schemas/Loop" },
          { "type": "object", "properties": { "value": { "type": "string" } } }
        ]
      }
    }),
    &config,
    |compiler| {
      let descriptor = compile_component(compiler, "Loop")?;
      assert_eq!(property_names(struct_shape(&descriptor)), vec!["value"]);
      assert!(
        compiler
          .take_warnings()
          .contains(&GenerationWarning::CompositionCycle { path: "Loop".to_string() }),
        "cycle should be reported"
      );
      Ok(())
    },
  )
}

#[test]
fn test_legacy_merge_rejects_any_redefinition() -> anyhow::Result<()> {
  let config = GeneratorConfig::builder().old_merge_schemas(true).build();
  let schemas = json!({
    "Base": { "type": "object", "properties": { "id": { "type": "string" } }, "required": ["id"] },
    "Same": {
      "allOf": [
        { "$ref": "#/components/schemas/Base" },
        { "type": "object", "properties": { "id": { "type": "string" } }, "required": ["id"] }
      ]
    },
    "Clash": {
      "allOf": [
        { "$ref": "#/components/schemas/Base" },
        { "type": "object", "properties": { "id": { "type": "string" } } }
      ]
    }
  });

  let same = compile_with(&config, schemas.clone(), "Same")?;
  let shape = struct_shape(&same);
  assert!(shape.embedded.is_empty(), "the strict merge never embeds");
  assert_eq!(property_names(shape), vec!["id"], "equal properties are absorbed");

  let err = compile_with(&config, schemas, "Clash").expect_err("required flags differ");
  let err = err.downcast::<GenerationError>()?;
  assert!(
    matches!(err.root_cause(), GenerationError::IncompatibleProperty(name) if name == "id"),
    "unexpected error: {err}"
  );
  Ok(())
}

#[test]
fn test_empty_all_of_is_not_a_composition() -> anyhow::Result<()> {
  let descriptor = compile(json!({ "Empty": { "type": "object", "allOf": [] } }), "Empty")?;
  assert_eq!(
    descriptor.rust_type.to_string(),
    "std::collections::HashMap<String, serde_json::Value>",
    "an empty allOf list is ignored"
  );
  Ok(())
}
