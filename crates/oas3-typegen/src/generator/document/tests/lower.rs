use std::collections::BTreeMap;

use serde_json::json;

use crate::{
  generator::document::{
    AdditionalProperties, ArenaBuilder, ComponentKey, DocumentSet, JsonType, SchemaArena, SchemaNode,
  },
  tests::common::{document_set, lower, test_document},
};

fn component<'a>(arena: &'a SchemaArena, name: &str) -> anyhow::Result<&'a SchemaNode> {
  let schema_ref = arena
    .component(&ComponentKey::local(name))
    .ok_or_else(|| anyhow::anyhow!("component {name} should be registered"))?;
  arena
    .get(schema_ref)
    .ok_or_else(|| anyhow::anyhow!("component {name} should resolve"))
}

#[test]
fn test_schema_keywords_are_lowered() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Pet": {
      "type": "object",
      "description": "A pet.",
      "required": ["id"],
      "properties": {
        "id": { "type": "integer", "format": "int64", "readOnly": true },
        "tags": { "type": "array", "items": { "type": "string" } }
      },
      "additionalProperties": false,
      "x-rust-attrs": ["#[non_exhaustive]"]
    }
  })));
  let arena = lower(&documents);
  let pet = component(&arena, "Pet")?;

  assert_eq!(pet.types, vec![JsonType::Object]);
  assert_eq!(pet.description.as_deref(), Some("A pet."));
  assert!(pet.required.contains("id"));
  assert_eq!(pet.additional_properties, AdditionalProperties::Allowed(false));
  assert!(pet.extension("x-rust-attrs").is_some(), "extensions should be kept");
  assert_eq!(pet.origin.component_name(), Some("Pet"));

  let id = arena
    .get(&pet.properties["id"])
    .ok_or_else(|| anyhow::anyhow!("id should be inline"))?;
  assert_eq!(id.format.as_deref(), Some("int64"));
  assert!(id.read_only);
  assert_eq!(id.origin.pointer.as_deref(), Some("/components/schemas/Pet/properties/id"));

  let tags = arena
    .get(&pet.properties["tags"])
    .ok_or_else(|| anyhow::anyhow!("tags should be inline"))?;
  assert!(tags.items.is_some(), "array items should be lowered");
  Ok(())
}

#[test]
fn test_references_share_the_component_node() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Pet": { "type": "object" },
    "Owner": {
      "type": "object",
      "properties": {
        "first": { "$ref": "#/components/schemas/Pet" },
        "second": { "$ref": "#/components/schemas/Pet" }
      }
    }
  })));
  let arena = lower(&documents);
  let owner = component(&arena, "Owner")?;
  let pet = arena
    .component(&ComponentKey::local("Pet"))
    .ok_or_else(|| anyhow::anyhow!("Pet should be registered"))?;

  let first = &owner.properties["first"];
  assert!(first.is_reference());
  assert_eq!(first.ref_path.as_deref(), Some("#/components/schemas/Pet"));
  assert_eq!(first.node, pet.node, "a reference resolves to the component node");
  assert_eq!(owner.properties["second"].node, pet.node);
  Ok(())
}

#[test]
fn test_self_reference_terminates() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Node": {
      "type": "object",
      "properties": { "next": { "$ref": "#/components/schemas/Node" } }
    }
  })));
  let arena = lower(&documents);
  let node_ref = arena
    .component(&ComponentKey::local("Node"))
    .ok_or_else(|| anyhow::anyhow!("Node should be registered"))?;
  let node = component(&arena, "Node")?;

  assert_eq!(node.properties["next"].node, node_ref.node, "the cycle closes on the same node");
  assert_eq!(arena.len(), 1, "no node is lowered twice");
  Ok(())
}

#[test]
fn test_unresolvable_reference_keeps_its_path() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Pet": {
      "type": "object",
      "properties": { "owner": { "$ref": "#/components/schemas/Missing" } }
    }
  })));
  let arena = lower(&documents);
  let owner = &component(&arena, "Pet")?.properties["owner"];
  assert!(owner.is_unresolved(), "{owner:?}");
  Ok(())
}

#[test]
fn test_alias_component_points_at_its_target() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Pet": { "type": "object" },
    "Animal": { "$ref": "#/components/schemas/Pet" }
  })));
  let arena = lower(&documents);
  let animal = arena
    .component(&ComponentKey::local("Animal"))
    .ok_or_else(|| anyhow::anyhow!("Animal should be registered"))?;
  let pet = arena
    .component(&ComponentKey::local("Pet"))
    .ok_or_else(|| anyhow::anyhow!("Pet should be registered"))?;

  assert_eq!(animal.ref_path.as_deref(), Some("#/components/schemas/Pet"));
  assert_eq!(animal.node, pet.node);
  Ok(())
}

#[test]
fn test_reference_only_cycles_stay_unresolved() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "A": { "$ref": "#/components/schemas/B" },
    "B": { "$ref": "#/components/schemas/A" },
    "Own": { "$ref": "#/components/schemas/Own" },
    "Holder": {
      "type": "object",
      "properties": { "a": { "$ref": "#/components/schemas/A" } }
    }
  })));
  let arena = lower(&documents);

  for name in ["A", "B", "Own"] {
    let schema_ref = arena
      .component(&ComponentKey::local(name))
      .ok_or_else(|| anyhow::anyhow!("{name} should be registered"))?;
    assert!(schema_ref.is_unresolved(), "{name} never reaches a schema: {schema_ref:?}");
  }
  assert!(component(&arena, "Holder")?.properties["a"].is_unresolved());
  Ok(())
}

#[test]
fn test_nullable_and_const_forms() -> anyhow::Result<()> {
  let documents = document_set(json!({
    "openapi": "3.0.3",
    "info": { "title": "t", "version": "1" },
    "components": {
      "schemas": {
        "Maybe": { "type": "string", "nullable": true },
        "Fixed": { "const": "v1" },
        "Open": { "type": "object", "additionalProperties": { "type": "integer" } }
      }
    }
  }));
  let arena = lower(&documents);

  let maybe = component(&arena, "Maybe")?;
  assert!(maybe.nullable);
  assert_eq!(maybe.concrete_types().collect::<Vec<_>>(), vec![&JsonType::String]);
  assert_eq!(component(&arena, "Fixed")?.enum_values, vec![json!("v1")]);
  assert!(matches!(
    component(&arena, "Open")?.additional_properties,
    AdditionalProperties::Schema(_)
  ));
  Ok(())
}

#[test]
fn test_external_components_are_keyed_by_document() -> anyhow::Result<()> {
  let root = test_document(json!({
    "Pet": {
      "type": "object",
      "properties": { "tag": { "$ref": "common.yaml#/components/schemas/Tag" } }
    }
  }));
  let common = json!({ "components": { "schemas": { "Tag": { "type": "string" } } } });
  let documents = DocumentSet::new(root, BTreeMap::from([("common.yaml".to_string(), common)]));

  let mut builder = ArenaBuilder::new(&documents);
  builder.lower_components();
  let arena = builder.finish();

  let key = ComponentKey {
    document: Some("common.yaml".to_string()),
    name: "Tag".to_string(),
  };
  let tag = arena
    .component(&key)
    .ok_or_else(|| anyhow::anyhow!("external component should be registered"))?;
  let pet = component(&arena, "Pet")?;
  assert_eq!(pet.properties["tag"].node, tag.node, "remote reference shares the external node");

  let local: Vec<&str> = arena.local_components().map(|(name, _)| name).collect();
  assert_eq!(local, vec!["Pet"], "external components are not local");
  Ok(())
}

#[test]
fn test_values_outside_components_are_lowered_on_demand() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({ "Pet": { "type": "object" } })));
  let mut builder = ArenaBuilder::new(&documents);
  builder.lower_components();

  let by_ref = builder.lower_value(&json!({ "$ref": "#/components/schemas/Pet" }));
  let inline = builder.lower_value(&json!({ "type": "boolean" }));
  let arena = builder.finish();

  assert!(by_ref.is_reference());
  assert_eq!(by_ref.node, arena.component(&ComponentKey::local("Pet")).and_then(|r| r.node));
  let node = arena
    .get(&inline)
    .ok_or_else(|| anyhow::anyhow!("inline schema should have a node"))?;
  assert_eq!(node.types, vec![JsonType::Boolean]);
  assert_eq!(node.origin.pointer, None);
  Ok(())
}
