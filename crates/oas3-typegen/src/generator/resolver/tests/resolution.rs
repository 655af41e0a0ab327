use std::collections::BTreeMap;

use serde_json::json;

use crate::{
  generator::{
    compiler::RustType,
    document::{ArenaBuilder, ComponentKey, DocumentSet, SchemaRef},
    errors::GenerationError,
    resolver::{Resolution, Resolver},
  },
  tests::common::{document_set, lower, test_document},
};

#[test]
fn test_components_are_named_in_order() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "pet": { "type": "object" },
    "Pet": { "type": "object" },
    "user-profile": { "type": "object" }
  })));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let mut resolver = Resolver::new(&arena, &mapping, true)?;

  assert_eq!(resolver.component_type_name("Pet"), Some("Pet"));
  assert_eq!(resolver.component_type_name("pet"), Some("Pet2"), "second spelling gets a suffix");
  assert_eq!(resolver.component_type_name("user-profile"), Some("UserProfile"));
  assert!(!resolver.claim_exact("Pet2"), "Pet2 is already taken");
  Ok(())
}

#[test]
fn test_pinned_names_are_claimed_first() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Animal": { "type": "object" },
    "Zebra": { "type": "object", "x-rust-type-name": "Animal" }
  })));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let resolver = Resolver::new(&arena, &mapping, true)?;

  assert_eq!(resolver.component_type_name("Zebra"), Some("Animal"));
  assert_eq!(resolver.component_type_name("Animal"), Some("Animal2"));
  Ok(())
}

#[test]
fn test_duplicate_pinned_names_fail() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "A": { "type": "object", "x-rust-type-name": "Same" },
    "B": { "type": "object", "x-rust-type-name": "Same" }
  })));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let Err(error) = Resolver::new(&arena, &mapping, true) else {
    anyhow::bail!("two components cannot pin the same name");
  };
  assert!(
    matches!(error, GenerationError::DuplicateTypeName { ref name, .. } if name == "Same"),
    "unexpected error: {error}"
  );
  Ok(())
}

#[test]
fn test_claim_name_tries_suffixes_and_then_fails() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({})));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let mut resolver = Resolver::new(&arena, &mapping, true)?;

  assert_eq!(resolver.claim_name("Item")?, "Item");
  assert_eq!(resolver.claim_name("Item")?, "Item2");
  for _ in 3..=10 {
    resolver.claim_name("Item")?;
  }
  assert!(
    matches!(resolver.claim_name("Item"), Err(GenerationError::NameExhausted(ref n)) if n == "Item"),
    "suffixes stop at 10"
  );
  assert!(!resolver.claim_exact("Item5"), "Item5 is taken");
  assert!(resolver.claim_exact("Other"));
  Ok(())
}

#[test]
fn test_resolve_classifies_references() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({
    "Pet": {
      "type": "object",
      "properties": {
        "id": { "type": "string" },
        "owner": { "$ref": "#/components/schemas/Missing" },
        "same_id": { "$ref": "#/components/schemas/Pet/properties/id" }
      }
    }
  })));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let resolver = Resolver::new(&arena, &mapping, true)?;
  let pet = arena
    .get(arena.component(&ComponentKey::local("Pet")).unwrap_or(&SchemaRef::default()))
    .ok_or_else(|| anyhow::anyhow!("Pet should resolve"))?;

  assert!(matches!(resolver.resolve(&SchemaRef::default()), Resolution::Absent));
  assert!(matches!(resolver.resolve(&pet.properties["id"]), Resolution::Inline { .. }));
  assert!(
    matches!(resolver.resolve(&pet.properties["owner"]), Resolution::Unresolved { ref ref_path } if ref_path.ends_with("Missing"))
  );
  assert!(
    matches!(resolver.resolve(&pet.properties["same_id"]), Resolution::Inline { .. }),
    "a pointer into a schema body has no name"
  );

  let by_name = SchemaRef::reference("#/components/schemas/Pet", None);
  let Resolution::Named { rust_type, .. } = resolver.resolve(&by_name) else {
    anyhow::bail!("component reference should be named");
  };
  assert_eq!(rust_type, RustType::Named("Pet".to_string()));
  Ok(())
}

#[test]
fn test_external_components_use_the_import_mapping() -> anyhow::Result<()> {
  let root = test_document(json!({
    "Pet": { "type": "object", "properties": { "tag": { "$ref": "common.yaml#/components/schemas/tag" } } }
  }));
  let common = json!({ "components": { "schemas": { "tag": { "type": "string" } } } });
  let documents = DocumentSet::new(root, BTreeMap::from([("common.yaml".to_string(), common)]));
  let mut builder = ArenaBuilder::new(&documents);
  builder.lower_components();
  let arena = builder.finish();

  let mapping = BTreeMap::from([("common.yaml".to_string(), "crate::common".to_string())]);
  let resolver = Resolver::new(&arena, &mapping, true)?;
  let key = ComponentKey {
    document: Some("common.yaml".to_string()),
    name: "tag".to_string(),
  };
  assert_eq!(
    resolver.type_for_component(&key),
    Some(RustType::Named("crate::common::Tag".to_string()))
  );

  let unmapped = BTreeMap::new();
  let resolver = Resolver::new(&arena, &unmapped, true)?;
  assert_eq!(resolver.type_for_component(&key), None, "without a mapping it is compiled inline");
  Ok(())
}

#[test]
fn test_enter_and_leave_guard_cycles() -> anyhow::Result<()> {
  let documents = document_set(test_document(json!({ "Pet": { "type": "object" } })));
  let arena = lower(&documents);
  let mapping = BTreeMap::new();
  let mut resolver = Resolver::new(&arena, &mapping, true)?;
  let id = arena
    .component(&ComponentKey::local("Pet"))
    .and_then(|r| r.node)
    .ok_or_else(|| anyhow::anyhow!("Pet should have a node"))?;

  assert!(resolver.enter(id));
  assert!(resolver.is_in_progress(id));
  assert!(!resolver.enter(id), "re-entering is a cycle");
  resolver.leave(id);
  assert!(!resolver.is_in_progress(id));
  Ok(())
}
