use std::collections::BTreeSet;

use serde_json::json;

use crate::{
  generator::errors::GenerationError,
  utils::refs::{
    ComponentRef, collect_refs, escape_pointer_segment, parse_component_ref, propagate_remote_ref, split_reference,
  },
};

#[test]
fn test_split_local_and_remote_references() -> anyhow::Result<()> {
  assert_eq!(split_reference("#/components/schemas/Pet")?, ("", "/components/schemas/Pet"));
  assert_eq!(
    split_reference("common.yaml#/components/schemas/Pet")?,
    ("common.yaml", "/components/schemas/Pet")
  );
  assert_eq!(split_reference("common.yaml")?, ("common.yaml", ""));
  Ok(())
}

#[test]
fn test_double_fragment_is_unsupported() {
  let result = split_reference("a.yaml#/x#/y");
  assert!(
    matches!(result, Err(GenerationError::UnsupportedReference(ref r)) if r == "a.yaml#/x#/y"),
    "unexpected result: {result:?}"
  );
}

#[test]
fn test_component_references_are_parsed() {
  assert_eq!(
    parse_component_ref("#/components/parameters/Limit"),
    Some(ComponentRef {
      document: None,
      section: "parameters",
      name: "Limit".to_string(),
    })
  );
  assert_eq!(
    parse_component_ref("shared.json#/components/schemas/a~1b"),
    Some(ComponentRef {
      document: Some("shared.json"),
      section: "schemas",
      name: "a/b".to_string(),
    })
  );
  assert_eq!(parse_component_ref("#/components/schemas/Pet/properties/id"), None);
  assert_eq!(parse_component_ref("#/definitions/Pet"), None);
  assert_eq!(parse_component_ref("#/components/schemas/"), None);
}

#[test]
fn test_local_references_of_remote_documents_are_qualified() -> anyhow::Result<()> {
  assert_eq!(
    propagate_remote_ref("#/components/schemas/Tag", Some("common.yaml"))?,
    "common.yaml#/components/schemas/Tag"
  );
  assert_eq!(
    propagate_remote_ref("other.yaml#/components/schemas/Tag", Some("common.yaml"))?,
    "other.yaml#/components/schemas/Tag"
  );
  assert_eq!(propagate_remote_ref("#/components/schemas/Tag", None)?, "#/components/schemas/Tag");
  Ok(())
}

#[test]
fn test_pointer_segments_escape_both_ways() {
  assert_eq!(escape_pointer_segment("a/b~c"), "a~1b~0c");
  assert_eq!(escape_pointer_segment("plain"), "plain");
}

#[test]
fn test_collect_refs_stops_at_reference_objects() {
  let document = json!({
    "a": { "$ref": "#/components/schemas/A", "ignored": { "$ref": "#/components/schemas/B" } },
    "list": [{ "$ref": "common.yaml#/components/schemas/C" }]
  });
  let mut refs = BTreeSet::new();
  collect_refs(&document, &mut refs);
  assert_eq!(
    refs,
    BTreeSet::from([
      "#/components/schemas/A".to_string(),
      "common.yaml#/components/schemas/C".to_string(),
    ])
  );
}
