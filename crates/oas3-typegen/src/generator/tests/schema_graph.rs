use serde_json::json;

use crate::{
  generator::{compiler::RustType, config::GeneratorConfig, schema_graph::TypeGraph},
  tests::common::compile_all,
};

#[test]
fn test_direct_self_reference_is_a_boxed_cycle() -> anyhow::Result<()> {
  let definitions = compile_all(
    &GeneratorConfig::default(),
    json!({
      "Node": {
        "type": "object",
        "properties": {
          "next": { "$ref": "#/components/schemas/Node" },
          "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } }
        }
      },
      "Leaf": { "type": "object", "properties": { "value": { "type": "string" } } }
    }),
  )?;
  let graph = TypeGraph::build(&definitions);

  assert_eq!(graph.cycles(), vec![vec!["Node".to_string()]]);
  assert!(graph.recursive_types().contains("Node"));
  assert!(!graph.recursive_types().contains("Leaf"));

  let recursion = graph.recursion();
  let node = RustType::Named("Node".to_string());
  assert!(recursion.needs_box("Node", &node), "by-value self reference needs a box");
  assert!(
    !recursion.needs_box("Node", &RustType::Vec(Box::new(node.clone()))),
    "a Vec already breaks the cycle"
  );
  assert!(!recursion.needs_box("Leaf", &node), "Leaf is not part of the cycle");
  Ok(())
}

#[test]
fn test_mutual_recursion_groups_both_types() -> anyhow::Result<()> {
  let definitions = compile_all(
    &GeneratorConfig::default(),
    json!({
      "Person": {
        "type": "object",
        "properties": { "employer": { "$ref": "#/components/schemas/Company" } }
      },
      "Company": {
        "type": "object",
        "properties": { "owner": { "$ref": "#/components/schemas/Person" } }
      }
    }),
  )?;
  let graph = TypeGraph::build(&definitions);

  assert_eq!(graph.cycles(), vec![vec!["Company".to_string(), "Person".to_string()]]);
  let recursion = graph.recursion();
  assert!(recursion.needs_box("Person", &RustType::Named("Company".to_string())));
  assert!(recursion.needs_box("Company", &RustType::Named("Person".to_string())));
  Ok(())
}

#[test]
fn test_cycle_through_a_container_is_recursive_but_not_boxed() -> anyhow::Result<()> {
  let definitions = compile_all(
    &GeneratorConfig::default(),
    json!({
      "Folder": {
        "type": "object",
        "properties": {
          "children": {
            "type": "object",
            "additionalProperties": { "$ref": "#/components/schemas/Folder" }
          }
        }
      }
    }),
  )?;
  let graph = TypeGraph::build(&definitions);

  assert!(graph.recursive_types().contains("Folder"), "{:?}", graph.cycles());
  assert!(
    !graph
      .recursion()
      .needs_box("Folder", &RustType::Named("Folder".to_string())),
    "map values live on the heap already"
  );
  Ok(())
}

#[test]
fn test_dependencies_include_container_elements() -> anyhow::Result<()> {
  let definitions = compile_all(
    &GeneratorConfig::default(),
    json!({
      "Tag": { "type": "string" },
      "Pet": {
        "type": "object",
        "properties": { "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } } }
      }
    }),
  )?;
  let graph = TypeGraph::build(&definitions);

  let dependencies = graph
    .dependencies("Pet")
    .ok_or_else(|| anyhow::anyhow!("Pet should be in the graph"))?;
  assert!(dependencies.contains("Tag"), "{dependencies:?}");
  assert!(graph.cycles().is_empty());
  Ok(())
}
