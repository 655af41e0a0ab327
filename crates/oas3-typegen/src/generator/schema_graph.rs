use std::collections::{BTreeMap, BTreeSet};

use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::generator::compiler::{AdditionalPropertiesShape, RustType, TypeDefinition, TypeShape};

/// Reference graph over the definitions about to be emitted.
#[derive(Debug, Default)]
pub(crate) struct TypeGraph {
  /// Every generated type a definition mentions, containers included.
  references: BTreeMap<String, BTreeSet<String>>,
  /// Generated types a definition stores by value, with no `Vec` or map in between.
  inline: BTreeMap<String, BTreeSet<String>>,
}

impl TypeGraph {
  pub(crate) fn build(definitions: &[TypeDefinition]) -> Self {
    let mut graph = Self::default();
    for definition in definitions {
      let references = graph.references.entry(definition.name.clone()).or_default();
      let inline = graph.inline.entry(definition.name.clone()).or_default();
      let mut mention = |rust_type: &RustType, by_value: bool| {
        references.extend(rust_type.named_types().into_iter().map(str::to_string));
        if by_value && let Some(name) = rust_type.named() {
          inline.insert(name.to_string());
        }
      };

      let descriptor = &definition.descriptor;
      match &descriptor.shape {
        TypeShape::Struct(shape) => {
          for property in &shape.properties {
            mention(&property.descriptor.rust_type, true);
          }
          for embedded in &shape.embedded {
            mention(embedded, true);
          }
          if let Some(union) = &shape.union {
            mention(union, true);
          }
          if let AdditionalPropertiesShape::Typed(value) = &shape.additional_properties {
            mention(&value.rust_type, false);
          }
        }
        TypeShape::Union(shape) => {
          for variant in &shape.variants {
            mention(&variant.rust_type, true);
          }
        }
        TypeShape::Enum(_) => {}
        TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Map(_) => mention(&descriptor.rust_type, true),
      }
    }
    graph
  }

  #[cfg(test)]
  pub(crate) fn dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
    self.references.get(name)
  }

  /// Groups of definitions that refer to each other, each sorted, through any reference.
  pub(crate) fn cycles(&self) -> Vec<Vec<String>> {
    detect_cycles(&self.references)
  }

  /// Definitions that reach themselves through any reference. These cannot be `type` aliases.
  pub(crate) fn recursive_types(&self) -> BTreeSet<String> {
    self.cycles().into_iter().flatten().collect()
  }

  /// The by-value cycles, whose edges have to be broken with a `Box`.
  pub(crate) fn recursion(&self) -> Recursion {
    let mut components = BTreeMap::new();
    for (index, cycle) in detect_cycles(&self.inline).into_iter().enumerate() {
      for name in cycle {
        components.insert(name, index);
      }
    }
    Recursion { components }
  }
}

/// Membership of definitions in by-value cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Recursion {
  components: BTreeMap<String, usize>,
}

impl Recursion {
  /// Whether a field of `owner` holding `field_type` by value closes a cycle and needs a `Box`.
  pub(crate) fn needs_box(&self, owner: &str, field_type: &RustType) -> bool {
    let Some(target) = field_type.named() else {
      return false;
    };
    matches!(
      (self.components.get(owner), self.components.get(target)),
      (Some(a), Some(b)) if a == b
    )
  }
}

fn detect_cycles(dependencies: &BTreeMap<String, BTreeSet<String>>) -> Vec<Vec<String>> {
  let mut graph = DiGraphMap::<&str, ()>::new();
  for (node, deps) in dependencies {
    graph.add_node(node.as_str());
    for dep in deps {
      graph.add_edge(node.as_str(), dep.as_str(), ());
    }
  }

  let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .map(|scc| {
      let mut cycle: Vec<String> = scc.into_iter().map(String::from).collect();
      cycle.sort();
      cycle
    })
    .collect();
  cycles.sort();
  cycles
}
