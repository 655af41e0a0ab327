//! Removal of components that nothing refers to.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::utils::refs::{escape_pointer_segment, parse_component_ref};

/// Component sections subject to pruning. `securitySchemes` are named by security requirements
/// rather than referenced with `$ref`, so they always stay.
pub const PRUNED_SECTIONS: [&str; 9] = [
  "schemas",
  "parameters",
  "requestBodies",
  "responses",
  "headers",
  "examples",
  "links",
  "callbacks",
  "pathItems",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
  /// Passes run, including the final pass that removed nothing.
  pub rounds: usize,
  /// Canonical references of the removed components, in removal order.
  pub removed: Vec<String>,
}

impl PruneReport {
  #[must_use]
  pub fn removed_count(&self) -> usize {
    self.removed.len()
  }
}

/// Deletes unreferenced components until a pass deletes nothing.
///
/// References are collected from the whole document, so a component only referenced by a
/// component removed in one pass disappears in the next.
pub fn prune_components(document: &mut Value) -> PruneReport {
  let mut report = PruneReport::default();
  loop {
    report.rounds += 1;
    let referenced = referenced_components(document);
    let removed = remove_unreferenced(document, &referenced);
    tracing::debug!(round = report.rounds, removed = removed.len(), "prune pass");
    if removed.is_empty() {
      break;
    }
    report.removed.extend(removed);
  }
  report
}

/// Canonical references (`#/components/<section>/<name>`) of every local component mentioned
/// by a `$ref` or a discriminator mapping anywhere in the document.
#[must_use]
pub fn referenced_components(document: &Value) -> BTreeSet<String> {
  let mut referenced = BTreeSet::new();
  collect(document, &mut referenced);
  referenced
}

fn collect(value: &Value, referenced: &mut BTreeSet<String>) {
  match value {
    Value::Object(map) => {
      if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        record(reference, referenced);
      }
      if let Some(mapping) = map
        .get("discriminator")
        .and_then(|d| d.get("mapping"))
        .and_then(Value::as_object)
      {
        for target in mapping.values().filter_map(Value::as_str) {
          if target.contains('#') {
            record(target, referenced);
          } else {
            referenced.insert(canonical_ref("schemas", target));
          }
        }
      }
      for child in map.values() {
        collect(child, referenced);
      }
    }
    Value::Array(items) => {
      for item in items {
        collect(item, referenced);
      }
    }
    _ => {}
  }
}

fn record(reference: &str, referenced: &mut BTreeSet<String>) {
  if let Some(component) = parse_component_ref(reference)
    && component.document.is_none()
  {
    referenced.insert(canonical_ref(component.section, &component.name));
  }
}

#[must_use]
pub fn canonical_ref(section: &str, name: &str) -> String {
  format!("#/components/{section}/{}", escape_pointer_segment(name))
}

fn remove_unreferenced(document: &mut Value, referenced: &BTreeSet<String>) -> Vec<String> {
  let Some(components) = document.get_mut("components").and_then(Value::as_object_mut) else {
    return vec![];
  };

  let mut removed = vec![];
  for section in PRUNED_SECTIONS {
    let Some(entries) = components.get_mut(section).and_then(Value::as_object_mut) else {
      continue;
    };
    entries.retain(|name, _| {
      let reference = canonical_ref(section, name);
      if referenced.contains(&reference) {
        true
      } else {
        removed.push(reference);
        false
      }
    });
  }
  removed
}
