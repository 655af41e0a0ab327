use std::{
  collections::HashMap,
  hash::{Hash, Hasher},
};

use json_canon::to_string as to_canonical_json;
use serde_json::{Value, json};

use crate::generator::document::{AdditionalProperties, ComponentKey, NodeId, SchemaArena, SchemaNode};

/// Canonical form of the parts of a schema that identify it structurally: type set,
/// property names, required set, enum literals and additional properties.
///
/// Two schemas that differ only in key or array ordering have equal signatures.
#[derive(Debug, Clone, Eq)]
pub struct StructuralSignature(String);

impl StructuralSignature {
  /// Returns `None` for schemas without properties, which never take part in restoration.
  #[must_use]
  pub fn of(node: &SchemaNode) -> Option<Self> {
    if node.properties.is_empty() {
      return None;
    }

    let mut types: Vec<&str> = node.types.iter().map(|t| t.as_str()).collect();
    types.sort_unstable();

    let mut enum_values: Vec<String> = node.enum_values.iter().map(Value::to_string).collect();
    enum_values.sort_unstable();

    let additional = match &node.additional_properties {
      AdditionalProperties::Absent => Value::Null,
      AdditionalProperties::Allowed(allowed) => Value::Bool(*allowed),
      AdditionalProperties::Schema(schema) => match (&schema.ref_path, schema.node) {
        (Some(reference), _) => json!({ "$ref": reference }),
        (None, Some(id)) => json!({ "inline": id.index() }),
        (None, None) => Value::Null,
      },
    };

    let value = json!({
      "type": types,
      "properties": node.properties.keys().collect::<Vec<_>>(),
      "required": node.required.iter().collect::<Vec<_>>(),
      "enum": enum_values,
      "additionalProperties": additional,
    });

    to_canonical_json(&value).ok().map(Self)
  }
}

impl PartialEq for StructuralSignature {
  fn eq(&self, other: &Self) -> bool {
    self.0 == other.0
  }
}

impl Hash for StructuralSignature {
  fn hash<H: Hasher>(&self, state: &mut H) {
    blake3::hash(self.0.as_bytes()).as_bytes().hash(state);
  }
}

/// Maps inlined schemas back to the component they were copied from.
///
/// Built once per generation run from the arena and owned by the resolver, so concurrent
/// runs over different documents never share it.
#[derive(Debug, Clone, Default)]
pub struct RestorationTable {
  identity: HashMap<NodeId, ComponentKey>,
  structural: HashMap<StructuralSignature, Vec<String>>,
}

impl RestorationTable {
  #[must_use]
  pub fn build(arena: &SchemaArena) -> Self {
    let mut table = Self::default();

    for (key, schema_ref) in arena.components() {
      // An alias component shares its target's node, the target keeps the identity.
      let (Some(id), false) = (schema_ref.node, schema_ref.is_reference()) else {
        continue;
      };
      table.identity.insert(id, key.clone());

      if key.document.is_none()
        && let Some(signature) = StructuralSignature::of(arena.node(id))
      {
        table.structural.entry(signature).or_default().push(key.name.clone());
      }
    }

    for candidates in table.structural.values_mut() {
      candidates.sort();
      candidates.dedup();
    }

    table
  }

  /// The component an inline schema stands for: exact node identity first, then a
  /// structural match with a deterministic tie-break.
  #[must_use]
  pub fn restore(&self, id: Option<NodeId>, node: &SchemaNode) -> Option<ComponentKey> {
    if let Some(key) = id.and_then(|id| self.identity.get(&id)) {
      return Some(key.clone());
    }

    let candidates = self.structural.get(&StructuralSignature::of(node)?)?;
    pick_candidate(node, candidates).map(ComponentKey::local)
  }
}

/// Prefers a candidate named like the schema's only property, then the shortest name, then
/// the lexicographically smallest.
pub(crate) fn pick_candidate<'a>(node: &SchemaNode, candidates: &'a [String]) -> Option<&'a str> {
  if let [(only_property, _)] = node.properties.iter().collect::<Vec<_>>().as_slice() {
    let wanted = fold_name(only_property);
    if let Some(found) = candidates.iter().find(|c| fold_name(c) == wanted) {
      return Some(found);
    }
  }

  candidates
    .iter()
    .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    .map(String::as_str)
}

fn fold_name(name: &str) -> String {
  name.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}
