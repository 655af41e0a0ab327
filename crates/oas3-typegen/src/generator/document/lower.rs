use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::{
  DocumentSet,
  arena::{AdditionalProperties, ComponentKey, Discriminator, JsonType, NodeId, NodeOrigin, SchemaArena, SchemaNode, SchemaRef},
};
use crate::utils::refs::{escape_pointer_segment, split_reference};

const MAX_REF_CHAIN: usize = 16;

/// Lowers raw schema JSON into a [`SchemaArena`].
///
/// Nodes reached through a JSON pointer are memoized on (document, pointer), so every
/// reference to a component yields the same [`NodeId`] and cycles terminate.
pub struct ArenaBuilder<'d> {
  documents: &'d DocumentSet,
  arena: SchemaArena,
  memo: HashMap<(Option<String>, String), NodeId>,
}

impl<'d> ArenaBuilder<'d> {
  #[must_use]
  pub fn new(documents: &'d DocumentSet) -> Self {
    Self {
      documents,
      arena: SchemaArena::default(),
      memo: HashMap::new(),
    }
  }

  /// Lowers every `components.schemas` entry of every loaded document.
  pub fn lower_components(&mut self) {
    let documents = self.documents;
    let all = std::iter::once((None, &documents.root))
      .chain(documents.externals.iter().map(|(name, doc)| (Some(name.as_str()), doc)));

    for (document, root) in all {
      let Some(schemas) = root.pointer("/components/schemas").and_then(Value::as_object) else {
        continue;
      };
      for (name, schema) in schemas {
        let pointer = format!("/components/schemas/{}", escape_pointer_segment(name));
        let node = self.lower_pointer(document, &pointer);
        let schema_ref = match schema.get("$ref").and_then(Value::as_str) {
          Some(reference) => SchemaRef::reference(reference, node),
          None => SchemaRef { ref_path: None, node },
        };
        let key = ComponentKey {
          document: document.map(str::to_string),
          name: name.clone(),
        };
        self.arena.register_component(key, schema_ref);
      }
    }
  }

  /// Lowers a schema or `$ref` object found in the root document outside of the component map.
  pub fn lower_value(&mut self, value: &Value) -> SchemaRef {
    self.lower_ref(value, None, None)
  }

  #[must_use]
  pub fn finish(self) -> SchemaArena {
    self.arena
  }

  fn lower_pointer(&mut self, document: Option<&str>, pointer: &str) -> Option<NodeId> {
    self.lower_pointer_within(document, pointer, MAX_REF_CHAIN)
  }

  /// `budget` bounds how many `$ref`-only hops may still be followed, so reference-only
  /// cycles end unresolved instead of recursing forever.
  fn lower_pointer_within(&mut self, document: Option<&str>, pointer: &str, budget: usize) -> Option<NodeId> {
    let key = (document.map(str::to_string), pointer.to_string());
    if let Some(id) = self.memo.get(&key) {
      return Some(*id);
    }

    let documents = self.documents;
    let root = match document {
      None => &documents.root,
      Some(name) => documents.externals.get(name)?,
    };
    let value = root.pointer(pointer)?;

    if let Some(target) = value.get("$ref").and_then(Value::as_str) {
      // A component that is itself only a reference shares the target node.
      let resolved = self.resolve_chain(target, document, budget.checked_sub(1)?)?;
      self.memo.insert(key, resolved);
      return Some(resolved);
    }

    let origin = NodeOrigin {
      document: document.map(str::to_string),
      pointer: Some(pointer.to_string()),
    };
    let id = self.arena.reserve(origin.clone());
    self.memo.insert(key, id);
    let node = self.lower_node(value, origin);
    self.arena.fill(id, node);
    Some(id)
  }

  fn resolve_chain(&mut self, reference: &str, document: Option<&str>, budget: usize) -> Option<NodeId> {
    if budget == 0 {
      return None;
    }
    let (file, fragment) = split_reference(reference).ok()?;
    let target_document = if file.is_empty() {
      document.map(str::to_string)
    } else {
      Some(file.to_string())
    };
    if fragment.is_empty() {
      return None;
    }
    self.lower_pointer_within(target_document.as_deref(), fragment, budget)
  }

  fn lower_ref(&mut self, value: &Value, document: Option<&str>, pointer: Option<String>) -> SchemaRef {
    if let Some(reference) = value.get("$ref").and_then(Value::as_str) {
      let node = self.resolve_chain(reference, document, MAX_REF_CHAIN);
      return SchemaRef::reference(reference, node);
    }

    if let Some(pointer) = pointer {
      let key = (document.map(str::to_string), pointer.clone());
      if let Some(id) = self.memo.get(&key) {
        return SchemaRef::inline(*id);
      }
      let origin = NodeOrigin {
        document: document.map(str::to_string),
        pointer: Some(pointer),
      };
      let id = self.arena.reserve(origin.clone());
      self.memo.insert(key, id);
      let node = self.lower_node(value, origin);
      self.arena.fill(id, node);
      return SchemaRef::inline(id);
    }

    let origin = NodeOrigin {
      document: document.map(str::to_string),
      pointer: None,
    };
    let id = self.arena.reserve(origin.clone());
    let node = self.lower_node(value, origin);
    self.arena.fill(id, node);
    SchemaRef::inline(id)
  }

  fn lower_node(&mut self, value: &Value, origin: NodeOrigin) -> SchemaNode {
    let Some(object) = value.as_object() else {
      return SchemaNode {
        origin,
        ..SchemaNode::default()
      };
    };

    let document = origin.document.clone();
    let document = document.as_deref();
    let child = |suffix: &str| origin.pointer.as_ref().map(|p| format!("{p}/{suffix}"));

    let types = match object.get("type") {
      Some(Value::String(name)) => vec![JsonType::parse(name)],
      Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).map(JsonType::parse).collect(),
      _ => vec![],
    };

    let nullable = types.contains(&JsonType::Null)
      || flag(object, "nullable")
      || object.get("x-nullable").and_then(Value::as_bool).unwrap_or(false);

    let mut properties = BTreeMap::new();
    if let Some(props) = object.get("properties").and_then(Value::as_object) {
      for (name, schema) in props {
        let pointer = child(&format!("properties/{}", escape_pointer_segment(name)));
        properties.insert(name.clone(), self.lower_ref(schema, document, pointer));
      }
    }

    let additional_properties = match object.get("additionalProperties") {
      None => AdditionalProperties::Absent,
      Some(Value::Bool(allowed)) => AdditionalProperties::Allowed(*allowed),
      Some(schema) => AdditionalProperties::Schema(self.lower_ref(schema, document, child("additionalProperties"))),
    };

    let mut enum_values = object
      .get("enum")
      .and_then(Value::as_array)
      .cloned()
      .unwrap_or_default();
    if enum_values.is_empty()
      && let Some(constant) = object.get("const")
    {
      enum_values.push(constant.clone());
    }

    let items = match object.get("items") {
      None | Some(Value::Bool(_)) => None,
      Some(Value::Array(tuple)) => tuple.first().map(|first| self.lower_ref(first, document, child("items/0"))),
      Some(schema) => Some(self.lower_ref(schema, document, child("items"))),
    };

    let discriminator = object.get("discriminator").and_then(|d| {
      let property_name = d.get("propertyName")?.as_str()?.to_string();
      let mapping = d
        .get("mapping")
        .and_then(Value::as_object)
        .map(|m| {
          m.iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
        })
        .unwrap_or_default();
      Some(Discriminator { property_name, mapping })
    });

    let all_of = self.lower_list(object, "allOf", document, &origin);
    let one_of = self.lower_list(object, "oneOf", document, &origin);
    let any_of = self.lower_list(object, "anyOf", document, &origin);

    SchemaNode {
      types,
      format: string(object, "format"),
      nullable,
      title: string(object, "title"),
      description: string(object, "description"),
      all_of,
      one_of,
      any_of,
      properties,
      required: object
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default(),
      additional_properties,
      enum_values,
      items,
      discriminator,
      read_only: flag(object, "readOnly"),
      write_only: flag(object, "writeOnly"),
      deprecated: flag(object, "deprecated"),
      default: object.get("default").cloned(),
      extensions: object
        .iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect(),
      origin,
    }
  }

  fn lower_list(
    &mut self,
    object: &Map<String, Value>,
    keyword: &str,
    document: Option<&str>,
    origin: &NodeOrigin,
  ) -> Vec<SchemaRef> {
    let Some(list) = object.get(keyword).and_then(Value::as_array) else {
      return vec![];
    };
    list
      .iter()
      .enumerate()
      .map(|(i, schema)| {
        let pointer = origin.pointer.as_ref().map(|p| format!("{p}/{keyword}/{i}"));
        self.lower_ref(schema, document, pointer)
      })
      .collect()
  }
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
  object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string(object: &Map<String, Value>, key: &str) -> Option<String> {
  object.get(key).and_then(Value::as_str).map(str::to_string)
}
