use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// Index of a [`SchemaNode`] inside a [`SchemaArena`]. Equal ids mean the same schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
  #[must_use]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A reference cell. `ref_path` is the `$ref` string as written, `node` the schema it resolves to.
///
/// An inline schema has a node and no path. A reference that could not be resolved keeps
/// its path and has no node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaRef {
  pub ref_path: Option<String>,
  pub node: Option<NodeId>,
}

impl SchemaRef {
  #[must_use]
  pub fn inline(node: NodeId) -> Self {
    Self {
      ref_path: None,
      node: Some(node),
    }
  }

  #[must_use]
  pub fn reference(ref_path: impl Into<String>, node: Option<NodeId>) -> Self {
    Self {
      ref_path: Some(ref_path.into()),
      node,
    }
  }

  #[must_use]
  pub fn is_reference(&self) -> bool {
    self.ref_path.as_deref().is_some_and(|r| !r.is_empty())
  }

  #[must_use]
  pub fn is_unresolved(&self) -> bool {
    self.is_reference() && self.node.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
  Null,
  Boolean,
  Integer,
  Number,
  String,
  Array,
  Object,
  Other(String),
}

impl JsonType {
  #[must_use]
  pub fn parse(name: &str) -> Self {
    match name {
      "null" => Self::Null,
      "boolean" => Self::Boolean,
      "integer" => Self::Integer,
      "number" => Self::Number,
      "string" => Self::String,
      "array" => Self::Array,
      "object" => Self::Object,
      other => Self::Other(other.to_string()),
    }
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    match self {
      Self::Null => "null",
      Self::Boolean => "boolean",
      Self::Integer => "integer",
      Self::Number => "number",
      Self::String => "string",
      Self::Array => "array",
      Self::Object => "object",
      Self::Other(other) => other,
    }
  }
}

impl std::fmt::Display for JsonType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdditionalProperties {
  #[default]
  Absent,
  Allowed(bool),
  Schema(SchemaRef),
}

impl AdditionalProperties {
  #[must_use]
  pub fn schema(&self) -> Option<&SchemaRef> {
    match self {
      Self::Schema(schema) => Some(schema),
      Self::Absent | Self::Allowed(_) => None,
    }
  }

  #[must_use]
  pub fn is_absent(&self) -> bool {
    matches!(self, Self::Absent)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discriminator {
  pub property_name: String,
  pub mapping: BTreeMap<String, String>,
}

/// Where a node was lowered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeOrigin {
  /// External document the node lives in, `None` for the root document.
  pub document: Option<String>,
  /// JSON pointer of the node inside its document, when it was reached through one.
  pub pointer: Option<String>,
}

impl NodeOrigin {
  /// The component name when the node is `#/components/schemas/{name}`.
  #[must_use]
  pub fn component_name(&self) -> Option<&str> {
    let name = self.pointer.as_deref()?.strip_prefix("/components/schemas/")?;
    (!name.contains('/')).then_some(name)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
  pub types: Vec<JsonType>,
  pub format: Option<String>,
  pub nullable: bool,
  pub title: Option<String>,
  pub description: Option<String>,
  pub all_of: Vec<SchemaRef>,
  pub one_of: Vec<SchemaRef>,
  pub any_of: Vec<SchemaRef>,
  pub properties: BTreeMap<String, SchemaRef>,
  pub required: BTreeSet<String>,
  pub additional_properties: AdditionalProperties,
  pub enum_values: Vec<Value>,
  pub items: Option<SchemaRef>,
  pub discriminator: Option<Discriminator>,
  pub read_only: bool,
  pub write_only: bool,
  pub deprecated: bool,
  pub default: Option<Value>,
  pub extensions: BTreeMap<String, Value>,
  pub origin: NodeOrigin,
}

impl SchemaNode {
  /// Declared types with any `null` member removed.
  pub fn concrete_types(&self) -> impl Iterator<Item = &JsonType> {
    self.types.iter().filter(|t| **t != JsonType::Null)
  }

  #[must_use]
  pub fn has_type(&self, json_type: &JsonType) -> bool {
    self.types.contains(json_type)
  }

  #[must_use]
  pub fn is_object_shaped(&self) -> bool {
    match self.types.as_slice() {
      [] => true,
      types => types.iter().all(|t| matches!(t, JsonType::Object | JsonType::Null)) && self.has_type(&JsonType::Object),
    }
  }

  #[must_use]
  pub fn has_union(&self) -> bool {
    !self.one_of.is_empty() || !self.any_of.is_empty()
  }

  #[must_use]
  pub fn has_composition(&self) -> bool {
    !self.all_of.is_empty() || self.has_union()
  }

  /// Looks up an extension by its full name. Keys stored without the `x-` prefix are matched too.
  #[must_use]
  pub fn extension(&self, name: &str) -> Option<&Value> {
    self
      .extensions
      .get(name)
      .or_else(|| name.strip_prefix("x-").and_then(|short| self.extensions.get(short)))
  }
}

/// Owns every schema node of a generation run.
#[derive(Debug, Clone, Default)]
pub struct SchemaArena {
  nodes: Vec<SchemaNode>,
  components: BTreeMap<ComponentKey, SchemaRef>,
}

/// A component schema, keyed by document (`None` for the root) and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
  pub document: Option<String>,
  pub name: String,
}

impl ComponentKey {
  #[must_use]
  pub fn local(name: impl Into<String>) -> Self {
    Self {
      document: None,
      name: name.into(),
    }
  }
}

impl SchemaArena {
  #[must_use]
  pub fn node(&self, id: NodeId) -> &SchemaNode {
    &self.nodes[id.index()]
  }

  #[must_use]
  pub fn get(&self, schema_ref: &SchemaRef) -> Option<&SchemaNode> {
    schema_ref.node.map(|id| self.node(id))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[must_use]
  pub fn component(&self, key: &ComponentKey) -> Option<&SchemaRef> {
    self.components.get(key)
  }

  /// Component schemas in name order, root document first. An alias component keeps its
  /// `$ref` so it can be emitted as an alias of its target.
  pub fn components(&self) -> impl Iterator<Item = (&ComponentKey, &SchemaRef)> {
    self.components.iter()
  }

  /// Root-document component schemas in name order.
  pub fn local_components(&self) -> impl Iterator<Item = (&str, &SchemaRef)> {
    self
      .components
      .iter()
      .filter(|(k, _)| k.document.is_none())
      .map(|(k, v)| (k.name.as_str(), v))
  }

  pub(crate) fn register_component(&mut self, key: ComponentKey, schema_ref: SchemaRef) {
    self.components.insert(key, schema_ref);
  }

  pub(crate) fn reserve(&mut self, origin: NodeOrigin) -> NodeId {
    let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
    self.nodes.push(SchemaNode {
      origin,
      ..SchemaNode::default()
    });
    id
  }

  pub(crate) fn fill(&mut self, id: NodeId, node: SchemaNode) {
    self.nodes[id.index()] = node;
  }
}
