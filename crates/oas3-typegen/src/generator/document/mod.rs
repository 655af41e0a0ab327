//! Arena form of the schemas in a loaded document set.

pub mod arena;
pub mod lower;

use std::collections::BTreeMap;

use serde_json::Value;

pub use arena::{AdditionalProperties, ComponentKey, Discriminator, JsonType, NodeId, SchemaArena, SchemaNode, SchemaRef};
pub use lower::ArenaBuilder;

/// The normalized root document plus any external documents it references, as JSON.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
  pub root: Value,
  pub externals: BTreeMap<String, Value>,
}

impl DocumentSet {
  #[must_use]
  pub fn new(root: Value, externals: BTreeMap<String, Value>) -> Self {
    Self { root, externals }
  }
}

#[cfg(test)]
mod tests;
