//! Reference lookup, cycle guarding and reference restoration for one generation run.

pub mod restoration;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;

pub use restoration::RestorationTable;

use crate::{
  generator::{
    compiler::{RustType, extensions::RUST_TYPE_NAME},
    document::{ComponentKey, NodeId, SchemaArena, SchemaNode, SchemaRef},
    errors::{GenerationError, GenerationResult},
    naming::{identifiers::to_rust_type_name, unique::unique_name},
  },
  utils::refs::parse_component_ref,
};

/// What a [`SchemaRef`] stands for.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
  /// No schema at all.
  Absent,
  /// A reference to a named type. `node` is the target body when it could be loaded.
  Named {
    rust_type: RustType,
    node: Option<(NodeId, &'a SchemaNode)>,
  },
  /// A schema to compile in place.
  Inline { id: NodeId, node: &'a SchemaNode },
  /// A reference that points nowhere and cannot be spelled.
  Unresolved { ref_path: String },
}

/// Resolver state owned by one generation run.
///
/// Holds the arena, the type names given to components, every type name handed out so far,
/// the restoration table and the set of schemas whose compilation is in progress.
pub struct Resolver<'a> {
  arena: &'a SchemaArena,
  import_mapping: &'a BTreeMap<String, String>,
  restoration: Option<RestorationTable>,
  component_names: BTreeMap<String, String>,
  used_names: BTreeSet<String>,
  in_progress: HashSet<NodeId>,
}

impl<'a> Resolver<'a> {
  /// Assigns every root-document component a unique type name, in component name order.
  pub fn new(
    arena: &'a SchemaArena,
    import_mapping: &'a BTreeMap<String, String>,
    restore_references: bool,
  ) -> GenerationResult<Self> {
    let mut resolver = Self {
      arena,
      import_mapping,
      restoration: restore_references.then(|| RestorationTable::build(arena)),
      component_names: BTreeMap::new(),
      used_names: BTreeSet::new(),
      in_progress: HashSet::new(),
    };

    // Names pinned with `x-rust-type-name` are claimed before any derived name can take them.
    let mut derived = vec![];
    for (name, schema_ref) in arena.local_components() {
      let pinned = if schema_ref.is_reference() {
        None
      } else {
        arena.get(schema_ref).and_then(|node| node.extension(RUST_TYPE_NAME)).and_then(Value::as_str)
      };
      match pinned {
        Some(pinned) => {
          let type_name = to_rust_type_name(pinned);
          if !resolver.claim_exact(&type_name) {
            return Err(GenerationError::DuplicateTypeName {
              name: type_name,
              first: "components.schemas".to_string(),
              second: name.to_string(),
            });
          }
          resolver.component_names.insert(name.to_string(), type_name);
        }
        None => derived.push(name.to_string()),
      }
    }
    for name in derived {
      let type_name = resolver.claim_name(&to_rust_type_name(&name))?;
      resolver.component_names.insert(name, type_name);
    }

    Ok(resolver)
  }

  #[must_use]
  pub fn arena(&self) -> &'a SchemaArena {
    self.arena
  }

  /// Type name given to a root-document component schema.
  #[must_use]
  pub fn component_type_name(&self, component: &str) -> Option<&str> {
    self.component_names.get(component).map(String::as_str)
  }

  /// Reserves a unique top-level name derived from `candidate`.
  pub fn claim_name(&mut self, candidate: &str) -> GenerationResult<String> {
    let name = unique_name(candidate, &self.used_names).ok_or_else(|| GenerationError::NameExhausted(candidate.to_string()))?;
    self.used_names.insert(name.clone());
    Ok(name)
  }

  /// Reserves `name` exactly. Returns `false` when it is already taken.
  pub fn claim_exact(&mut self, name: &str) -> bool {
    self.used_names.insert(name.to_string())
  }

  #[must_use]
  pub fn resolve(&self, schema_ref: &SchemaRef) -> Resolution<'a> {
    let node = schema_ref.node.map(|id| (id, self.arena.node(id)));

    match (&schema_ref.ref_path, node) {
      (None, None) => Resolution::Absent,
      (None, Some((id, node))) => Resolution::Inline { id, node },
      (Some(ref_path), node) => match self.type_for_ref(ref_path, node.map(|(_, n)| n)) {
        Some(rust_type) => Resolution::Named { rust_type, node },
        None => match node {
          // A pointer into the middle of a schema has no name of its own.
          Some((id, node)) => Resolution::Inline { id, node },
          None => Resolution::Unresolved {
            ref_path: ref_path.clone(),
          },
        },
      },
    }
  }

  /// Spells a reference. The target node's origin is authoritative, the reference text is
  /// used when the target could not be loaded.
  #[must_use]
  pub fn type_for_ref(&self, ref_path: &str, node: Option<&SchemaNode>) -> Option<RustType> {
    if let Some(name) = node.and_then(|n| n.origin.component_name()) {
      let key = ComponentKey {
        document: node.and_then(|n| n.origin.document.clone()),
        name: name.to_string(),
      };
      return self.type_for_component(&key);
    }
    if node.is_some() {
      return None;
    }

    let component = parse_component_ref(ref_path).filter(|r| r.section == "schemas")?;
    let key = ComponentKey {
      document: component.document.map(str::to_string),
      name: component.name,
    };
    // A local component that is missing, or whose `$ref` chain never reaches a schema, has no
    // type to name.
    if key.document.is_none() && self.arena.component(&key).is_none_or(SchemaRef::is_unresolved) {
      return None;
    }
    self.type_for_component(&key)
  }

  #[must_use]
  pub fn type_for_component(&self, key: &ComponentKey) -> Option<RustType> {
    match &key.document {
      None => self.component_names.get(&key.name).cloned().map(RustType::Named),
      Some(document) => {
        let module = self.import_mapping.get(document)?;
        Some(RustType::Named(format!("{module}::{}", to_rust_type_name(&key.name))))
      }
    }
  }

  /// The named type an inline schema was copied from, if reference restoration is enabled.
  #[must_use]
  pub fn restore(&self, id: Option<NodeId>, node: &SchemaNode) -> Option<RustType> {
    let key = self.restoration.as_ref()?.restore(id, node)?;
    self.type_for_component(&key)
  }

  /// Marks `id` as being compiled. Returns `false` when it already is, which means the
  /// caller reached a cycle and must return a stub.
  pub fn enter(&mut self, id: NodeId) -> bool {
    self.in_progress.insert(id)
  }

  pub fn leave(&mut self, id: NodeId) {
    self.in_progress.remove(&id);
  }

  #[must_use]
  pub fn is_in_progress(&self, id: NodeId) -> bool {
    self.in_progress.contains(&id)
  }
}

#[cfg(test)]
mod tests;
