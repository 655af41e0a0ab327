use std::{cmp::Ordering, collections::BTreeMap};

use super::{
  RustPrimitive, SchemaCompiler, StructShape, TypeDescriptor, TypePath,
  extensions::{RUST_TYPE, RUST_TYPE_NAME},
  objects::struct_descriptor,
  primitives::scalar_type,
};
use crate::{
  generator::{
    document::{AdditionalProperties, JsonType, SchemaNode, SchemaRef},
    errors::{GenerationError, GenerationResult},
    metrics::GenerationWarning,
    resolver::Resolution,
  },
  utils::refs::propagate_remote_ref,
};

/// What a property declares, for deciding whether two declarations agree.
#[derive(Debug, PartialEq, Eq)]
enum DeclaredType<'n> {
  Reference(&'n str),
  /// Scalars agree when they compile to the same Rust type, whatever their format text.
  Scalar(RustPrimitive),
  Other {
    types: Vec<&'n JsonType>,
    format: Option<&'n str>,
    items: Option<Box<DeclaredType<'n>>>,
  },
}

impl SchemaCompiler<'_> {
  /// `allOf`: a lone member compiles as itself, references with flat inline members embed,
  /// anything else is merged into one schema first.
  pub(super) fn compile_all_of(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    if node.all_of.is_empty() {
      return Err(GenerationError::EmptyComposition);
    }
    if self.config.old_merge_schemas {
      return self.legacy_merge(node, path);
    }

    let has_siblings = !node.properties.is_empty() || !node.additional_properties.is_absent() || node.has_union();
    if let [member] = node.all_of.as_slice()
      && !has_siblings
    {
      let descriptor = self.compile(member, path)?;
      return Ok(descriptor.with_description(node.description.clone()));
    }

    if self.can_embed(node) {
      return self.embed(node, path);
    }

    let merged = self.merge_members(node, path)?;
    self.compile_body(&merged, path)
  }

  /// Named types plus flat inline object schemas.
  fn can_embed(&self, node: &SchemaNode) -> bool {
    if node.has_union() {
      return false;
    }
    let mut named = 0;
    for member in &node.all_of {
      match self.resolver.resolve(member) {
        Resolution::Named { node: Some((id, _)), .. } if self.resolver.is_in_progress(id) => return false,
        Resolution::Named { .. } => named += 1,
        Resolution::Inline { node, .. } if !node.has_composition() && node.is_object_shaped() => {}
        _ => return false,
      }
    }
    named > 0
  }

  fn embed(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let mut embedded = vec![];
    let mut inline = SchemaNode::default();

    for member in &node.all_of {
      match self.resolver.resolve(member) {
        Resolution::Named { rust_type, .. } => embedded.push(rust_type),
        Resolution::Inline { node: member, .. } => absorb_fields(&mut inline, member),
        Resolution::Absent | Resolution::Unresolved { .. } => {}
      }
    }
    absorb_fields(&mut inline, node);

    let mut additional_types = vec![];
    let properties = self.compile_properties(&inline, path, &mut additional_types)?;
    let mut descriptor = struct_descriptor(StructShape {
      properties,
      embedded,
      ..StructShape::default()
    });
    descriptor.additional_types = additional_types;
    Ok(descriptor)
  }

  /// Folds every member, nested `allOf` included, and the enclosing schema's own fields into
  /// one schema.
  fn merge_members(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<SchemaNode> {
    let mut members = vec![];
    self.flatten_members(&node.all_of, path, &mut members)?;

    let siblings = SchemaNode {
      all_of: vec![],
      extensions: BTreeMap::new(),
      ..node.clone()
    };
    members.push(siblings);

    let mut members = members.into_iter();
    let Some(mut merged) = members.next() else {
      return Err(GenerationError::EmptyComposition);
    };
    for member in members {
      merged = self.merge_pair(merged, member)?;
    }

    merged.all_of.clear();
    merged.extensions.remove(RUST_TYPE);
    merged.extensions.remove(RUST_TYPE_NAME);
    if node.description.is_some() {
      merged.description.clone_from(&node.description);
    }
    merged.nullable |= node.nullable;
    Ok(merged)
  }

  fn flatten_members(
    &mut self,
    refs: &[SchemaRef],
    path: &TypePath,
    members: &mut Vec<SchemaNode>,
  ) -> GenerationResult<()> {
    let arena = self.resolver.arena();
    for member in refs {
      let Some(id) = member.node else {
        if let Some(ref_path) = &member.ref_path {
          self.warn(GenerationWarning::UnresolvedReference {
            path: path.to_string(),
            ref_path: ref_path.clone(),
          });
        }
        continue;
      };
      if !self.resolver.enter(id) {
        self.warn(GenerationWarning::CompositionCycle { path: path.to_string() });
        continue;
      }

      let mut node = arena.node(id).clone();
      let result = qualify_remote_refs(&mut node).and_then(|()| self.flatten_members(&node.all_of, path, members));
      self.resolver.leave(id);
      result?;

      node.all_of.clear();
      members.push(node);
    }
    Ok(())
  }

  fn merge_pair(&self, mut merged: SchemaNode, next: SchemaNode) -> GenerationResult<SchemaNode> {
    if merged.types.is_empty() {
      merged.types = next.types;
    }

    for (name, candidate) in next.properties {
      let winner = match merged.properties.get(&name) {
        None => candidate,
        Some(existing) if *existing == candidate => continue,
        Some(existing) => self.pick_property(&name, existing, candidate)?,
      };
      merged.properties.insert(name, winner);
    }
    merged.required.extend(next.required);

    merged.additional_properties = match (merged.additional_properties, next.additional_properties) {
      (AdditionalProperties::Schema(a), AdditionalProperties::Schema(b)) => {
        if self.declared_type(&a) != self.declared_type(&b) {
          return Err(GenerationError::IncompatibleAdditionalProperties);
        }
        AdditionalProperties::Schema(a)
      }
      (AdditionalProperties::Absent, other) | (other, AdditionalProperties::Absent) => other,
      (AdditionalProperties::Allowed(_), schema @ AdditionalProperties::Schema(_)) => schema,
      (current, _) => current,
    };

    merged.format = merged.format.or(next.format);
    merged.title = merged.title.or(next.title);
    merged.description = merged.description.or(next.description);
    merged.default = merged.default.or(next.default);
    merged.items = merged.items.or(next.items);
    merged.discriminator = merged.discriminator.or(next.discriminator);
    if merged.enum_values.is_empty() {
      merged.enum_values = next.enum_values;
    }
    if merged.one_of.is_empty() {
      merged.one_of = next.one_of;
    }
    if merged.any_of.is_empty() {
      merged.any_of = next.any_of;
    }
    merged.read_only |= next.read_only;
    merged.write_only |= next.write_only;
    merged.deprecated |= next.deprecated;
    for (key, value) in next.extensions {
      merged.extensions.entry(key).or_insert(value);
    }
    Ok(merged)
  }

  /// Two declarations of one property: the more specific one wins, an enum over a plain value
  /// and an array of items over a generic object. Otherwise they must declare the same type.
  fn pick_property(&self, name: &str, existing: &SchemaRef, candidate: SchemaRef) -> GenerationResult<SchemaRef> {
    let arena = self.resolver.arena();
    if let (Some(a), Some(b)) = (arena.get(existing), arena.get(&candidate)) {
      match more_specific(a, b) {
        Some(Ordering::Greater) => return Ok(existing.clone()),
        Some(Ordering::Less) => return Ok(candidate),
        Some(Ordering::Equal) | None => {}
      }
    }

    if self.declared_type(existing) == self.declared_type(&candidate) {
      return Ok(existing.clone());
    }
    Err(GenerationError::IncompatibleProperty(name.to_string()))
  }

  fn declared_type<'s>(&'s self, schema: &'s SchemaRef) -> DeclaredType<'s> {
    if let Some(reference) = schema.ref_path.as_deref().filter(|r| !r.is_empty()) {
      return DeclaredType::Reference(reference);
    }
    let Some(node) = self.resolver.arena().get(schema) else {
      return DeclaredType::Other {
        types: vec![],
        format: None,
        items: None,
      };
    };
    if let Some(primitive) = scalar_type(node) {
      return DeclaredType::Scalar(primitive);
    }

    let mut types: Vec<&JsonType> = node.concrete_types().collect();
    types.sort();
    DeclaredType::Other {
      types,
      format: node.format.as_deref(),
      items: node.items.as_ref().map(|items| Box::new(self.declared_type(items))),
    }
  }
}

/// Enum-bearing beats plain and an array of items beats a generic object. Any other pair has
/// no winner and must agree on its declared type.
fn more_specific(a: &SchemaNode, b: &SchemaNode) -> Option<Ordering> {
  let has_enum = |node: &SchemaNode| !node.enum_values.is_empty();
  match (has_enum(a), has_enum(b)) {
    (true, false) => return Some(Ordering::Greater),
    (false, true) => return Some(Ordering::Less),
    _ => {}
  }
  match (is_item_array(a), is_item_array(b)) {
    (true, false) if is_generic_object(b) => Some(Ordering::Greater),
    (false, true) if is_generic_object(a) => Some(Ordering::Less),
    _ => None,
  }
}

fn is_item_array(node: &SchemaNode) -> bool {
  node.has_type(&JsonType::Array) && node.items.is_some()
}

/// `type: object` with nothing that gives it a shape.
fn is_generic_object(node: &SchemaNode) -> bool {
  node.has_type(&JsonType::Object)
    && node.properties.is_empty()
    && node.additional_properties.schema().is_none()
    && !node.has_composition()
}

/// Adds the properties and required names of `from` that `into` does not declare yet.
fn absorb_fields(into: &mut SchemaNode, from: &SchemaNode) {
  for (name, schema) in &from.properties {
    into.properties.entry(name.clone()).or_insert_with(|| schema.clone());
  }
  into.required.extend(from.required.iter().cloned());
}

/// Rewrites the document-local references of a node read from an external document so they
/// keep pointing into that document once merged elsewhere.
fn qualify_remote_refs(node: &mut SchemaNode) -> GenerationResult<()> {
  let Some(document) = node.origin.document.clone() else {
    return Ok(());
  };

  let refs = node
    .properties
    .values_mut()
    .chain(node.items.as_mut())
    .chain(node.one_of.iter_mut())
    .chain(node.any_of.iter_mut())
    .chain(node.all_of.iter_mut())
    .chain(match &mut node.additional_properties {
      AdditionalProperties::Schema(schema) => Some(schema),
      AdditionalProperties::Absent | AdditionalProperties::Allowed(_) => None,
    });
  for schema in refs {
    if let Some(reference) = &schema.ref_path {
      schema.ref_path = Some(propagate_remote_ref(reference, Some(&document))?);
    }
  }
  Ok(())
}
