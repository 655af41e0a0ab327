use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::{
  RustType, SchemaCompiler, TypeDescriptor, TypePath, TypeShape, UnionKind, UnionShape, UnionVariant,
};
use crate::{
  generator::{
    document::{ComponentKey, Discriminator, JsonType, SchemaNode, SchemaRef},
    errors::{GenerationError, GenerationResult},
    naming::unique::ensure_unique,
  },
  utils::refs::parse_component_ref,
};

impl SchemaCompiler<'_> {
  /// Builds the variant list of a `oneOf`/`anyOf`.
  ///
  /// `null` members only make the union nullable. Variants with the same spelling collapse
  /// into one. With a discriminator every remaining variant must end up with a mapping entry.
  pub(super) fn compile_union(
    &mut self,
    kind: UnionKind,
    members: &[SchemaRef],
    node: &SchemaNode,
    path: &TypePath,
  ) -> GenerationResult<TypeDescriptor> {
    let discriminator = node.discriminator.as_ref();
    let mut additional_types = vec![];
    let mut variants: Vec<UnionVariant> = vec![];
    let mut compiled_variants: Vec<TypeDescriptor> = vec![];
    let mut mapping = IndexMap::new();
    let mut spellings = BTreeSet::new();
    let mut used_names = BTreeSet::new();
    let mut nullable = false;

    for (index, member) in members.iter().enumerate() {
      if self.is_null_only(member) {
        nullable = true;
        continue;
      }

      let mut compiled = self.compile(member, &path.child(index.to_string()))?;
      additional_types.append(&mut compiled.take_additional_types());
      let spelling = compiled.rust_type.to_string();
      if !spellings.insert(spelling.clone()) {
        continue;
      }

      if let Some(discriminator) = discriminator
        && let Some(value) = self.discriminator_value(discriminator, member, &compiled.rust_type)?
      {
        mapping.entry(value).or_insert_with(|| spelling.clone());
      }

      let name = variant_name(&compiled, index, &used_names);
      used_names.insert(name.clone());
      variants.push(UnionVariant {
        name,
        rust_type: compiled.rust_type.clone(),
        description: compiled.description.clone(),
      });
      compiled_variants.push(compiled);
    }

    if let Some(discriminator) = discriminator {
      if mapping.len() != variants.len() {
        return Err(GenerationError::UnmappedDiscriminator {
          mapped: mapping.len(),
          variants: variants.len(),
        });
      }
      tracing::trace!(path = %path, property = %discriminator.property_name, "discriminated union");
    }

    // `oneOf: [T, null]` is just a nullable `T`.
    if discriminator.is_none() && compiled_variants.len() <= 1 {
      let mut descriptor = compiled_variants.pop().unwrap_or_else(TypeDescriptor::any);
      descriptor.nullable |= nullable;
      descriptor.additional_types = additional_types;
      return Ok(descriptor);
    }

    let mut descriptor = TypeDescriptor::new(RustType::any()).with_shape(TypeShape::Union(UnionShape {
      kind,
      variants,
      discriminator: discriminator.map(|d| d.property_name.clone()),
      mapping,
    }));
    descriptor.define_via_alias = false;
    descriptor.nullable = nullable;
    descriptor.additional_types = additional_types;
    Ok(descriptor)
  }

  fn is_null_only(&self, member: &SchemaRef) -> bool {
    !member.is_reference()
      && self
        .resolver
        .arena()
        .get(member)
        .is_some_and(|node| !node.types.is_empty() && node.types.iter().all(|t| *t == JsonType::Null))
  }

  /// The discriminator value that selects `member`: the first explicit mapping entry that
  /// targets it, else the component name of the reference.
  fn discriminator_value(
    &self,
    discriminator: &Discriminator,
    member: &SchemaRef,
    rust_type: &RustType,
  ) -> GenerationResult<Option<String>> {
    let Some(ref_path) = member.ref_path.as_deref().filter(|r| !r.is_empty()) else {
      if discriminator.mapping.is_empty() {
        return Ok(None);
      }
      return Err(GenerationError::AmbiguousDiscriminatorMapping);
    };

    let explicit = discriminator
      .mapping
      .iter()
      .find(|(_, target)| self.mapping_target(target).as_ref() == Some(rust_type) || target.as_str() == ref_path)
      .map(|(value, _)| value.clone());
    if explicit.is_some() {
      return Ok(explicit);
    }

    Ok(Some(match parse_component_ref(ref_path) {
      Some(component) => component.name,
      None => rust_type.to_string(),
    }))
  }

  /// Spelling of a mapping target, written either as a reference or as a bare component name.
  fn mapping_target(&self, target: &str) -> Option<RustType> {
    if target.contains('#') {
      return self.resolver.type_for_ref(target, None);
    }
    self.resolver.type_for_component(&ComponentKey::local(target))
  }
}

/// The last path segment of a named variant, or the kind of value it holds. Collisions take
/// the shape suffix, then the variant index.
fn variant_name(compiled: &TypeDescriptor, index: usize, used: &BTreeSet<String>) -> String {
  let suffix = shape_suffix(compiled);
  let base = match compiled.rust_type.named() {
    Some(name) => name.rsplit("::").next().unwrap_or(name).to_string(),
    None => suffix.to_string(),
  };
  if !used.contains(&base) {
    return base;
  }
  let with_suffix = format!("{base}{suffix}");
  if !used.contains(&with_suffix) {
    return with_suffix;
  }
  ensure_unique(&format!("Variant{index}"), used)
}

fn shape_suffix(compiled: &TypeDescriptor) -> &'static str {
  use super::RustPrimitive as P;

  match (&compiled.shape, &compiled.rust_type) {
    (TypeShape::Array(_), _) | (_, RustType::Vec(_)) => "Array",
    (TypeShape::Map(_), _) | (_, RustType::Map(_)) => "Map",
    (TypeShape::Enum(_), _) => "Enum",
    (_, RustType::Primitive(P::Bool)) => "Boolean",
    (_, RustType::Primitive(P::I8 | P::I16 | P::I32 | P::I64 | P::U8 | P::U16 | P::U32 | P::U64)) => "Integer",
    (_, RustType::Primitive(P::F32 | P::F64)) => "Number",
    (_, RustType::Primitive(P::Value)) => "Any",
    (_, RustType::Primitive(_)) => "String",
    (_, RustType::Named(_) | RustType::Verbatim(_)) => "Object",
  }
}
