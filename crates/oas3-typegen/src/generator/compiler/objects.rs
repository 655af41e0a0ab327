use std::collections::BTreeSet;

use super::{
  AdditionalPropertiesShape, Property, PropertyExtensions, RustType, SchemaCompiler, StructShape, TypeDefinition,
  TypeDescriptor, TypePath, TypeShape, UnionKind,
  extensions::{self, RUST_NAME, RUST_NAME_VERBATIM},
};
use crate::generator::{
  document::{AdditionalProperties, JsonType, SchemaNode, SchemaRef},
  errors::GenerationResult,
  metrics::GenerationWarning,
  naming::{
    identifiers::{is_valid_field_name, to_rust_field_name},
    unique::ensure_unique,
  },
};

/// Explicitly typed `object`, or untyped with nothing that points at another shape.
pub(super) fn is_object_like(node: &SchemaNode) -> bool {
  node.has_type(&JsonType::Object)
    || (node.concrete_types().next().is_none() && node.items.is_none() && node.enum_values.is_empty())
}

impl SchemaCompiler<'_> {
  pub(super) fn compile_object(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let union = self.union_members(node, path);

    if node.properties.is_empty() && node.additional_properties.is_absent() && union.is_none() {
      if node.has_type(&JsonType::Object) {
        return Ok(map_of(TypeDescriptor::any()));
      }
      return Ok(TypeDescriptor::any());
    }

    if node.properties.is_empty() && union.is_none() && !self.config.disable_flatten_additional_properties {
      match &node.additional_properties {
        AdditionalProperties::Schema(schema) => {
          let value = self.compile(schema, &path.child("AdditionalProperties"))?;
          return Ok(map_of(value));
        }
        AdditionalProperties::Allowed(true) => return Ok(map_of(TypeDescriptor::any())),
        AdditionalProperties::Allowed(false) | AdditionalProperties::Absent => {}
      }
    }

    if node.properties.is_empty()
      && node.additional_properties.is_absent()
      && let Some((kind, members)) = union
    {
      return self.compile_union(kind, members, node, path);
    }

    let mut additional_types = vec![];
    let properties = self.compile_properties(node, path, &mut additional_types)?;

    let additional_properties = match &node.additional_properties {
      AdditionalProperties::Absent => AdditionalPropertiesShape::None,
      AdditionalProperties::Allowed(allowed) => AdditionalPropertiesShape::Flag(*allowed),
      AdditionalProperties::Schema(schema) => {
        let mut value = self.compile(schema, &path.child("AdditionalProperties"))?;
        additional_types.append(&mut value.take_additional_types());
        AdditionalPropertiesShape::Typed(Box::new(value))
      }
    };

    let union = match union {
      Some((kind, members)) => {
        let union_path = path.child("Union");
        let mut body = self.compile_union(kind, members, node, &union_path)?;
        if body.is_structural() {
          let name = self.resolver.claim_name(&union_path.type_name())?;
          body = Self::define(name, body, &union_path);
        }
        additional_types.append(&mut body.take_additional_types());
        Some(body.rust_type)
      }
      None => None,
    };

    let shape = StructShape {
      properties,
      embedded: vec![],
      additional_properties,
      union,
    };
    let mut descriptor = struct_descriptor(shape);
    descriptor.additional_types = additional_types;
    Ok(descriptor)
  }

  /// `oneOf` wins over `anyOf` when a schema carries both.
  fn union_members<'n>(&mut self, node: &'n SchemaNode, path: &TypePath) -> Option<(UnionKind, &'n [SchemaRef])> {
    if !node.one_of.is_empty() {
      if !node.any_of.is_empty() {
        self.warn(GenerationWarning::AnyOfIgnored { path: path.to_string() });
      }
      return Some((UnionKind::OneOf, &node.one_of));
    }
    (!node.any_of.is_empty()).then_some((UnionKind::AnyOf, node.any_of.as_slice()))
  }

  /// Compiles every property of `node` in `x-order`, then name, order.
  pub(super) fn compile_properties(
    &mut self,
    node: &SchemaNode,
    path: &TypePath,
    additional_types: &mut Vec<TypeDefinition>,
  ) -> GenerationResult<Vec<Property>> {
    let arena = self.resolver.arena();
    let mut ordered = node
      .properties
      .iter()
      .map(|(name, schema)| {
        let order = match arena.get(schema) {
          Some(target) => extensions::ext_i64(target, extensions::ORDER)?,
          None => None,
        };
        Ok((order, name, schema))
      })
      .collect::<GenerationResult<Vec<_>>>()?;
    ordered.sort_by(|(a_order, a_name, _), (b_order, b_name, _)| {
      (a_order.is_none(), a_order, a_name).cmp(&(b_order.is_none(), b_order, b_name))
    });

    let mut used_fields = BTreeSet::new();
    let mut properties = Vec::with_capacity(ordered.len());
    for (_, name, schema) in ordered {
      let mut descriptor = self.compile(schema, &path.child(name.as_str()))?;
      additional_types.append(&mut descriptor.take_additional_types());
      let property = self.property(node, name, schema, descriptor, &mut used_fields)?;
      properties.push(property);
    }
    Ok(properties)
  }

  fn property(
    &self,
    parent: &SchemaNode,
    json_name: &str,
    schema: &SchemaRef,
    descriptor: TypeDescriptor,
    used_fields: &mut BTreeSet<String>,
  ) -> GenerationResult<Property> {
    let target = self.resolver.arena().get(schema);

    let (field_extensions, field_name) = match target {
      Some(target) => {
        let mut field_extensions = PropertyExtensions::from_node(target)?;
        let verbatim =
          self.config.allow_unexported_field_names && extensions::ext_bool(target, RUST_NAME_VERBATIM)?.unwrap_or(false);
        let field_name = match extensions::ext_str(target, RUST_NAME)? {
          Some(name) if verbatim && is_valid_field_name(name) => {
            field_extensions.verbatim_name = true;
            name.to_string()
          }
          Some(name) => to_rust_field_name(name),
          None => to_rust_field_name(json_name),
        };
        (field_extensions, field_name)
      }
      None => (PropertyExtensions::default(), to_rust_field_name(json_name)),
    };

    let field_name = ensure_unique(&field_name, used_fields);
    used_fields.insert(field_name.clone());

    Ok(Property {
      json_name: json_name.to_string(),
      field_name,
      nullable: descriptor.nullable,
      required: parent.required.contains(json_name),
      read_only: target.is_some_and(|t| t.read_only),
      write_only: target.is_some_and(|t| t.write_only),
      deprecated: target.is_some_and(|t| t.deprecated),
      description: descriptor.description.clone().or_else(|| target.and_then(|t| t.description.clone())),
      default: target.and_then(|t| t.default.clone()),
      extensions: field_extensions,
      descriptor,
    })
  }
}

/// `HashMap<String, T>` over an already compiled value type.
pub(super) fn map_of(mut value: TypeDescriptor) -> TypeDescriptor {
  let additional_types = value.take_additional_types();
  let mut descriptor = TypeDescriptor::new(RustType::Map(Box::new(value.rust_type.clone())));
  descriptor.shape = TypeShape::Map(Box::new(value));
  descriptor.additional_types = additional_types;
  descriptor
}

/// A struct body. Its spelling is set once the body gets a name.
pub(crate) fn struct_descriptor(shape: StructShape) -> TypeDescriptor {
  let mut descriptor = TypeDescriptor::new(RustType::any()).with_shape(TypeShape::Struct(shape));
  descriptor.define_via_alias = false;
  descriptor
}
