use super::{
  AdditionalPropertiesShape, Property, SchemaCompiler, StructShape, TypeDescriptor, TypePath, TypeShape,
  objects::struct_descriptor,
};
use crate::generator::{
  document::SchemaNode,
  errors::{GenerationError, GenerationResult},
  metrics::GenerationWarning,
};

impl SchemaCompiler<'_> {
  /// The strict `allOf` merge: every member body is compiled on its own and the resulting
  /// structs are combined. Any property declared twice with a different type is an error.
  pub(super) fn legacy_merge(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let arena = self.resolver.arena();
    let mut shape = StructShape::default();
    let mut additional_types = vec![];

    for member in &node.all_of {
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
      let result = self.compile_body(arena.node(id), path);
      self.resolver.leave(id);

      let mut body = result?;
      additional_types.append(&mut body.take_additional_types());
      absorb_body(&mut shape, body)?;
    }

    let own = self.compile_properties(node, path, &mut additional_types)?;
    for property in own {
      absorb_property(&mut shape.properties, property)?;
    }

    let mut descriptor = struct_descriptor(shape);
    descriptor.additional_types = additional_types;
    Ok(descriptor)
  }
}

fn absorb_body(shape: &mut StructShape, body: TypeDescriptor) -> GenerationResult<()> {
  match body.shape {
    TypeShape::Struct(member) => {
      for property in member.properties {
        absorb_property(&mut shape.properties, property)?;
      }
      shape.embedded.extend(member.embedded);
      if shape.union.is_none() {
        shape.union = member.union;
      }
      absorb_additional(&mut shape.additional_properties, member.additional_properties)
    }
    TypeShape::Map(value) => absorb_additional(&mut shape.additional_properties, AdditionalPropertiesShape::Typed(value)),
    TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Enum(_) | TypeShape::Union(_) => {
      tracing::debug!(member = %body.rust_type, "allOf member without properties ignored by the strict merge");
      Ok(())
    }
  }
}

fn absorb_property(properties: &mut Vec<Property>, property: Property) -> GenerationResult<()> {
  match properties.iter().find(|p| p.json_name == property.json_name) {
    Some(existing) if existing.same_as(&property) => Ok(()),
    Some(_) => Err(GenerationError::IncompatibleProperty(property.json_name)),
    None => {
      properties.push(property);
      Ok(())
    }
  }
}

fn absorb_additional(
  current: &mut AdditionalPropertiesShape,
  next: AdditionalPropertiesShape,
) -> GenerationResult<()> {
  use AdditionalPropertiesShape as Shape;

  let replace = match (&*current, &next) {
    (Shape::Typed(a), Shape::Typed(b)) if a.rust_type != b.rust_type => {
      return Err(GenerationError::IncompatibleAdditionalProperties);
    }
    (Shape::None | Shape::Flag(_), Shape::Typed(_)) | (Shape::None, _) => true,
    _ => false,
  };
  if replace {
    *current = next;
  }
  Ok(())
}
