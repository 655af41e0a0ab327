use std::collections::BTreeSet;

use serde_json::Value;

use super::{
  EnumShape, EnumValue, RustPrimitive, RustType, SchemaCompiler, TypeDescriptor, TypePath, TypeShape,
  extensions::enum_display_names,
  primitives::{integer_type, number_type, string_type},
};
use crate::generator::{
  document::{JsonType, SchemaNode},
  errors::GenerationResult,
  naming::{identifiers::to_rust_variant_name, unique::ensure_unique},
};

impl SchemaCompiler<'_> {
  /// Enumerations always become a named type, never an alias of their base type.
  pub(super) fn compile_enum(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let format = node.format.as_deref().filter(|f| !f.is_empty());
    let base = match node.concrete_types().collect::<Vec<_>>().as_slice() {
      [] => infer_base(&node.enum_values, format)?,
      [JsonType::String] => Some(string_type(format)),
      [JsonType::Integer] => Some(integer_type(format)),
      [JsonType::Number] => Some(number_type(format)?),
      [JsonType::Boolean] => Some(RustPrimitive::Bool),
      _ => None,
    };
    let Some(base) = base else {
      return self.compile_primitive(node, path);
    };

    let nullable = node.nullable || node.enum_values.iter().any(Value::is_null);
    let display_names = enum_display_names(node)?;
    let prefix = self.config.always_prefix_enum_values.then(|| path.type_name());

    let mut used = BTreeSet::new();
    let mut values = vec![];
    for (index, literal) in node.enum_values.iter().enumerate() {
      if literal.is_null() {
        continue;
      }
      let display = display_names.get(index).cloned().unwrap_or_else(|| literal_text(literal));
      let mut name = to_rust_variant_name(&display);
      if let Some(prefix) = &prefix {
        name = format!("{prefix}{name}");
      }
      let name = ensure_unique(&name, &used);
      used.insert(name.clone());
      values.push(EnumValue {
        name,
        literal: literal.clone(),
      });
    }

    if values.is_empty() {
      let mut descriptor = TypeDescriptor::new(base);
      descriptor.nullable = nullable;
      return Ok(descriptor);
    }

    let mut descriptor = TypeDescriptor::new(RustType::any()).with_shape(TypeShape::Enum(EnumShape {
      base: RustType::Primitive(base),
      values,
    }));
    descriptor.define_via_alias = false;
    descriptor.nullable = nullable;
    Ok(descriptor)
  }
}

/// Base type of an untyped enum, from its literals. `None` when they disagree.
fn infer_base(literals: &[Value], format: Option<&str>) -> GenerationResult<Option<RustPrimitive>> {
  let literals: Vec<&Value> = literals.iter().filter(|v| !v.is_null()).collect();
  if literals.iter().all(|v| v.is_string()) {
    return Ok(Some(string_type(format)));
  }
  if literals.iter().all(|v| v.is_i64() || v.is_u64()) {
    return Ok(Some(integer_type(format)));
  }
  if literals.iter().all(|v| v.is_number()) {
    return number_type(format).map(Some);
  }
  if literals.iter().all(|v| v.is_boolean()) {
    return Ok(Some(RustPrimitive::Bool));
  }
  Ok(None)
}

fn literal_text(literal: &Value) -> String {
  match literal {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}
