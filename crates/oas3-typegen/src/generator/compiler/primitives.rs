use super::{RustPrimitive, RustType, SchemaCompiler, TypeDescriptor, TypePath, TypeShape};
use crate::generator::{
  document::{JsonType, SchemaNode},
  errors::{GenerationError, GenerationResult},
  metrics::GenerationWarning,
};

impl SchemaCompiler<'_> {
  /// Scalars and arrays. A `null` member of the type set only marks the result nullable.
  pub(super) fn compile_primitive(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let concrete: Vec<&JsonType> = node.concrete_types().collect();
    let nullable = node.nullable || node.has_type(&JsonType::Null);

    let json_type = match concrete.as_slice() {
      [] if node.items.is_some() => &JsonType::Array,
      [] => return Ok(TypeDescriptor::any()),
      [single] => *single,
      [a, b] if is_text_and_number(a, b) => {
        let mut descriptor = TypeDescriptor::new(RustPrimitive::F32);
        descriptor.nullable = nullable;
        return Ok(descriptor);
      }
      _ => return Ok(TypeDescriptor::any()),
    };

    let format = node.format.as_deref().filter(|f| !f.is_empty());
    let mut descriptor = match json_type {
      JsonType::Array => self.compile_array(node, path)?,
      JsonType::Integer => TypeDescriptor::new(integer_type(format)),
      JsonType::Number => TypeDescriptor::new(number_type(format)?),
      JsonType::Boolean => match format {
        Some(format) => return Err(GenerationError::InvalidBooleanFormat(format.to_string())),
        None => TypeDescriptor::new(RustPrimitive::Bool),
      },
      JsonType::String => TypeDescriptor::new(string_type(format)),
      JsonType::Null => TypeDescriptor::any(),
      JsonType::Object | JsonType::Other(_) => {
        return Err(GenerationError::UnhandledSchemaType(json_type.to_string()));
      }
    };
    descriptor.nullable |= nullable;
    Ok(descriptor)
  }

  fn compile_array(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    let mut item = match &node.items {
      Some(items) => self.compile(items, &path.child("Item"))?,
      None => {
        self.warn(GenerationWarning::MissingItems { path: path.to_string() });
        TypeDescriptor::any()
      }
    };

    let additional_types = item.take_additional_types();
    let mut descriptor = TypeDescriptor::new(RustType::Vec(Box::new(item.rust_type.clone())));
    descriptor.shape = TypeShape::Array(Box::new(item));
    descriptor.additional_types = additional_types;
    Ok(descriptor)
  }
}

fn is_text_and_number(a: &JsonType, b: &JsonType) -> bool {
  let numeric = |t: &JsonType| matches!(t, JsonType::Number | JsonType::Integer);
  (*a == JsonType::String && numeric(b)) || (numeric(a) && *b == JsonType::String)
}

pub(super) fn integer_type(format: Option<&str>) -> RustPrimitive {
  match format {
    Some("int8") => RustPrimitive::I8,
    Some("int16") => RustPrimitive::I16,
    Some("int32") => RustPrimitive::I32,
    Some("uint8") => RustPrimitive::U8,
    Some("uint16") => RustPrimitive::U16,
    Some("uint32") => RustPrimitive::U32,
    Some("uint64" | "uint") => RustPrimitive::U64,
    _ => RustPrimitive::I64,
  }
}

pub(super) fn number_type(format: Option<&str>) -> GenerationResult<RustPrimitive> {
  match format {
    Some("double") => Ok(RustPrimitive::F64),
    Some("float") | None => Ok(RustPrimitive::F32),
    Some(other) => Err(GenerationError::InvalidNumberFormat(other.to_string())),
  }
}

pub(super) fn string_type(format: Option<&str>) -> RustPrimitive {
  match format {
    Some("byte") => RustPrimitive::Bytes,
    Some("email") => RustPrimitive::Email,
    Some("date") => RustPrimitive::Date,
    Some("date-time") => RustPrimitive::DateTime,
    Some("json") => RustPrimitive::Value,
    Some("uuid") => RustPrimitive::Uuid,
    Some("binary") => RustPrimitive::Binary,
    _ => RustPrimitive::String,
  }
}

/// The spelling of a schema with exactly one scalar type, when its format is valid for it.
pub(super) fn scalar_type(node: &SchemaNode) -> Option<RustPrimitive> {
  let format = node.format.as_deref().filter(|f| !f.is_empty());
  let mut concrete = node.concrete_types();
  let json_type = concrete.next()?;
  if concrete.next().is_some() {
    return None;
  }
  match json_type {
    JsonType::Integer => Some(integer_type(format)),
    JsonType::Number => number_type(format).ok(),
    JsonType::Boolean => format.is_none().then_some(RustPrimitive::Bool),
    JsonType::String => Some(string_type(format)),
    JsonType::Array | JsonType::Object | JsonType::Null | JsonType::Other(_) => None,
  }
}
