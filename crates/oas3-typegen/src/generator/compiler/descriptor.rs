use indexmap::IndexMap;
use serde_json::Value;
use strum::Display;

use super::types::RustType;

/// The compiler's output for one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
  pub rust_type: RustType,
  /// Set when the descriptor denotes a named, reusable type rather than an anonymous body.
  pub ref_type: Option<String>,
  pub shape: TypeShape,
  /// Emit as a transparent `type` alias rather than a distinct type.
  pub define_via_alias: bool,
  /// The type has a natural empty value, so optional fields need no `Option` around it.
  pub skip_optional_indirection: bool,
  pub nullable: bool,
  pub description: Option<String>,
  /// Named types discovered while compiling, emitted next to the top-level type.
  pub additional_types: Vec<TypeDefinition>,
}

impl TypeDescriptor {
  #[must_use]
  pub fn new(rust_type: impl Into<RustType>) -> Self {
    Self {
      rust_type: rust_type.into(),
      ref_type: None,
      shape: TypeShape::Primitive,
      define_via_alias: true,
      skip_optional_indirection: false,
      nullable: false,
      description: None,
      additional_types: vec![],
    }
  }

  /// The universal type, used for schemas without type information and for degraded references.
  #[must_use]
  pub fn any() -> Self {
    Self {
      skip_optional_indirection: true,
      ..Self::new(RustType::any())
    }
  }

  /// A use of the named type `name`.
  #[must_use]
  pub fn named(name: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      ref_type: Some(name.clone()),
      ..Self::new(RustType::Named(name))
    }
  }

  #[must_use]
  pub fn with_shape(mut self, shape: TypeShape) -> Self {
    self.shape = shape;
    self
  }

  #[must_use]
  pub fn with_description(mut self, description: Option<String>) -> Self {
    if description.is_some() {
      self.description = description;
    }
    self
  }

  /// Whether the body needs a named type of its own: structs, enums and unions do.
  #[must_use]
  pub fn is_structural(&self) -> bool {
    matches!(self.shape, TypeShape::Struct(_) | TypeShape::Enum(_) | TypeShape::Union(_))
  }

  #[must_use]
  pub fn is_container(&self) -> bool {
    self.rust_type.is_container()
  }

  /// A copy without the auxiliary definitions, for storing inside another definition.
  #[must_use]
  pub fn body(&self) -> Self {
    Self {
      additional_types: vec![],
      ..self.clone()
    }
  }

  pub fn take_additional_types(&mut self) -> Vec<TypeDefinition> {
    std::mem::take(&mut self.additional_types)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
  /// A scalar, a reference to a named type, or a pinned spelling.
  Primitive,
  Array(Box<TypeDescriptor>),
  Map(Box<TypeDescriptor>),
  Struct(StructShape),
  Enum(EnumShape),
  Union(UnionShape),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructShape {
  pub properties: Vec<Property>,
  /// Types embedded through `allOf`, flattened into the struct.
  pub embedded: Vec<RustType>,
  pub additional_properties: AdditionalPropertiesShape,
  /// A union carried next to named properties, as a flattened field of this type.
  pub union: Option<RustType>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AdditionalPropertiesShape {
  #[default]
  None,
  /// `additionalProperties: true` or `false`, recorded without an element type.
  Flag(bool),
  Typed(Box<TypeDescriptor>),
}

impl AdditionalPropertiesShape {
  #[must_use]
  pub fn value_type(&self) -> Option<&TypeDescriptor> {
    match self {
      Self::Typed(value) => Some(value),
      Self::None | Self::Flag(_) => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumShape {
  pub base: RustType,
  pub values: Vec<EnumValue>,
}

impl EnumShape {
  #[must_use]
  pub fn is_string(&self) -> bool {
    self.values.iter().all(|v| v.literal.is_string())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
  /// Display name, already a valid variant identifier.
  pub name: String,
  pub literal: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UnionKind {
  #[strum(to_string = "oneOf")]
  OneOf,
  #[strum(to_string = "anyOf")]
  AnyOf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionShape {
  pub kind: UnionKind,
  pub variants: Vec<UnionVariant>,
  pub discriminator: Option<String>,
  /// Discriminator value to variant type spelling.
  pub mapping: IndexMap<String, String>,
}

impl UnionShape {
  #[must_use]
  pub fn is_discriminated(&self) -> bool {
    self.discriminator.is_some()
  }

  /// Discriminator values that select `variant`.
  pub fn values_for<'a>(&'a self, variant: &'a UnionVariant) -> impl Iterator<Item = &'a str> {
    let spelling = variant.rust_type.to_string();
    self
      .mapping
      .iter()
      .filter(move |(_, target)| **target == spelling)
      .map(|(value, _)| value.as_str())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionVariant {
  pub name: String,
  pub rust_type: RustType,
  pub description: Option<String>,
}

/// One named member of a struct body.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
  pub json_name: String,
  pub field_name: String,
  pub descriptor: TypeDescriptor,
  pub required: bool,
  pub nullable: bool,
  pub read_only: bool,
  pub write_only: bool,
  pub deprecated: bool,
  pub description: Option<String>,
  pub default: Option<Value>,
  pub extensions: PropertyExtensions,
}

impl Property {
  /// Same name, same type spelling and same required flag: safe to absorb when merging.
  #[must_use]
  pub fn same_as(&self, other: &Property) -> bool {
    self.json_name == other.json_name
      && self.descriptor.rust_type == other.descriptor.rust_type
      && self.required == other.required
  }
}

/// Field-level extensions read from a property schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyExtensions {
  /// `x-rust-type-skip-optional`.
  pub skip_optional: Option<bool>,
  /// `x-rust-serde-skip`.
  pub serde_skip: bool,
  /// `x-omitempty`.
  pub omit_empty: Option<bool>,
  /// `x-rust-attrs`.
  pub attributes: Vec<String>,
  /// `x-deprecated-reason`.
  pub deprecated_reason: Option<String>,
  /// `x-order`.
  pub order: Option<i64>,
  /// The field name came from `x-rust-name` and must not be converted.
  pub verbatim_name: bool,
}

/// A named, top-level type to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
  pub name: String,
  /// Dot-joined breadcrumb the type was synthesized from.
  pub json_path: String,
  pub descriptor: TypeDescriptor,
}

impl TypeDefinition {
  /// Emitted as `type Name = ...` rather than as a distinct type.
  #[must_use]
  pub fn is_alias(&self, old_aliasing: bool) -> bool {
    !old_aliasing && self.descriptor.define_via_alias && !self.descriptor.is_structural()
  }
}
