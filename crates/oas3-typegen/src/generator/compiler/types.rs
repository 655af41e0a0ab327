use std::fmt;

use strum::Display;

/// Scalar and library types a schema can compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RustPrimitive {
  #[strum(to_string = "i8")]
  I8,
  #[strum(to_string = "i16")]
  I16,
  #[strum(to_string = "i32")]
  I32,
  #[strum(to_string = "i64")]
  I64,
  #[strum(to_string = "u8")]
  U8,
  #[strum(to_string = "u16")]
  U16,
  #[strum(to_string = "u32")]
  U32,
  #[strum(to_string = "u64")]
  U64,
  #[strum(to_string = "f32")]
  F32,
  #[strum(to_string = "f64")]
  F64,
  #[strum(to_string = "bool")]
  Bool,
  #[strum(to_string = "String")]
  String,
  #[strum(to_string = "oas3_typegen_support::Base64Bytes")]
  Bytes,
  #[strum(to_string = "oas3_typegen_support::File")]
  Binary,
  #[strum(to_string = "oas3_typegen_support::Email")]
  Email,
  #[strum(to_string = "chrono::NaiveDate")]
  Date,
  #[strum(to_string = "chrono::DateTime<chrono::Utc>")]
  DateTime,
  #[strum(to_string = "uuid::Uuid")]
  Uuid,
  #[strum(to_string = "serde_json::Value")]
  Value,
}

/// The spelling of a compiled type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RustType {
  Primitive(RustPrimitive),
  Vec(Box<RustType>),
  /// `HashMap<String, T>`.
  Map(Box<RustType>),
  /// A generated type, possibly qualified with a module path for external documents.
  Named(String),
  /// Spelling pinned by `x-rust-type`.
  Verbatim(String),
}

impl RustType {
  #[must_use]
  pub fn any() -> Self {
    Self::Primitive(RustPrimitive::Value)
  }

  #[must_use]
  pub fn string() -> Self {
    Self::Primitive(RustPrimitive::String)
  }

  #[must_use]
  pub fn is_any(&self) -> bool {
    matches!(self, Self::Primitive(RustPrimitive::Value))
  }

  #[must_use]
  pub fn is_container(&self) -> bool {
    matches!(self, Self::Vec(_) | Self::Map(_))
  }

  /// Name of the generated type this spelling refers to directly, ignoring containers.
  #[must_use]
  pub fn named(&self) -> Option<&str> {
    match self {
      Self::Named(name) => Some(name),
      _ => None,
    }
  }

  /// Every generated type mentioned anywhere in the spelling.
  pub fn named_types(&self) -> Vec<&str> {
    match self {
      Self::Named(name) => vec![name.as_str()],
      Self::Vec(inner) | Self::Map(inner) => inner.named_types(),
      Self::Primitive(_) | Self::Verbatim(_) => vec![],
    }
  }
}

impl From<RustPrimitive> for RustType {
  fn from(primitive: RustPrimitive) -> Self {
    Self::Primitive(primitive)
  }
}

impl fmt::Display for RustType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Primitive(primitive) => write!(f, "{primitive}"),
      Self::Vec(inner) => write!(f, "Vec<{inner}>"),
      Self::Map(inner) => write!(f, "std::collections::HashMap<String, {inner}>"),
      Self::Named(name) | Self::Verbatim(name) => f.write_str(name),
    }
  }
}
