use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that distinguishes "absent" from an explicit `null`.
///
/// Pair with `#[serde(default, skip_serializing_if = "Nullable::is_unspecified")]` so an
/// unspecified value is omitted while `Null` round-trips as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nullable<T> {
  #[default]
  Unspecified,
  Null,
  Value(T),
}

impl<T> Nullable<T> {
  #[must_use]
  pub const fn is_unspecified(&self) -> bool {
    matches!(self, Self::Unspecified)
  }

  #[must_use]
  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  #[must_use]
  pub const fn as_value(&self) -> Option<&T> {
    match self {
      Self::Value(v) => Some(v),
      Self::Unspecified | Self::Null => None,
    }
  }

  #[must_use]
  pub fn into_option(self) -> Option<T> {
    match self {
      Self::Value(v) => Some(v),
      Self::Unspecified | Self::Null => None,
    }
  }
}

impl<T> From<T> for Nullable<T> {
  fn from(value: T) -> Self {
    Self::Value(value)
  }
}

impl<T> From<Option<T>> for Nullable<T> {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Null, Self::Value)
  }
}

impl<T: Serialize> Serialize for Nullable<T> {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match self {
      Self::Value(v) => serializer.serialize_some(v),
      Self::Unspecified | Self::Null => serializer.serialize_none(),
    }
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<T>::deserialize(deserializer).map(Into::into)
  }
}
