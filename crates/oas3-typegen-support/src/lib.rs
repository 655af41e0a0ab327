mod formats;
mod nullable;

pub use formats::{Base64Bytes, Email, File, OneOrMany};
pub use nullable::Nullable;
pub use serde_with::skip_serializing_none;

/// Declares an enum whose variant is selected by the string value of a discriminator property.
///
/// Each variant lists every discriminator value that maps to it, so several values may share
/// one payload type. Serialization is transparent to the payload.
///
/// ```ignore
/// discriminated_enum! {
///   pub enum Pet {
///     discriminator: "petType",
///     variants: [
///       Cat(Cat) => ["cat", "Cat"],
///       Dog(Dog) => ["dog"],
///     ],
///   }
/// }
/// ```
#[macro_export]
macro_rules! discriminated_enum {
  (
    $(#[$meta:meta])*
    $vis:vis enum $name:ident {
      discriminator: $disc_field:literal,
      variants: [
        $($variant:ident($variant_type:ty) => [$($disc_value:literal),+ $(,)?]),* $(,)?
      ] $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq)]
    $vis enum $name {
      $($variant($variant_type),)*
    }

    impl $name {
      $vis const DISCRIMINATOR_FIELD: &'static str = $disc_field;

      #[must_use]
      $vis fn discriminator_values(&self) -> &'static [&'static str] {
        match self {
          $(Self::$variant(_) => &[$($disc_value),+],)*
        }
      }
    }

    impl serde::Serialize for $name {
      fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
      where
        S: serde::Serializer,
      {
        match self {
          $(Self::$variant(v) => v.serialize(serializer),)*
        }
      }
    }

    impl<'de> serde::Deserialize<'de> for $name {
      fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
      where
        D: serde::Deserializer<'de>,
      {
        let value = serde_json::Value::deserialize(deserializer)?;

        match value.get(Self::DISCRIMINATOR_FIELD).and_then(|v| v.as_str()) {
          $(
            Some($($disc_value)|+) =>
              serde_json::from_value(value)
                .map(Self::$variant)
                .map_err(serde::de::Error::custom),
          )*
          None => Err(serde::de::Error::missing_field(Self::DISCRIMINATOR_FIELD)),
          Some(other) => Err(serde::de::Error::custom(format!(
            "Unknown discriminator value '{}' for field '{}'",
            other, Self::DISCRIMINATOR_FIELD
          ))),
        }
      }
    }
  };
}
