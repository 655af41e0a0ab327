//! How an optional or nullable field is represented.

use super::Property;
use crate::generator::config::GeneratorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
  /// `T`, defaulted when absent if the field is not required.
  Value,
  /// `Option<T>`.
  Optional,
  /// `Nullable<T>`, which keeps "absent" and "null" apart.
  NullableWrapper,
}

/// Inputs of the representation choice for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PropertyTraits {
  pub required: bool,
  pub nullable: bool,
  pub read_only: bool,
  pub write_only: bool,
  /// `Vec` or `HashMap`.
  pub container: bool,
  /// `x-rust-type-skip-optional`.
  pub skip_override: Option<bool>,
  /// The type has an empty value of its own, such as `serde_json::Value::Null`.
  pub natural_empty: bool,
}

impl PropertyTraits {
  #[must_use]
  pub fn of(property: &Property) -> Self {
    Self {
      required: property.required,
      nullable: property.nullable,
      read_only: property.read_only,
      write_only: property.write_only,
      container: property.descriptor.is_container(),
      skip_override: property.extensions.skip_optional.or_else(|| {
        let descriptor = &property.descriptor;
        (descriptor.skip_optional_indirection && !descriptor.rust_type.is_any()).then_some(true)
      }),
      natural_empty: property.descriptor.rust_type.is_any(),
    }
  }
}

impl Representation {
  #[must_use]
  pub fn resolve(traits: PropertyTraits, config: &GeneratorConfig) -> Self {
    if traits.nullable && config.nullable_type {
      return Self::NullableWrapper;
    }

    let skip = traits.skip_override.unwrap_or_else(|| {
      config.prefer_skip_optional
        || (traits.container && config.prefer_skip_optional_on_containers)
        || traits.natural_empty
    });
    if skip {
      return Self::Value;
    }

    let read_only_optional =
      traits.read_only && (!traits.required || !config.disable_required_read_only_as_optional);
    if !traits.required || traits.nullable || read_only_optional || traits.write_only {
      Self::Optional
    } else {
      Self::Value
    }
  }

  #[must_use]
  pub fn of(property: &Property, config: &GeneratorConfig) -> Self {
    Self::resolve(PropertyTraits::of(property), config)
  }
}
