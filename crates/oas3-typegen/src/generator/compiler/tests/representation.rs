use crate::generator::{
  compiler::{Representation, representation::PropertyTraits},
  config::GeneratorConfig,
};

fn resolve(traits: PropertyTraits) -> Representation {
  Representation::resolve(traits, &GeneratorConfig::default())
}

#[test]
fn test_required_field_is_a_plain_value() {
  let traits = PropertyTraits {
    required: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Value);
}

#[test]
fn test_optional_field_is_wrapped() {
  assert_eq!(resolve(PropertyTraits::default()), Representation::Optional);
}

#[test]
fn test_required_nullable_field_is_wrapped() {
  let traits = PropertyTraits {
    required: true,
    nullable: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Optional);

  let config = GeneratorConfig::builder().nullable_type(true).build();
  assert_eq!(
    Representation::resolve(traits, &config),
    Representation::NullableWrapper,
    "nullable_type keeps null apart from absent"
  );
}

#[test]
fn test_nullable_wrapper_wins_over_skip_preferences() {
  let config = GeneratorConfig::builder()
    .nullable_type(true)
    .prefer_skip_optional(true)
    .build();
  let traits = PropertyTraits {
    nullable: true,
    ..PropertyTraits::default()
  };
  assert_eq!(Representation::resolve(traits, &config), Representation::NullableWrapper);
}

#[test]
fn test_prefer_skip_optional_drops_the_wrapper() {
  let config = GeneratorConfig::builder().prefer_skip_optional(true).build();
  assert_eq!(
    Representation::resolve(PropertyTraits::default(), &config),
    Representation::Value
  );
}

#[test]
fn test_containers_skip_only_when_configured() {
  let traits = PropertyTraits {
    container: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Optional);

  let config = GeneratorConfig::builder().prefer_skip_optional_on_containers(true).build();
  assert_eq!(Representation::resolve(traits, &config), Representation::Value);
  assert_eq!(
    Representation::resolve(PropertyTraits::default(), &config),
    Representation::Optional,
    "non-container fields are unaffected"
  );
}

#[test]
fn test_read_only_required_field_becomes_optional() {
  let traits = PropertyTraits {
    required: true,
    read_only: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Optional);

  let config = GeneratorConfig::builder().disable_required_read_only_as_optional(true).build();
  assert_eq!(Representation::resolve(traits, &config), Representation::Value);
}

#[test]
fn test_write_only_field_is_always_optional() {
  let traits = PropertyTraits {
    required: true,
    write_only: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Optional);
}

#[test]
fn test_natural_empty_type_needs_no_wrapper() {
  let traits = PropertyTraits {
    natural_empty: true,
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(traits), Representation::Value);
}

#[test]
fn test_explicit_override_beats_configuration() {
  let forced = PropertyTraits {
    skip_override: Some(true),
    ..PropertyTraits::default()
  };
  assert_eq!(resolve(forced), Representation::Value);

  let config = GeneratorConfig::builder().prefer_skip_optional(true).build();
  let kept = PropertyTraits {
    skip_override: Some(false),
    ..PropertyTraits::default()
  };
  assert_eq!(Representation::resolve(kept, &config), Representation::Optional);
}
