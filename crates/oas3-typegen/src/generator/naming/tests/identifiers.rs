use crate::generator::naming::identifiers::{
  capitalize_words, is_valid_field_name, sanitize, segments_to_type_name, to_rust_const_name, to_rust_field_name,
  to_rust_type_name, to_rust_variant_name,
};

#[test]
fn test_field_names() {
  let cases = [
    ("foo-bar", "foo_bar"),
    ("petType", "pet_type"),
    ("match", "r#match"),
    ("type", "r#type"),
    ("self", "self_"),
    ("123name", "_123name"),
    ("", "_"),
    ("  ", "_"),
    ("-created-date", "negative_created_date"),
    ("-", "_"),
  ];
  for (input, expected) in cases {
    assert_eq!(to_rust_field_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_type_names() {
  let cases = [
    ("pet", "Pet"),
    ("oAuth", "OAuth"),
    ("XMLHttpRequest", "XMLHttpRequest"),
    ("HTTPSConnection", "HTTPSConnection"),
    ("pet_store-item", "PetStoreItem"),
    ("NOT_FORCED", "NotForced"),
    ("ADD", "Add"),
    ("PDF_FILE", "PdfFile"),
    ("123Response", "T123Response"),
    ("-INF", "NegativeInf"),
    ("", "Unnamed"),
    ("  ", "Unnamed"),
    ("Vec", "VecType"),
    ("option", "OptionType"),
    ("Value", "ValueType"),
    ("Self", "SelfType"),
    ("r#type", "TypeType"),
    ("café", "Cafe"),
  ];
  for (input, expected) in cases {
    assert_eq!(to_rust_type_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_segments_to_type_name() {
  let cases: [(&[&str], &str); 5] = [
    (&["Pet", "owner", "address"], "PetOwnerAddress"),
    (&["Pet", "tags", "Item"], "PetTagsItem"),
    (&["Shape", "0"], "Shape0"),
    (&["list-pets", "200", "Response"], "ListPets200Response"),
    (&[], "Unnamed"),
  ];
  for (segments, expected) in cases {
    assert_eq!(
      segments_to_type_name(segments.iter().copied()),
      expected,
      "failed for segments {segments:?}"
    );
  }
}

#[test]
fn test_variant_names() {
  let cases = [
    ("available", "Available"),
    ("in-stock", "InStock"),
    ("", "Empty"),
    ("1", "V1"),
    ("-1", "Negative1"),
    ("Self", "SelfValue"),
  ];
  for (input, expected) in cases {
    assert_eq!(to_rust_variant_name(input), expected, "failed for input {input:?}");
  }
}

#[test]
fn test_const_names() {
  assert_eq!(to_rust_const_name("max-value"), "MAX_VALUE");
  assert_eq!(to_rust_const_name("1"), "N_1");
  assert_eq!(to_rust_const_name(""), "EMPTY");
}

#[test]
fn test_sanitize_and_capitalize() {
  assert_eq!(sanitize("__a--b__"), "a_b");
  assert_eq!(sanitize(""), "");
  assert_eq!(capitalize_words("hello world"), "HelloWorld");
  assert_eq!(capitalize_words("petType"), "PetType");
}

#[test]
fn test_valid_field_names() {
  assert!(is_valid_field_name("pet_id"));
  assert!(is_valid_field_name("r#type"));
  assert!(is_valid_field_name("PetID"));
  assert!(!is_valid_field_name("type"));
  assert!(!is_valid_field_name("pet-id"));
  assert!(!is_valid_field_name("1pet"));
}
