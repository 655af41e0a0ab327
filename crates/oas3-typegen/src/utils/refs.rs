use std::borrow::Cow;

use crate::generator::errors::{GenerationError, GenerationResult};

/// A `$ref` addressing a named entry of a component map, such as `#/components/schemas/Pet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef<'a> {
  /// External document part of the reference, `None` for a local reference.
  pub document: Option<&'a str>,
  pub section: &'a str,
  pub name: String,
}

/// Splits a reference into its document and JSON pointer parts.
///
/// `#/components/schemas/Pet` yields `("", "/components/schemas/Pet")` and
/// `common.yaml#/components/schemas/Pet` yields `("common.yaml", "/components/schemas/Pet")`.
/// A reference with more than one `#` is rejected.
pub fn split_reference(reference: &str) -> GenerationResult<(&str, &str)> {
  let mut parts = reference.split('#');
  let document = parts.next().unwrap_or_default();
  let fragment = parts.next().unwrap_or_default();
  if parts.next().is_some() {
    return Err(GenerationError::UnsupportedReference(reference.to_string()));
  }
  Ok((document, fragment))
}

/// Parses a reference to a component map entry. Returns `None` for any other pointer shape.
#[must_use]
pub fn parse_component_ref(reference: &str) -> Option<ComponentRef<'_>> {
  let (document, fragment) = split_reference(reference).ok()?;
  let rest = fragment.strip_prefix("/components/")?;
  let (section, name) = rest.split_once('/')?;
  if name.is_empty() || name.contains('/') {
    return None;
  }
  Some(ComponentRef {
    document: (!document.is_empty()).then_some(document),
    section,
    name: unescape_pointer_segment(name).into_owned(),
  })
}

/// Qualifies a document-local reference with the remote document it was read from.
///
/// A schema merged out of `common.yaml` that refers to `#/components/schemas/Tag` must keep
/// pointing into `common.yaml` once it is folded into a schema of the root document.
pub fn propagate_remote_ref(reference: &str, remote_document: Option<&str>) -> GenerationResult<String> {
  let (document, _) = split_reference(reference)?;
  match remote_document {
    Some(remote) if document.is_empty() => Ok(format!("{remote}{reference}")),
    _ => Ok(reference.to_string()),
  }
}

#[must_use]
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
  if segment.contains(['~', '/']) {
    Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
  } else {
    Cow::Borrowed(segment)
  }
}

#[must_use]
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
  if segment.contains('~') {
    Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
  } else {
    Cow::Borrowed(segment)
  }
}

/// Records every `$ref` string found in `value`. Reference objects are not descended into.
pub fn collect_refs(value: &serde_json::Value, refs: &mut std::collections::BTreeSet<String>) {
  match value {
    serde_json::Value::Object(map) => {
      if let Some(reference) = map.get("$ref").and_then(serde_json::Value::as_str) {
        refs.insert(reference.to_string());
        return;
      }
      for child in map.values() {
        collect_refs(child, refs);
      }
    }
    serde_json::Value::Array(items) => {
      for item in items {
        collect_refs(item, refs);
      }
    }
    _ => {}
  }
}
