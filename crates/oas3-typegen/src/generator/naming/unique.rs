use std::collections::BTreeSet;

/// Highest numeric suffix tried before giving up on a top-level type name.
pub(crate) const MAX_NAME_SUFFIX: u32 = 10;

/// Finds a free name for a top-level type, appending `2` through [`MAX_NAME_SUFFIX`].
///
/// Returns `None` once every suffix collides. The bound is a safety valve against
/// pathological documents, callers turn it into [`GenerationError::NameExhausted`].
///
/// [`GenerationError::NameExhausted`]: crate::generator::errors::GenerationError::NameExhausted
pub(crate) fn unique_name(candidate: &str, existing: &BTreeSet<String>) -> Option<String> {
  if !existing.contains(candidate) {
    return Some(candidate.to_string());
  }
  (2..=MAX_NAME_SUFFIX)
    .map(|suffix| format!("{candidate}{suffix}"))
    .find(|name| !existing.contains(name))
}

/// Unbounded suffixing for names local to one type, such as fields and enum variants.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  (2..)
    .map(|i| format!("{base_name}{i}"))
    .find(|name| !used_names.contains(name))
    .unwrap_or_else(|| base_name.to_string())
}
