use std::{fmt, sync::Arc};

use crate::generator::naming::identifiers::segments_to_type_name;

/// Breadcrumb of the descent that reached a schema, used to name anonymous nested types.
///
/// Immutable: [`TypePath::child`] returns a new path. The first segment is the name of
/// the top-level type being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
  segments: Arc<[String]>,
}

impl TypePath {
  #[must_use]
  pub fn root(name: impl Into<String>) -> Self {
    Self {
      segments: Arc::from(vec![name.into()]),
    }
  }

  #[must_use]
  pub fn child(&self, segment: impl Into<String>) -> Self {
    let mut segments = self.segments.to_vec();
    segments.push(segment.into());
    Self {
      segments: Arc::from(segments),
    }
  }

  /// Whether this path is the definition site of a top-level type.
  #[must_use]
  pub fn is_root(&self) -> bool {
    self.segments.len() == 1
  }

  #[must_use]
  pub fn root_name(&self) -> &str {
    self.segments.first().map_or("", String::as_str)
  }

  /// `PascalCase` name synthesized from every segment.
  #[must_use]
  pub fn type_name(&self) -> String {
    segments_to_type_name(self.segments.iter().map(String::as_str))
  }
}

impl fmt::Display for TypePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.segments.join("."))
  }
}
