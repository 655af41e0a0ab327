use thiserror::Error;

use crate::generator::compiler::TypePath;

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Structural failures that abort a generation run.
///
/// Degraded conditions (unresolvable references, missing item schemas) never surface here,
/// they are recorded as [`crate::generator::metrics::GenerationWarning`] instead.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("error generating type for schema '{path}': {source}")]
  AtPath {
    path: String,
    #[source]
    source: Box<GenerationError>,
  },

  #[error("unhandled schema type: {0}")]
  UnhandledSchemaType(String),

  #[error("invalid number format: {0}")]
  InvalidNumberFormat(String),

  #[error("boolean cannot have a format, got '{0}'")]
  InvalidBooleanFormat(String),

  #[error("incompatible property redefinition for '{0}'")]
  IncompatibleProperty(String),

  #[error("additional properties in allOf have incompatible types")]
  IncompatibleAdditionalProperties,

  #[error("ambiguous discriminator mapping: inline variant requires an explicit mapping entry")]
  AmbiguousDiscriminatorMapping,

  #[error("discriminator: not all schemas were mapped ({mapped} of {variants})")]
  UnmappedDiscriminator { mapped: usize, variants: usize },

  #[error("unsupported reference: {0}")]
  UnsupportedReference(String),

  #[error("allOf must contain at least one schema")]
  EmptyComposition,

  #[error("invalid value for extension '{name}': {reason}")]
  InvalidExtension { name: String, reason: String },

  #[error("no unique name available for '{0}' after probing suffixes 2 through 10")]
  NameExhausted(String),

  #[error("duplicate type name '{name}' generated at '{first}' and '{second}'")]
  DuplicateTypeName { name: String, first: String, second: String },
}

impl GenerationError {
  /// Attributes the error to a schema path. The innermost path wins.
  #[must_use]
  pub fn at(self, path: &TypePath) -> Self {
    match self {
      Self::AtPath { .. } => self,
      other => Self::AtPath {
        path: path.to_string(),
        source: Box::new(other),
      },
    }
  }

  /// The error stripped of any path attribution.
  #[must_use]
  pub fn root_cause(&self) -> &GenerationError {
    match self {
      Self::AtPath { source, .. } => source.root_cause(),
      other => other,
    }
  }

  #[must_use]
  pub fn path(&self) -> Option<&str> {
    match self {
      Self::AtPath { path, .. } => Some(path),
      _ => None,
    }
  }
}
