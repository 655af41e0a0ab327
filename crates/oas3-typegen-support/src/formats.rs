use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// `format: email`. Carried as text, no validation is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(pub String);

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for Email {
  fn from(value: String) -> Self {
    Self(value)
  }
}

/// `format: byte`, base64 encoded on the wire.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Bytes(#[serde_as(as = "Base64")] pub Vec<u8>);

impl AsRef<[u8]> for Base64Bytes {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

/// `format: binary`, an opaque file payload.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct File(#[serde_as(as = "serde_with::Bytes")] pub Vec<u8>);

impl AsRef<[u8]> for File {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

/// A parameter that accepts either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

impl<T> OneOrMany<T> {
  #[must_use]
  pub fn into_vec(self) -> Vec<T> {
    match self {
      Self::One(v) => vec![v],
      Self::Many(v) => v,
    }
  }
}

impl<T> Default for OneOrMany<T> {
  fn default() -> Self {
    Self::Many(vec![])
  }
}
