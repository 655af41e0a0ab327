//! Typed access to the `x-` extensions the compiler understands.

use serde_json::Value;

use super::descriptor::PropertyExtensions;
use crate::generator::{
  document::SchemaNode,
  errors::{GenerationError, GenerationResult},
};

pub(crate) const RUST_TYPE: &str = "x-rust-type";
pub(crate) const RUST_TYPE_NAME: &str = "x-rust-type-name";
pub(crate) const RUST_TYPE_SKIP_OPTIONAL: &str = "x-rust-type-skip-optional";
pub(crate) const RUST_NAME: &str = "x-rust-name";
pub(crate) const RUST_NAME_VERBATIM: &str = "x-rust-name-verbatim";
pub(crate) const RUST_SERDE_SKIP: &str = "x-rust-serde-skip";
pub(crate) const RUST_ATTRS: &str = "x-rust-attrs";
pub(crate) const OMIT_EMPTY: &str = "x-omitempty";
pub(crate) const ENUM_VARNAMES: &str = "x-enum-varnames";
pub(crate) const ENUM_NAMES: &str = "x-enumNames";
pub(crate) const DEPRECATED_REASON: &str = "x-deprecated-reason";
pub(crate) const ORDER: &str = "x-order";

fn invalid(name: &str, reason: &str) -> GenerationError {
  GenerationError::InvalidExtension {
    name: name.to_string(),
    reason: reason.to_string(),
  }
}

pub(crate) fn ext_str<'n>(node: &'n SchemaNode, name: &str) -> GenerationResult<Option<&'n str>> {
  match node.extension(name) {
    None => Ok(None),
    Some(Value::String(value)) => Ok(Some(value)),
    Some(_) => Err(invalid(name, "expected a string")),
  }
}

pub(crate) fn ext_bool(node: &SchemaNode, name: &str) -> GenerationResult<Option<bool>> {
  match node.extension(name) {
    None => Ok(None),
    Some(Value::Bool(value)) => Ok(Some(*value)),
    Some(_) => Err(invalid(name, "expected a boolean")),
  }
}

pub(crate) fn ext_i64(node: &SchemaNode, name: &str) -> GenerationResult<Option<i64>> {
  match node.extension(name) {
    None => Ok(None),
    Some(value) => value.as_i64().map(Some).ok_or_else(|| invalid(name, "expected an integer")),
  }
}

pub(crate) fn ext_string_list(node: &SchemaNode, name: &str) -> GenerationResult<Option<Vec<String>>> {
  let Some(value) = node.extension(name) else {
    return Ok(None);
  };
  let Value::Array(items) = value else {
    return Err(invalid(name, "expected a list of strings"));
  };
  items
    .iter()
    .map(|item| item.as_str().map(str::to_string))
    .collect::<Option<Vec<_>>>()
    .map(Some)
    .ok_or_else(|| invalid(name, "expected a list of strings"))
}

/// Display names for enum values: `x-enum-varnames`, else `x-enumNames`.
pub(crate) fn enum_display_names(node: &SchemaNode) -> GenerationResult<Vec<String>> {
  Ok(match ext_string_list(node, ENUM_VARNAMES)? {
    Some(names) => names,
    None => ext_string_list(node, ENUM_NAMES)?.unwrap_or_default(),
  })
}

impl PropertyExtensions {
  pub(crate) fn from_node(node: &SchemaNode) -> GenerationResult<Self> {
    Ok(Self {
      skip_optional: ext_bool(node, RUST_TYPE_SKIP_OPTIONAL)?,
      serde_skip: ext_bool(node, RUST_SERDE_SKIP)?.unwrap_or(false),
      omit_empty: ext_bool(node, OMIT_EMPTY)?,
      attributes: ext_string_list(node, RUST_ATTRS)?.unwrap_or_default(),
      deprecated_reason: ext_str(node, DEPRECATED_REASON)?.map(str::to_string),
      order: ext_i64(node, ORDER)?,
      verbatim_name: false,
    })
  }
}
