use std::collections::{BTreeMap, BTreeSet};

use crate::generator::codegen::Visibility;

/// Tag and operation-id filters applied before pruning.
///
/// Each set is inactive when empty. Exclusions run before inclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct OperationFilter {
  #[builder(default)]
  pub include_tags: BTreeSet<String>,
  #[builder(default)]
  pub exclude_tags: BTreeSet<String>,
  #[builder(default)]
  pub include_operation_ids: BTreeSet<String>,
  #[builder(default)]
  pub exclude_operation_ids: BTreeSet<String>,
}

impl OperationFilter {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.include_tags.is_empty()
      && self.exclude_tags.is_empty()
      && self.include_operation_ids.is_empty()
      && self.exclude_operation_ids.is_empty()
  }
}

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
#[allow(clippy::struct_excessive_bools)]
pub struct GeneratorConfig {
  /// Merge `allOf` members property by property, rejecting any redefinition.
  #[builder(default)]
  pub old_merge_schemas: bool,
  /// Never wrap optional fields in `Option`.
  #[builder(default)]
  pub prefer_skip_optional: bool,
  /// Never wrap optional `Vec`/`HashMap` fields in `Option`.
  #[builder(default)]
  pub prefer_skip_optional_on_containers: bool,
  /// Keep required read-only fields non-optional.
  #[builder(default)]
  pub disable_required_read_only_as_optional: bool,
  /// Honour `x-rust-name-verbatim` field names.
  #[builder(default)]
  pub allow_unexported_field_names: bool,
  /// Prefix every enum variant with its type name.
  #[builder(default)]
  pub always_prefix_enum_values: bool,
  /// Emit component references as newtypes rather than `type` aliases.
  #[builder(default)]
  pub old_aliasing: bool,
  /// Represent nullable fields with `Nullable<T>` instead of `Option<T>`.
  #[builder(default)]
  pub nullable_type: bool,
  /// Keep map-shaped objects as structs with a flattened map field.
  #[builder(default)]
  pub disable_flatten_additional_properties: bool,
  /// Re-associate inlined schemas with the component they were copied from.
  #[builder(default = true)]
  pub restore_references: bool,
  /// Remove components no retained operation or component refers to.
  #[builder(default = true)]
  pub prune: bool,
  #[builder(default)]
  pub filter: OperationFilter,
  /// External document file name to Rust module path.
  #[builder(default)]
  pub import_mapping: BTreeMap<String, String>,
  #[builder(default)]
  pub visibility: Visibility,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}
