//! Tag and operation-id filtering of the normalized document.

use itertools::Itertools;
use serde_json::Value;

use crate::generator::config::OperationFilter;

/// Keys of a path item that hold operations.
pub const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Top-level maps of path items that carry operations.
pub const OPERATION_SECTIONS: [&str; 2] = ["paths", "webhooks"];

impl OperationFilter {
  /// Whether an operation object survives the filter.
  ///
  /// Exclusions are checked first. An inclusion set, once non-empty, rejects every operation
  /// that does not match it, including operations without an id or tags.
  #[must_use]
  pub fn accepts(&self, operation: &Value) -> bool {
    let tags: Vec<&str> = operation
      .get("tags")
      .and_then(Value::as_array)
      .map(|tags| tags.iter().filter_map(Value::as_str).collect())
      .unwrap_or_default();
    let operation_id = operation.get("operationId").and_then(Value::as_str);

    if tags.iter().any(|tag| self.exclude_tags.contains(*tag)) {
      return false;
    }
    if !self.include_tags.is_empty() && !tags.iter().any(|tag| self.include_tags.contains(*tag)) {
      return false;
    }
    if let Some(id) = operation_id
      && self.exclude_operation_ids.contains(id)
    {
      return false;
    }
    if !self.include_operation_ids.is_empty() && !operation_id.is_some_and(|id| self.include_operation_ids.contains(id)) {
      return false;
    }
    true
  }
}

/// Removes every operation the filter rejects from `paths` and `webhooks`.
///
/// Path items left without any operation are removed as well, so their path-level parameters
/// no longer keep components alive. Returns the number of operations removed.
pub fn filter_operations(document: &mut Value, filter: &OperationFilter) -> usize {
  if filter.is_empty() {
    return 0;
  }

  let mut removed = 0;
  for section in OPERATION_SECTIONS {
    let Some(items) = document.get_mut(section).and_then(Value::as_object_mut) else {
      continue;
    };

    for (path, item) in items.iter_mut() {
      let Some(item) = item.as_object_mut() else {
        continue;
      };
      for method in HTTP_METHODS {
        if let Some(operation) = item.get(method)
          && !filter.accepts(operation)
        {
          tracing::debug!(%path, %method, "operation filtered out");
          item.remove(method);
          removed += 1;
        }
      }
    }

    items.retain(|_, item| has_operations(item));
  }

  removed
}

/// A path item still worth keeping: it has an operation or defers to a referenced path item.
fn has_operations(item: &Value) -> bool {
  item.get("$ref").is_some() || HTTP_METHODS.iter().any(|method| item.get(*method).is_some())
}

/// One operation as shown by `list operations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
  pub operation_id: Option<String>,
  pub method: String,
  pub path: String,
  pub tags: Vec<String>,
  pub is_webhook: bool,
}

impl OperationSummary {
  /// The operation id, or the name its types are derived from when it has none.
  #[must_use]
  pub fn display_id(&self) -> String {
    self.operation_id.clone().unwrap_or_else(|| {
      crate::generator::operations::operation_type_name(None, &self.method.to_lowercase(), &self.path)
    })
  }
}

/// Every operation under `paths` and `webhooks`, sorted by path, then in method order.
#[must_use]
pub fn operation_summaries(document: &Value) -> Vec<OperationSummary> {
  let mut summaries = vec![];
  for section in OPERATION_SECTIONS {
    let Some(items) = document.get(section).and_then(Value::as_object) else {
      continue;
    };
    for (path, item) in items.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
      for method in HTTP_METHODS {
        let Some(operation) = item.get(method) else {
          continue;
        };
        summaries.push(OperationSummary {
          operation_id: operation.get("operationId").and_then(Value::as_str).map(str::to_string),
          method: method.to_uppercase(),
          path: path.clone(),
          tags: operation
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
          is_webhook: section == "webhooks",
        });
      }
    }
  }
  summaries
}
