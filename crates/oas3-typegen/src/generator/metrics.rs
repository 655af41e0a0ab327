use strum::Display;

use crate::generator::compiler::{TypeDefinition, TypeShape};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub types_generated: usize,
  pub structs_generated: usize,
  pub enums_generated: usize,
  pub unions_generated: usize,
  pub type_aliases_generated: usize,
  pub newtypes_generated: usize,
  pub operations_converted: usize,
  pub webhooks_converted: usize,
  pub operations_filtered: usize,
  pub components_pruned: usize,
  pub prune_rounds: usize,
  pub references_restored: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_definition(&mut self, definition: &TypeDefinition, is_alias: bool) {
    self.types_generated += 1;
    match &definition.descriptor.shape {
      TypeShape::Struct(_) => self.structs_generated += 1,
      TypeShape::Enum(_) => self.enums_generated += 1,
      TypeShape::Union(_) => self.unions_generated += 1,
      TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Map(_) if is_alias => self.type_aliases_generated += 1,
      TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Map(_) => self.newtypes_generated += 1,
    }
  }

  pub fn record_operation(&mut self, is_webhook: bool) {
    self.operations_converted += 1;
    if is_webhook {
      self.webhooks_converted += 1;
    }
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

/// A condition that degraded the output without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "'{path}': reference '{ref_path}' could not be resolved, using serde_json::Value")]
  UnresolvedReference { path: String, ref_path: String },
  #[strum(to_string = "'{path}': array has no item schema, using serde_json::Value")]
  MissingItems { path: String },
  #[strum(to_string = "'{path}': allOf member refers back to itself and was skipped")]
  CompositionCycle { path: String },
  #[strum(to_string = "'{path}': both oneOf and anyOf are present, anyOf was ignored")]
  AnyOfIgnored { path: String },
  #[strum(to_string = "[{operation_id}] parameter '{parameter}' has no JSON content, using String")]
  NonJsonParameter { operation_id: String, parameter: String },
  #[strum(to_string = "[{operation_id}] {message}")]
  OperationSpecific { operation_id: String, message: String },
}

impl GenerationWarning {
  /// Warnings that replaced a type with `serde_json::Value`.
  pub fn is_degraded_type(&self) -> bool {
    matches!(self, Self::UnresolvedReference { .. } | Self::MissingItems { .. })
  }
}
