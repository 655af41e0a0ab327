//! Orchestration of the OpenAPI to Rust type generation pipeline.
//!
//! The [`Orchestrator`] owns a loaded document and a [`GeneratorConfig`] and runs every stage:
//! operation filtering, component pruning, lowering into the schema arena, compilation of
//! component and operation schemas, and Rust emission.
//!
//! ## Usage
//!
//! ```no_run
//! use oas3_typegen::generator::{config::GeneratorConfig, orchestrator::Orchestrator};
//! use oas3_typegen::utils::spec::load_spec;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let loaded = load_spec("openapi.yaml".as_ref(), false).await?;
//! let orchestrator = Orchestrator::new(loaded, GeneratorConfig::default());
//! let (code, stats) = orchestrator.generate_with_header("openapi.yaml")?;
//!
//! println!("Generated {} types with {} warnings", stats.types_generated, stats.warnings.len());
//! std::fs::write("types.rs", code)?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::{
  generator::{
    codegen,
    compiler::{SchemaCompiler, TypeDefinition, TypePath},
    config::GeneratorConfig,
    document::{ArenaBuilder, DocumentSet},
    errors::GenerationError,
    filter::filter_operations,
    metrics::GenerationStats,
    operations::OperationPlan,
    prune::prune_components,
    resolver::Resolver,
    schema_graph::TypeGraph,
  },
  utils::spec::LoadedSpec,
};

/// Metadata about the OpenAPI document for the generated file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMetadata {
  pub title: String,
  pub version: String,
  pub description: Option<String>,
}

/// Everything the compiler produced for one document, before emission.
#[derive(Debug, Clone, Default)]
pub struct CompiledDocument {
  /// Named types to emit, auxiliary types before the type that introduced them.
  pub definitions: Vec<TypeDefinition>,
  pub stats: GenerationStats,
}

/// A component schema and whether it survives filtering and pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
  pub name: String,
  pub retained: bool,
}

pub struct Orchestrator {
  loaded: LoadedSpec,
  config: GeneratorConfig,
}

impl Orchestrator {
  #[must_use]
  pub fn new(loaded: LoadedSpec, config: GeneratorConfig) -> Self {
    Self { loaded, config }
  }

  #[must_use]
  pub fn metadata(&self) -> CodeMetadata {
    let info = &self.loaded.spec.info;
    CodeMetadata {
      title: info.title.clone(),
      version: info.version.clone(),
      description: info.description.clone(),
    }
  }

  /// The normalized root document after operation filtering and, when configured, pruning.
  fn prepared_document(&self, stats: &mut GenerationStats) -> Value {
    let mut document = self.loaded.document.clone();

    stats.operations_filtered = filter_operations(&mut document, &self.config.filter);
    if stats.operations_filtered > 0 {
      tracing::info!(removed = stats.operations_filtered, "filtered operations");
    }

    if self.config.prune {
      let report = prune_components(&mut document);
      stats.prune_rounds = report.rounds;
      stats.components_pruned = report.removed_count();
      for removed in &report.removed {
        tracing::debug!(component = %removed, "pruned");
      }
    }
    document
  }

  /// Runs every stage up to, but not including, Rust emission.
  ///
  /// The first structural error aborts the run. Degraded conditions are collected as warnings.
  pub fn compile(&self) -> anyhow::Result<CompiledDocument> {
    let mut stats = GenerationStats::default();
    let document = self.prepared_document(&mut stats);
    let documents = DocumentSet::new(document, self.loaded.externals.clone());

    let mut builder = ArenaBuilder::new(&documents);
    builder.lower_components();
    let plan = OperationPlan::collect(&documents.root, &mut builder);
    let arena = builder.finish();
    tracing::debug!(nodes = arena.len(), operations = plan.operation_count(), "lowered schemas");

    let resolver = Resolver::new(&arena, &self.config.import_mapping, self.config.restore_references)?;
    let mut compiler = SchemaCompiler::new(resolver, &self.config);

    let mut definitions = vec![];
    for (name, schema_ref) in arena.local_components() {
      let type_name = compiler
        .resolver()
        .component_type_name(name)
        .unwrap_or(name)
        .to_string();
      let _span = tracing::debug_span!("component", %name).entered();
      let descriptor = compiler
        .compile(schema_ref, &TypePath::root(type_name.clone()))
        .inspect_err(trace_failure)?;
      definitions.extend(SchemaCompiler::top_level(type_name, descriptor));
    }

    let compiled = plan.compile(&mut compiler).inspect_err(trace_failure)?;
    definitions.extend(compiled.definitions);
    for operation in &compiled.operations {
      stats.record_operation(operation.is_webhook);
    }

    stats.references_restored = compiler.references_restored();
    stats.record_warnings(compiler.take_warnings());

    let definitions = dedupe(definitions);
    let graph = TypeGraph::build(&definitions);
    let recursive = graph.recursive_types();
    for definition in &definitions {
      let is_alias = definition.is_alias(self.config.old_aliasing) && !recursive.contains(&definition.name);
      stats.record_definition(definition, is_alias);
    }
    let cycles = graph.cycles();
    for cycle in &cycles {
      tracing::debug!(cycle = %cycle.join(" -> "), "reference cycle");
    }
    stats.record_cycles(cycles);

    Ok(CompiledDocument { definitions, stats })
  }

  /// Generates formatted Rust source without a file header.
  pub fn generate(&self) -> anyhow::Result<(String, GenerationStats)> {
    let compiled = self.compile()?;
    let tokens = codegen::generate(&compiled.definitions, &self.config);
    let code = codegen::format_tokens(tokens)?;
    Ok((code, compiled.stats))
  }

  /// Generates formatted Rust source behind a header naming the document it came from.
  pub fn generate_with_header(&self, source_path: &str) -> anyhow::Result<(String, GenerationStats)> {
    let (code, stats) = self.generate()?;
    let metadata = self.metadata();

    let description = metadata
      .description
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
      .map_or_else(|| String::from("No description provided"), |d| d.replace('\n', "\n//! "));

    let final_code = format!(
      r"//! AUTO-GENERATED CODE - DO NOT EDIT!
//!
//! {}
//! Source: {}
//! Version: {}
//! Generated by `oas3-typegen`
//!
//! {}
#![allow(clippy::large_enum_variant)]

{}",
      metadata.title, source_path, metadata.version, description, code
    );

    Ok((final_code, stats))
  }

  /// Component schemas of the root document, with whether generation keeps them.
  #[must_use]
  pub fn schema_statuses(&self) -> Vec<SchemaStatus> {
    let mut document = self.loaded.document.clone();
    filter_operations(&mut document, &self.config.filter);
    if self.config.prune {
      prune_components(&mut document);
    }

    let retained = schema_names(&document);
    schema_names(&self.loaded.document)
      .into_iter()
      .map(|name| SchemaStatus {
        retained: retained.contains(&name),
        name,
      })
      .collect()
  }
}

fn schema_names(document: &Value) -> BTreeSet<String> {
  document
    .pointer("/components/schemas")
    .and_then(Value::as_object)
    .map(|schemas| schemas.keys().cloned().collect())
    .unwrap_or_default()
}

fn trace_failure(err: &GenerationError) {
  tracing::debug!(path = err.path().unwrap_or("<document>"), cause = %err.root_cause(), "compilation aborted");
}

/// Keeps the first definition of every name. Later copies are identical bodies reached twice.
pub(crate) fn dedupe(definitions: Vec<TypeDefinition>) -> Vec<TypeDefinition> {
  let mut seen: BTreeMap<String, usize> = BTreeMap::new();
  let mut unique: Vec<TypeDefinition> = Vec::with_capacity(definitions.len());
  for definition in definitions {
    match seen.get(&definition.name) {
      Some(&index) => {
        if unique[index].descriptor != definition.descriptor {
          tracing::warn!(
            name = %definition.name,
            path = %definition.json_path,
            "dropping a second definition of the same name"
          );
        }
      }
      None => {
        seen.insert(definition.name.clone(), unique.len());
        unique.push(definition);
      }
    }
  }
  unique
}
