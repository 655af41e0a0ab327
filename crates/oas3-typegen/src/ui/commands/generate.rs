use std::{
  collections::{BTreeMap, BTreeSet},
  path::PathBuf,
};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use num_format::{Locale, ToFormattedString};
use tokio::io::AsyncWriteExt;

use crate::{
  generator::{
    codegen::Visibility,
    config::{GeneratorConfig, OperationFilter},
    metrics::GenerationStats,
    orchestrator::Orchestrator,
  },
  ui::{Colors, GenerateCommand},
  utils::spec::{LoadedSpec, load_spec},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

fn format_count(count: usize) -> String {
  count.to_formatted_string(&Locale::en)
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  /// `None` writes to stdout.
  pub output: Option<PathBuf>,
  pub verbose: bool,
  pub quiet: bool,
  pub ignore_missing_refs: bool,
  pub generator: GeneratorConfig,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      visibility,
      include_tags,
      exclude_tags,
      include_operation_ids,
      exclude_operation_ids,
      import_mapping,
      ignore_missing_refs,
      no_prune,
      no_restore_references,
      old_merge_schemas,
      prefer_skip_optional,
      prefer_skip_optional_on_containers,
      disable_required_read_only_as_optional,
      allow_unexported_field_names,
      always_prefix_enum_values,
      old_aliasing,
      nullable_type,
      disable_flatten_additional_properties,
      verbose,
      quiet,
    } = command;

    let visibility = Visibility::parse(&visibility)
      .ok_or_else(|| anyhow::anyhow!("Invalid visibility '{visibility}': expected public, crate or file"))?;

    let filter = OperationFilter::builder()
      .include_tags(into_set(include_tags))
      .exclude_tags(into_set(exclude_tags))
      .include_operation_ids(into_set(include_operation_ids))
      .exclude_operation_ids(into_set(exclude_operation_ids))
      .build();

    let generator = GeneratorConfig::builder()
      .old_merge_schemas(old_merge_schemas)
      .prefer_skip_optional(prefer_skip_optional)
      .prefer_skip_optional_on_containers(prefer_skip_optional_on_containers)
      .disable_required_read_only_as_optional(disable_required_read_only_as_optional)
      .allow_unexported_field_names(allow_unexported_field_names)
      .always_prefix_enum_values(always_prefix_enum_values)
      .old_aliasing(old_aliasing)
      .nullable_type(nullable_type)
      .disable_flatten_additional_properties(disable_flatten_additional_properties)
      .restore_references(!no_restore_references)
      .prune(!no_prune)
      .filter(filter)
      .import_mapping(parse_import_mapping(import_mapping)?)
      .visibility(visibility)
      .build();

    Ok(Self {
      input,
      // Progress lines would end up in the generated code.
      quiet: quiet || output.is_none(),
      output,
      verbose,
      ignore_missing_refs,
      generator,
    })
  }

  async fn load_spec(&self) -> anyhow::Result<LoadedSpec> {
    load_spec(&self.input, self.ignore_missing_refs).await
  }

  async fn write_output(&self, code: String) -> anyhow::Result<()> {
    match &self.output {
      Some(output) => {
        if let Some(parent) = output.parent() {
          tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, code).await?;
      }
      None => {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(code.as_bytes()).await?;
        stdout.flush().await?;
      }
    }
    Ok(())
  }
}

fn into_set(values: Vec<String>) -> BTreeSet<String> {
  values.into_iter().filter(|v| !v.is_empty()).collect()
}

fn parse_import_mapping(entries: Vec<String>) -> anyhow::Result<BTreeMap<String, String>> {
  let mut map = BTreeMap::new();
  for entry in entries {
    let (file, module) = entry.split_once('=').ok_or_else(|| {
      anyhow::anyhow!("Invalid import mapping '{entry}': expected FILE=MODULE (e.g., common.yaml=crate::common)")
    })?;
    map.insert(file.to_string(), module.to_string());
  }
  Ok(map)
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI document from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self) {
    self.info(&"Generating Rust types...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Types generated:", format_count(stats.types_generated));
    self.stat("", format!("{} structs", format_count(stats.structs_generated)));
    self.stat("", format!("{} enums", format_count(stats.enums_generated)));
    self.stat("", format!("{} unions", format_count(stats.unions_generated)));
    self.stat("", format!("{} type aliases", format_count(stats.type_aliases_generated)));
    if stats.newtypes_generated > 0 {
      self.stat("", format!("{} newtypes", format_count(stats.newtypes_generated)));
    }
    self.stat("Operations converted:", format_count(stats.operations_converted));
    if stats.webhooks_converted > 0 {
      self.stat("", format!("{} webhooks", format_count(stats.webhooks_converted)));
    }
    if stats.operations_filtered > 0 {
      self.stat("Operations filtered:", format_count(stats.operations_filtered));
    }
    if stats.components_pruned > 0 {
      self.stat(
        "Components pruned:",
        format!(
          "{} in {} rounds",
          format_count(stats.components_pruned),
          stats.prune_rounds
        ),
      );
    }
    if stats.references_restored > 0 && self.config.verbose {
      self.stat("References restored:", format_count(stats.references_restored));
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", format_count(stats.warnings.len()));
    }

    self.print_cycles(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        );
      }
    }
  }

  /// Degraded types are always reported on stderr, everything else only when verbose.
  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_degraded_type() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        eprintln!();
        printed_header = true;
      }

      let label = if warning.is_degraded_type() { "Degraded:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        format!("{warning}").with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    if let Some(output) = &self.config.output {
      self.info(
        &format!("Writing to: {}", output.display())
          .with(self.colors.primary())
          .to_string(),
      );
    }
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated Rust types".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let loaded = config.load_spec().await?;

  logger.log_generating();
  let orchestrator = Orchestrator::new(loaded, config.generator.clone());
  let source_path = config.input.display().to_string();
  let (code, stats) = orchestrator.generate_with_header(&source_path)?;
  tracing::info!(
    types = stats.types_generated,
    warnings = stats.warnings.len(),
    "generation finished"
  );

  logger.print_statistics(&stats);
  logger.print_warnings(&stats);
  logger.log_writing();
  config.write_output(code).await?;

  logger.log_success();
  Ok(())
}
