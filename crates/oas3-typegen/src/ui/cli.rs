use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-typegen")]
#[command(author, version, about = "Compiles OpenAPI 3.0 and 3.1 schemas into Rust types")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from an OpenAPI document
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate Rust types from an OpenAPI document
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateCommand {
  /// Path to the OpenAPI JSON or YAML document
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Where the generated Rust code is written, stdout when omitted
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Visibility of generated types and fields (public, crate or file)
  #[arg(long, value_name = "VISIBILITY", default_value = "public")]
  pub visibility: String,

  /// Keep only operations carrying one of these tags (comma-separated)
  #[arg(long, value_name = "TAGS", value_delimiter = ',')]
  pub include_tags: Vec<String>,

  /// Drop operations carrying any of these tags (comma-separated)
  #[arg(long, value_name = "TAGS", value_delimiter = ',')]
  pub exclude_tags: Vec<String>,

  /// Keep only these operations (comma-separated operationIds)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub include_operation_ids: Vec<String>,

  /// Drop these operations (comma-separated operationIds)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub exclude_operation_ids: Vec<String>,

  /// Map an external document to the Rust module holding its types (FILE=MODULE, repeatable)
  #[arg(long, value_name = "FILE=MODULE")]
  pub import_mapping: Vec<String>,

  /// Leave references to unreadable external documents unresolved instead of failing
  #[arg(long, default_value_t = false)]
  pub ignore_missing_refs: bool,

  /// Generate every component, including the ones nothing refers to
  #[arg(long, default_value_t = false)]
  pub no_prune: bool,

  /// Do not map inlined copies of component schemas back to the component type
  #[arg(long, default_value_t = false)]
  pub no_restore_references: bool,

  /// Merge allOf members property by property and reject any redefinition
  #[arg(long, default_value_t = false)]
  pub old_merge_schemas: bool,

  /// Never wrap optional fields in Option
  #[arg(long, default_value_t = false)]
  pub prefer_skip_optional: bool,

  /// Never wrap optional Vec and HashMap fields in Option
  #[arg(long, default_value_t = false)]
  pub prefer_skip_optional_on_containers: bool,

  /// Keep required readOnly fields non-optional
  #[arg(long, default_value_t = false)]
  pub disable_required_read_only_as_optional: bool,

  /// Use x-rust-name-verbatim field names as written
  #[arg(long, default_value_t = false)]
  pub allow_unexported_field_names: bool,

  /// Prefix every enum variant with its type name
  #[arg(long, default_value_t = false)]
  pub always_prefix_enum_values: bool,

  /// Emit newtypes where type aliases would be used
  #[arg(long, default_value_t = false)]
  pub old_aliasing: bool,

  /// Represent nullable fields with Nullable<T> instead of Option<T>
  #[arg(long, default_value_t = false)]
  pub nullable_type: bool,

  /// Keep map-shaped objects as structs with a flattened map field
  #[arg(long, default_value_t = false)]
  pub disable_flatten_additional_properties: bool,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every operation with its method, path and tags
  Operations {
    /// Path to the OpenAPI JSON or YAML document
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
  /// List component schemas and whether generation keeps them
  Schemas {
    /// Path to the OpenAPI JSON or YAML document
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Only keep schemas reachable from operations with these tags (comma-separated)
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    include_tags: Vec<String>,

    /// Only keep schemas reachable from these operations (comma-separated operationIds)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    include_operation_ids: Vec<String>,
  },
}
