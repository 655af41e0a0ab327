#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::ui::{Cli, Colors, Commands, ListCommands, colors};

mod generator;
mod ui;
mod utils;

#[cfg(test)]
mod tests;

/// Logs go to stderr so generated code can be piped from stdout. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "oas3_typegen=debug" } else { "oas3_typegen=warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { list_command } => {
      init_tracing(false);
      match list_command {
        ListCommands::Operations { input } => ui::commands::list_operations(&input, &colors).await?,
        ListCommands::Schemas {
          input,
          include_tags,
          include_operation_ids,
        } => ui::commands::list_schemas(&input, include_tags, include_operation_ids, &colors).await?,
      }
    }
    Commands::Generate(command) => {
      init_tracing(command.verbose);
      let config = ui::commands::GenerateConfig::from_command(command)?;
      ui::commands::generate_code(config, &colors).await?;
    }
  }

  Ok(())
}
