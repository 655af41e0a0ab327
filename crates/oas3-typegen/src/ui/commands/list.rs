use std::{collections::BTreeSet, path::Path};

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    config::{GeneratorConfig, OperationFilter},
    filter::operation_summaries,
    orchestrator::Orchestrator,
  },
  ui::{Colors, colors::Role, term_width},
  utils::spec::load_spec,
};

fn new_table(colors: &Colors, headers: &[&str]) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(colors.cell(Role::Label)));
  }
  table.set_header(row);
  table
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let loaded = load_spec(input, true).await?;
  let summaries = operation_summaries(&loaded.document);

  let mut table = new_table(colors, &["OPERATION ID", "METHOD", "PATH", "TAGS"]);
  for summary in &summaries {
    let path = if summary.is_webhook {
      format!("{} (webhook)", summary.path)
    } else {
      summary.path.clone()
    };

    let mut row = Row::new();
    row.add_cell(
      Cell::new(summary.display_id())
        .fg(colors.cell(Role::Value))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(&summary.method)
        .fg(colors.cell(Role::Accent))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(path).fg(colors.cell(Role::Primary)));
    row.add_cell(Cell::new(summary.tags.join(", ")).fg(colors.cell(Role::Info)));
    table.add_row(row);
  }

  println!("{table}");

  Ok(())
}

pub async fn list_schemas(
  input: &Path,
  include_tags: Vec<String>,
  include_operation_ids: Vec<String>,
  colors: &Colors,
) -> anyhow::Result<()> {
  let loaded = load_spec(input, true).await?;
  let filter = OperationFilter::builder()
    .include_tags(include_tags.into_iter().collect::<BTreeSet<_>>())
    .include_operation_ids(include_operation_ids.into_iter().collect::<BTreeSet<_>>())
    .build();
  let config = GeneratorConfig::builder().filter(filter).build();
  let statuses = Orchestrator::new(loaded, config).schema_statuses();

  let mut table = new_table(colors, &["SCHEMA", "STATUS"]);
  for status in &statuses {
    let (label, role) = if status.retained {
      ("kept", Role::Success)
    } else {
      ("pruned", Role::Accent)
    };

    let mut row = Row::new();
    row.add_cell(
      Cell::new(&status.name)
        .fg(colors.cell(Role::Value))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(label).fg(colors.cell(role)));
    table.add_row(row);
  }

  println!("{table}");

  let retained = statuses.iter().filter(|s| s.retained).count();
  println!("{retained} of {} schemas kept", statuses.len());

  Ok(())
}
