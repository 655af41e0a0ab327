
use serde_json::Value;

use crate::{
  generator::{
    codegen::{format_tokens, generate},
    config::GeneratorConfig,
  },
  tests::common::compile_all,
};

/// Compiles every component of `schemas` and renders the emitted module.
fn render_with(config: &GeneratorConfig, schemas: Value) -> anyhow::Result<String> {
  let definitions = compile_all(config, schemas)?;
  format_tokens(generate(&definitions, config))
}

fn render(schemas: Value) -> anyhow::Result<String> {
  render_with(&GeneratorConfig::default(), schemas)
}

/// The derive list directly above the item declared as `declaration`.
fn derives_of<'c>(code: &'c str, declaration: &str) -> &'c str {
  let Some(end) = code.find(declaration) else {
    panic!("{declaration} missing from:\n{code}");
  };
  let start = code[..end].rfind("#[derive(").unwrap_or(end);
  let line_end = code[start..].find('\n').map_or(end, |offset| start + offset);
  &code[start..line_end]
}
