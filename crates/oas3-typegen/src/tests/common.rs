use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::{
  generator::{
    compiler::{SchemaCompiler, TypeDefinition, TypeDescriptor, TypePath},
    config::GeneratorConfig,
    document::{ArenaBuilder, ComponentKey, DocumentSet, SchemaArena},
    errors::GenerationResult,
    resolver::Resolver,
  },
  utils::{
    dialect,
    spec::{LoadedSpec, into_spec},
  },
};

/// A minimal 3.1 document with `schemas` as its component schemas.
pub(crate) fn test_document(schemas: Value) -> Value {
  json!({
    "openapi": "3.1.0",
    "info": { "title": "Test API", "version": "1.0.0" },
    "paths": {},
    "components": { "schemas": schemas }
  })
}

/// Normalizes `root` the way the loader does and wraps it without external documents.
pub(crate) fn document_set(mut root: Value) -> DocumentSet {
  dialect::normalize(&mut root);
  DocumentSet::new(root, BTreeMap::new())
}

/// Wraps `root` the way [`load_spec`](crate::utils::spec::load_spec) returns a document without
/// external references.
pub(crate) fn loaded_spec(mut root: Value) -> anyhow::Result<LoadedSpec> {
  dialect::normalize(&mut root);
  Ok(LoadedSpec {
    spec: into_spec(root.clone())?,
    document: root,
    externals: BTreeMap::new(),
  })
}

pub(crate) fn lower(documents: &DocumentSet) -> SchemaArena {
  let mut builder = ArenaBuilder::new(documents);
  builder.lower_components();
  builder.finish()
}

/// Runs `f` against a compiler over a document holding `schemas`.
pub(crate) fn with_compiler<R>(
  schemas: Value,
  config: &GeneratorConfig,
  f: impl FnOnce(&mut SchemaCompiler<'_>) -> anyhow::Result<R>,
) -> anyhow::Result<R> {
  let documents = document_set(test_document(schemas));
  let arena = lower(&documents);
  let resolver = Resolver::new(&arena, &config.import_mapping, config.restore_references)?;
  let mut compiler = SchemaCompiler::new(resolver, config);
  f(&mut compiler)
}

/// Compiles component `name` at its definition site.
pub(crate) fn compile_component(compiler: &mut SchemaCompiler<'_>, name: &str) -> GenerationResult<TypeDescriptor> {
  let arena = compiler.resolver().arena();
  let schema_ref = arena.component(&ComponentKey::local(name)).cloned().unwrap_or_default();
  let type_name = compiler
    .resolver()
    .component_type_name(name)
    .unwrap_or(name)
    .to_string();
  compiler.compile(&schema_ref, &TypePath::root(type_name))
}

pub(crate) fn compile(schemas: Value, name: &str) -> anyhow::Result<TypeDescriptor> {
  compile_with(&GeneratorConfig::default(), schemas, name)
}

pub(crate) fn compile_with(config: &GeneratorConfig, schemas: Value, name: &str) -> anyhow::Result<TypeDescriptor> {
  with_compiler(schemas, config, |compiler| Ok(compile_component(compiler, name)?))
}

/// Compiles every component of `schemas` into top-level definitions, in document order.
pub(crate) fn compile_all(config: &GeneratorConfig, schemas: Value) -> anyhow::Result<Vec<TypeDefinition>> {
  let component_names: Vec<String> = schemas
    .as_object()
    .map(|schemas| schemas.keys().cloned().collect())
    .unwrap_or_default();
  with_compiler(schemas, config, |compiler| {
    let mut definitions = vec![];
    for name in &component_names {
      let descriptor = compile_component(compiler, name)?;
      let type_name = compiler.resolver().component_type_name(name).unwrap_or(name).to_string();
      definitions.extend(SchemaCompiler::top_level(type_name, descriptor));
    }
    Ok(definitions)
  })
}

/// Compiles component `name` and returns the error it fails with.
pub(crate) fn compile_error(schemas: Value, name: &str) -> crate::generator::errors::GenerationError {
  let documents = document_set(test_document(schemas));
  let arena = lower(&documents);
  let config = GeneratorConfig::default();
  let resolver = Resolver::new(&arena, &config.import_mapping, config.restore_references).unwrap();
  let mut compiler = SchemaCompiler::new(resolver, &config);
  compile_component(&mut compiler, name).expect_err("compilation should fail")
}

pub(crate) fn find_definition<'d>(definitions: &'d [TypeDefinition], name: &str) -> &'d TypeDefinition {
  definitions
    .iter()
    .find(|d| d.name == name)
    .unwrap_or_else(|| panic!("definition {name} should exist, got {:?}", names(definitions)))
}

pub(crate) fn names(definitions: &[TypeDefinition]) -> Vec<&str> {
  definitions.iter().map(|d| d.name.as_str()).collect()
}
