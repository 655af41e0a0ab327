//! Schema-to-type compiler.
//!
//! [`SchemaCompiler::compile`] maps one schema reference to one [`TypeDescriptor`]. Anonymous
//! structs, enums and unions found on the way are named after their [`TypePath`] and returned
//! as auxiliary [`TypeDefinition`]s on the descriptor, never through shared state.

mod descriptor;
mod enums;
pub(crate) mod extensions;
mod legacy_merge;
mod merge;
mod objects;
mod path;
mod primitives;
pub mod representation;
mod types;
mod unions;

use std::collections::HashMap;

pub use descriptor::{
  AdditionalPropertiesShape, EnumShape, EnumValue, Property, PropertyExtensions, StructShape, TypeDefinition,
  TypeDescriptor, TypeShape, UnionKind, UnionShape, UnionVariant,
};
pub(crate) use objects::struct_descriptor;
pub use path::TypePath;
pub use representation::Representation;
pub use types::{RustPrimitive, RustType};

use crate::generator::{
  config::GeneratorConfig,
  document::{JsonType, NodeId, SchemaNode, SchemaRef},
  errors::{GenerationError, GenerationResult},
  metrics::GenerationWarning,
  naming::identifiers::to_rust_type_name,
  resolver::{Resolution, Resolver},
};

/// The first schema to claim an `x-rust-type-name`.
struct PinnedType {
  path: String,
  node: Option<NodeId>,
  body: TypeDescriptor,
}

pub struct SchemaCompiler<'a> {
  resolver: Resolver<'a>,
  config: &'a GeneratorConfig,
  warnings: Vec<GenerationWarning>,
  /// Names pinned by `x-rust-type-name`.
  pinned: HashMap<String, PinnedType>,
  restored: usize,
}

impl<'a> SchemaCompiler<'a> {
  #[must_use]
  pub fn new(resolver: Resolver<'a>, config: &'a GeneratorConfig) -> Self {
    Self {
      resolver,
      config,
      warnings: vec![],
      pinned: HashMap::new(),
      restored: 0,
    }
  }

  #[must_use]
  pub fn resolver(&self) -> &Resolver<'a> {
    &self.resolver
  }

  pub fn resolver_mut(&mut self) -> &mut Resolver<'a> {
    &mut self.resolver
  }

  pub fn warn(&mut self, warning: GenerationWarning) {
    tracing::warn!("{warning}");
    self.warnings.push(warning);
  }

  /// Number of inline schemas replaced by the component they were copied from.
  #[must_use]
  pub fn references_restored(&self) -> usize {
    self.restored
  }

  pub fn take_warnings(&mut self) -> Vec<GenerationWarning> {
    std::mem::take(&mut self.warnings)
  }

  /// Compiles one schema reference. Structural errors carry the path they occurred at.
  pub fn compile(&mut self, schema_ref: &SchemaRef, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    self.compile_ref(schema_ref, path).map_err(|err| err.at(path))
  }

  fn compile_ref(&mut self, schema_ref: &SchemaRef, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    match self.resolver.resolve(schema_ref) {
      Resolution::Absent => Ok(TypeDescriptor::any()),
      Resolution::Unresolved { ref_path } => {
        self.warn(GenerationWarning::UnresolvedReference {
          path: path.to_string(),
          ref_path,
        });
        Ok(TypeDescriptor::any())
      }
      Resolution::Named { rust_type, node } => {
        // The definition site of a component is its body, never `type X = X`.
        if path.is_root()
          && rust_type.named() == Some(path.root_name())
          && let Some((id, node)) = node
        {
          return self.compile_node(node, Some(id), path);
        }
        Ok(self.reference_descriptor(rust_type, node.map(|(_, node)| node)))
      }
      Resolution::Inline { id, node } => self.compile_node(node, Some(id), path),
    }
  }

  /// A use of a named type, carrying what the call site needs to know about its target.
  pub(crate) fn reference_descriptor(&self, rust_type: RustType, target: Option<&SchemaNode>) -> TypeDescriptor {
    let mut descriptor = TypeDescriptor::named(rust_type.to_string());
    descriptor.rust_type = rust_type;
    if let Some(target) = target {
      descriptor.nullable = target.nullable;
      descriptor.description.clone_from(&target.description);
    }
    descriptor
  }

  /// Compiles an inline schema and names it when it needs a type of its own.
  pub(crate) fn compile_node(
    &mut self,
    node: &SchemaNode,
    id: Option<NodeId>,
    path: &TypePath,
  ) -> GenerationResult<TypeDescriptor> {
    if !path.is_root()
      && let Some(rust_type) = self.resolver.restore(id, node)
    {
      tracing::debug!(path = %path, restored = %rust_type, "restored inlined reference");
      self.restored += 1;
      return Ok(self.reference_descriptor(rust_type, Some(node)));
    }

    if let Some(use_site) = self.pinned_use_site(node, id)? {
      return Ok(use_site);
    }

    if let Some(id) = id
      && !self.resolver.enter(id)
    {
      return Ok(self.cycle_stub(node));
    }

    let result = self
      .compile_body(node, path)
      .and_then(|body| self.materialize(body, node, id, path));

    if let Some(id) = id {
      self.resolver.leave(id);
    }
    result
  }

  /// What a schema compiles to when it is reached again while its own compilation is running.
  fn cycle_stub(&self, node: &SchemaNode) -> TypeDescriptor {
    let pinned = node
      .extension(extensions::RUST_TYPE_NAME)
      .and_then(serde_json::Value::as_str)
      .map(|name| RustType::Named(to_rust_type_name(name)));
    let named = pinned.or_else(|| {
      node
        .origin
        .component_name()
        .and_then(|_| self.resolver.type_for_ref("", Some(node)))
    });
    match named {
      Some(rust_type) => self.reference_descriptor(rust_type, None),
      None => TypeDescriptor::any(),
    }
  }

  /// The unnamed body of a schema, in priority order: pinned type, `allOf`, enum, object,
  /// then primitive or array.
  pub(crate) fn compile_body(&mut self, node: &SchemaNode, path: &TypePath) -> GenerationResult<TypeDescriptor> {
    if let Some(verbatim) = extensions::ext_str(node, extensions::RUST_TYPE)? {
      let mut descriptor = TypeDescriptor::new(RustType::Verbatim(verbatim.to_string()));
      descriptor.skip_optional_indirection = extensions::ext_bool(node, extensions::RUST_TYPE_SKIP_OPTIONAL)?.unwrap_or(false);
      descriptor.nullable = node.nullable;
      return Ok(descriptor.with_description(node.description.clone()));
    }

    let mut descriptor = if !node.all_of.is_empty() {
      self.compile_all_of(node, path)?
    } else if !node.enum_values.is_empty() && !node.has_type(&JsonType::Object) {
      self.compile_enum(node, path)?
    } else if objects::is_object_like(node) {
      self.compile_object(node, path)?
    } else {
      self.compile_primitive(node, path)?
    };

    descriptor.nullable |= node.nullable;
    if descriptor.description.is_none() {
      descriptor.description.clone_from(&node.description);
    }
    Ok(descriptor)
  }

  /// A second visit to the schema that pinned its name reuses the first definition.
  fn pinned_use_site(&self, node: &SchemaNode, id: Option<NodeId>) -> GenerationResult<Option<TypeDescriptor>> {
    let Some(name) = extensions::ext_str(node, extensions::RUST_TYPE_NAME)? else {
      return Ok(None);
    };
    let name = to_rust_type_name(name);
    Ok(match self.pinned.get(&name) {
      Some(pinned) if id.is_some() && pinned.node == id => {
        let mut use_site = TypeDescriptor::named(name);
        use_site.nullable = pinned.body.nullable;
        use_site.description.clone_from(&pinned.body.description);
        Some(use_site)
      }
      _ => None,
    })
  }

  /// Gives a structural body its own type, or the name pinned by `x-rust-type-name`.
  fn materialize(
    &mut self,
    body: TypeDescriptor,
    node: &SchemaNode,
    id: Option<NodeId>,
    path: &TypePath,
  ) -> GenerationResult<TypeDescriptor> {
    if let Some(pinned) = extensions::ext_str(node, extensions::RUST_TYPE_NAME)? {
      return self.define_pinned(&to_rust_type_name(pinned), body, id, path);
    }
    if path.is_root() || !body.is_structural() {
      return Ok(body);
    }
    let name = self.resolver.claim_name(&path.type_name())?;
    Ok(Self::define(name, body, path))
  }

  /// The definitions a top-level type compiles to: its auxiliary types, then itself.
  #[must_use]
  pub fn top_level(name: String, mut descriptor: TypeDescriptor) -> Vec<TypeDefinition> {
    let mut definitions = descriptor.take_additional_types();
    if descriptor.is_structural() {
      descriptor.rust_type = RustType::Named(name.clone());
    }
    descriptor.ref_type = Some(name.clone());
    definitions.push(TypeDefinition {
      json_path: name.clone(),
      name,
      descriptor,
    });
    definitions
  }

  /// Registers `body` as an auxiliary definition under `name` and returns its use site.
  pub(crate) fn define(name: String, mut body: TypeDescriptor, path: &TypePath) -> TypeDescriptor {
    let mut additional_types = body.take_additional_types();

    let mut use_site = TypeDescriptor::named(name.clone());
    use_site.nullable = body.nullable;
    use_site.skip_optional_indirection = body.skip_optional_indirection;
    use_site.description.clone_from(&body.description);

    // A pinned primitive keeps its spelling as the alias target.
    if body.is_structural() {
      body.rust_type = RustType::Named(name.clone());
    }
    body.ref_type = Some(name.clone());
    additional_types.push(TypeDefinition {
      name,
      json_path: path.to_string(),
      descriptor: body,
    });

    use_site.additional_types = additional_types;
    use_site
  }

  /// Names a body exactly. A second schema pinning the same name must have the same body.
  fn define_pinned(
    &mut self,
    name: &str,
    body: TypeDescriptor,
    id: Option<NodeId>,
    path: &TypePath,
  ) -> GenerationResult<TypeDescriptor> {
    if let Some(first) = self.pinned.get(name) {
      if first.body == body.body() {
        let mut use_site = TypeDescriptor::named(name);
        use_site.nullable = body.nullable;
        use_site.description = body.description;
        return Ok(use_site);
      }
      return Err(GenerationError::DuplicateTypeName {
        name: name.to_string(),
        first: first.path.clone(),
        second: path.to_string(),
      });
    }

    let is_component_root = path.is_root() && path.root_name() == name;
    if !is_component_root && !self.resolver.claim_exact(name) {
      return Err(GenerationError::DuplicateTypeName {
        name: name.to_string(),
        first: name.to_string(),
        second: path.to_string(),
      });
    }

    self.pinned.insert(
      name.to_string(),
      PinnedType {
        path: path.to_string(),
        node: id,
        body: body.body(),
      },
    );
    if is_component_root {
      return Ok(body);
    }
    Ok(Self::define(name.to_string(), body, path))
  }
}

#[cfg(test)]
mod tests;
