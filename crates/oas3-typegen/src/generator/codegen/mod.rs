//! Rust source for compiled type definitions.

use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use types::TypeFragment;

use crate::generator::{
  compiler::{Property, Representation, RustType, TypeDefinition, TypeShape},
  config::GeneratorConfig,
  schema_graph::{Recursion, TypeGraph},
};

pub mod attributes;
pub mod enums;
pub mod structs;
pub mod type_aliases;
mod types;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  #[default]
  Public,
  Crate,
  File,
}

impl Visibility {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "public" => Some(Visibility::Public),
      "crate" => Some(Visibility::Crate),
      "file" => Some(Visibility::File),
      _ => None,
    }
  }

  pub(crate) fn to_tokens(self) -> TokenStream {
    match self {
      Visibility::Public => quote! { pub },
      Visibility::Crate => quote! { pub(crate) },
      Visibility::File => quote! {},
    }
  }
}

/// Facts about the whole set of definitions that single emitters need.
pub(crate) struct EmitContext<'a> {
  pub(crate) config: &'a GeneratorConfig,
  pub(crate) recursion: Recursion,
  /// Definitions that reach themselves through some reference and so cannot be aliases.
  recursive: BTreeSet<String>,
  /// Definitions without a `Default` implementation.
  non_default: BTreeSet<String>,
}

impl<'a> EmitContext<'a> {
  pub(crate) fn new(definitions: &[TypeDefinition], config: &'a GeneratorConfig) -> Self {
    let graph = TypeGraph::build(definitions);
    let mut context = Self {
      config,
      recursion: graph.recursion(),
      recursive: graph.recursive_types(),
      non_default: BTreeSet::new(),
    };
    context.non_default = context.find_non_default(definitions);
    context
  }

  pub(crate) fn visibility(&self) -> TokenStream {
    self.config.visibility.to_tokens()
  }

  /// Emitted as `type Name = ...`.
  pub(crate) fn is_alias(&self, definition: &TypeDefinition) -> bool {
    definition.is_alias(self.config.old_aliasing) && !self.recursive.contains(&definition.name)
  }

  pub(crate) fn has_default(&self, rust_type: &RustType) -> bool {
    rust_type.named().is_none_or(|name| !self.non_default.contains(name))
  }

  /// How a field is stored. A defaulted value whose type has no `Default` falls back to `Option`.
  pub(crate) fn representation(&self, property: &Property) -> Representation {
    let representation = Representation::of(property, self.config);
    if representation == Representation::Value
      && is_defaulted(property)
      && !self.has_default(&property.descriptor.rust_type)
    {
      return Representation::Optional;
    }
    representation
  }

  pub(crate) fn derives_default(&self, name: &str) -> bool {
    !self.non_default.contains(name)
  }

  /// Discriminated unions have no `Default`, and neither does anything holding one by value.
  fn find_non_default(&self, definitions: &[TypeDefinition]) -> BTreeSet<String> {
    let mut non_default: BTreeSet<String> = definitions
      .iter()
      .filter(|d| matches!(&d.descriptor.shape, TypeShape::Union(u) if u.is_discriminated()))
      .map(|d| d.name.clone())
      .collect();

    loop {
      let lacks = |rust_type: &RustType| rust_type.named().is_some_and(|name| non_default.contains(name));
      let added: Vec<String> = definitions
        .iter()
        .filter(|d| !non_default.contains(&d.name))
        .filter(|d| match &d.descriptor.shape {
          TypeShape::Struct(shape) => {
            shape.properties.iter().any(|p| {
              Representation::of(p, self.config) == Representation::Value
                && !is_defaulted(p)
                && lacks(&p.descriptor.rust_type)
            }) || shape.embedded.iter().any(lacks)
              || shape.union.as_ref().is_some_and(lacks)
          }
          TypeShape::Union(shape) => shape.variants.first().is_none_or(|v| lacks(&v.rust_type)),
          TypeShape::Enum(_) => false,
          TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Map(_) => lacks(&d.descriptor.rust_type),
        })
        .map(|d| d.name.clone())
        .collect();
      if added.is_empty() {
        return non_default;
      }
      non_default.extend(added);
    }
  }
}

/// Deserialized with `#[serde(default)]` when stored by value.
fn is_defaulted(property: &Property) -> bool {
  !property.required || property.extensions.serde_skip
}

/// Tokens for every definition, in the order given.
pub(crate) fn generate(definitions: &[TypeDefinition], config: &GeneratorConfig) -> TokenStream {
  let context = EmitContext::new(definitions, config);
  let types = definitions
    .iter()
    .map(|definition| TypeFragment::new(definition, &context).into_token_stream());

  quote! {
    use serde::{Deserialize, Serialize};

    #(#types)*
  }
}

/// Pretty-prints generated tokens as a source file.
pub(crate) fn format_tokens(tokens: TokenStream) -> anyhow::Result<String> {
  let file: syn::File = syn::parse2(tokens)?;
  Ok(prettyplease::unparse(&file))
}
