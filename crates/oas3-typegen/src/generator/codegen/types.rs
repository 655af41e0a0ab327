use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use super::{EmitContext, enums, structs::StructGenerator, type_aliases};
use crate::generator::compiler::{RustType, TypeDefinition, TypeShape};

impl ToTokens for RustType {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let spelled = self
      .to_string()
      .parse::<TokenStream>()
      .unwrap_or_else(|_| quote! { serde_json::Value });
    tokens.extend(spelled);
  }
}

/// A field or wrapped type, boxed when it closes a by-value cycle through `owner`.
pub(crate) fn field_type(owner: &str, rust_type: &RustType, context: &EmitContext<'_>) -> TokenStream {
  if context.recursion.needs_box(owner, rust_type) {
    quote! { Box<#rust_type> }
  } else {
    rust_type.to_token_stream()
  }
}

/// One definition, rendered by the emitter for its shape.
pub(crate) struct TypeFragment<'a> {
  definition: &'a TypeDefinition,
  context: &'a EmitContext<'a>,
}

impl<'a> TypeFragment<'a> {
  pub(crate) fn new(definition: &'a TypeDefinition, context: &'a EmitContext<'a>) -> Self {
    Self { definition, context }
  }
}

impl ToTokens for TypeFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let definition = self.definition;
    let ts = match &definition.descriptor.shape {
      TypeShape::Struct(shape) => StructGenerator::new(self.context).generate(definition, shape),
      TypeShape::Enum(shape) => enums::generate_enum(definition, shape, self.context),
      TypeShape::Union(shape) if shape.is_discriminated() => {
        enums::generate_discriminated_union(definition, shape, self.context)
      }
      TypeShape::Union(shape) => enums::generate_union(definition, shape, self.context),
      TypeShape::Primitive | TypeShape::Array(_) | TypeShape::Map(_) => {
        if self.context.is_alias(definition) {
          type_aliases::generate_type_alias(definition, self.context)
        } else {
          StructGenerator::new(self.context).generate_newtype(definition)
        }
      }
    };
    tokens.extend(ts);
  }
}
