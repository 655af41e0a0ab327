use proc_macro2::TokenStream;
use quote::quote;

use super::{
  EmitContext,
  attributes::{generate_docs, ident},
};
use crate::generator::compiler::TypeDefinition;

pub(crate) fn generate_type_alias(def: &TypeDefinition, context: &EmitContext<'_>) -> TokenStream {
  let name = ident(&def.name);
  let docs = generate_docs(def.descriptor.description.as_deref());
  let vis = context.visibility();
  let target = &def.descriptor.rust_type;

  quote! {
    #docs
    #vis type #name = #target;
  }
}
