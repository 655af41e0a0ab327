use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::quote;

use super::{
  EmitContext,
  attributes::{
    generate_deprecated_attr, generate_derives, generate_docs, generate_extra_attrs, generate_serde_attrs, ident,
  },
  types::field_type,
};
use crate::generator::{
  compiler::{AdditionalPropertiesShape, Property, Representation, RustPrimitive, RustType, StructShape, TypeDefinition},
  naming::{identifiers::to_rust_field_name, unique::ensure_unique},
};

pub(crate) struct StructGenerator<'a> {
  context: &'a EmitContext<'a>,
}

impl<'a> StructGenerator<'a> {
  pub(crate) fn new(context: &'a EmitContext<'a>) -> Self {
    Self { context }
  }

  pub(crate) fn generate(&self, def: &TypeDefinition, shape: &StructShape) -> TokenStream {
    let name = ident(&def.name);
    let docs = generate_docs(def.descriptor.description.as_deref());
    let vis = self.context.visibility();

    let mut fields: Vec<TokenStream> = shape
      .properties
      .iter()
      .map(|property| self.generate_single_field(&def.name, property))
      .collect();
    let mut used: BTreeSet<String> = shape.properties.iter().map(|p| p.field_name.clone()).collect();
    let flattened = self.generate_flattened_fields(&def.name, shape, &mut used);
    let has_flattened = !flattened.is_empty();
    fields.extend(flattened);

    let mut derives = vec!["Debug", "Clone", "PartialEq", "Serialize", "Deserialize"];
    if self.context.derives_default(&def.name) {
      derives.push("Default");
    }
    let derives = generate_derives(&derives);

    // serde ignores `deny_unknown_fields` next to a flattened field.
    let serde_attrs = match shape.additional_properties {
      AdditionalPropertiesShape::Flag(false) if !has_flattened => generate_serde_attrs(&[quote! { deny_unknown_fields }]),
      _ => quote! {},
    };

    quote! {
      #docs
      #derives
      #serde_attrs
      #vis struct #name {
        #(#fields),*
      }
    }
  }

  /// A named primitive, array or map kept distinct from its target.
  pub(crate) fn generate_newtype(&self, def: &TypeDefinition) -> TokenStream {
    let name = ident(&def.name);
    let docs = generate_docs(def.descriptor.description.as_deref());
    let vis = self.context.visibility();
    let target = field_type(&def.name, &def.descriptor.rust_type, self.context);

    let mut derives = vec!["Debug", "Clone", "PartialEq", "Serialize", "Deserialize"];
    if self.context.has_default(&def.descriptor.rust_type) {
      derives.push("Default");
    }
    let derives = generate_derives(&derives);

    quote! {
      #docs
      #derives
      #[serde(transparent)]
      #vis struct #name(#vis #target);
    }
  }

  fn generate_single_field(&self, owner: &str, property: &Property) -> TokenStream {
    let name = ident(&property.field_name);
    let vis = self.context.visibility();
    let docs = generate_docs(property.description.as_deref());
    let deprecated = generate_deprecated_attr(property.deprecated, property.extensions.deprecated_reason.as_deref());
    let extra_attrs = generate_extra_attrs(&property.extensions.attributes);

    let inner = field_type(owner, &property.descriptor.rust_type, self.context);
    let mut serde = vec![];
    if property.field_name.trim_start_matches("r#") != property.json_name {
      let json_name = &property.json_name;
      serde.push(quote! { rename = #json_name });
    }

    let omit = property.extensions.omit_empty;
    let type_tokens = match self.context.representation(property) {
      Representation::Value => {
        if !property.required && !property.extensions.serde_skip {
          serde.push(quote! { default });
        }
        if omit == Some(true)
          && let Some(check) = empty_check(&property.descriptor.rust_type)
        {
          serde.push(quote! { skip_serializing_if = #check });
        }
        inner
      }
      Representation::Optional => {
        if omit == Some(true) || (!property.required && omit != Some(false)) {
          serde.push(quote! { default, skip_serializing_if = "Option::is_none" });
        }
        quote! { Option<#inner> }
      }
      Representation::NullableWrapper => {
        serde.push(quote! { default });
        if omit == Some(true) || (!property.required && omit != Some(false)) {
          serde.push(quote! { skip_serializing_if = "oas3_typegen_support::Nullable::is_unspecified" });
        }
        quote! { oas3_typegen_support::Nullable<#inner> }
      }
    };
    if property.extensions.serde_skip {
      serde.push(quote! { skip });
    }
    let serde_attrs = generate_serde_attrs(&serde);

    quote! {
      #docs
      #deprecated
      #serde_attrs
      #extra_attrs
      #vis #name: #type_tokens
    }
  }

  /// `allOf` parents, a carried union and additional properties, all flattened.
  fn generate_flattened_fields(&self, owner: &str, shape: &StructShape, used: &mut BTreeSet<String>) -> Vec<TokenStream> {
    let vis = self.context.visibility();
    let mut fields = vec![];

    for carried in shape.embedded.iter().chain(&shape.union) {
      let name = claim_field(&flattened_field_name(carried), used);
      let ty = field_type(owner, carried, self.context);
      fields.push(quote! {
        #[serde(flatten)]
        #vis #name: #ty
      });
    }

    let value_type = match &shape.additional_properties {
      AdditionalPropertiesShape::Flag(true) => Some(RustType::any()),
      typed => typed.value_type().map(|value| value.rust_type.clone()),
    };
    if let Some(value_type) = value_type {
      let name = claim_field("additional_properties", used);
      let map = RustType::Map(Box::new(value_type));
      fields.push(quote! {
        #[serde(flatten)]
        #vis #name: #map
      });
    }
    fields
  }
}

fn claim_field(base_name: &str, used: &mut BTreeSet<String>) -> proc_macro2::Ident {
  let name = ensure_unique(base_name, used);
  used.insert(name.clone());
  ident(&name)
}

/// Snake-case field name for a flattened type, from the last path segment of its spelling.
fn flattened_field_name(rust_type: &RustType) -> String {
  let spelling = rust_type.to_string();
  let last = spelling.rsplit("::").next().unwrap_or(&spelling);
  to_rust_field_name(last)
}

fn empty_check(rust_type: &RustType) -> Option<&'static str> {
  match rust_type {
    RustType::Vec(_) => Some("Vec::is_empty"),
    RustType::Map(_) => Some("std::collections::HashMap::is_empty"),
    RustType::Primitive(RustPrimitive::String) => Some("String::is_empty"),
    _ => None,
  }
}
