use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use serde_json::Value;

use super::{
  EmitContext,
  attributes::{generate_derives, generate_docs, generate_serde_attrs, ident},
  types::field_type,
};
use crate::generator::{
  compiler::{EnumShape, RustPrimitive, RustType, TypeDefinition, UnionShape},
  naming::identifiers::to_rust_const_name,
};

pub(crate) fn generate_enum(def: &TypeDefinition, shape: &EnumShape, context: &EmitContext<'_>) -> TokenStream {
  if shape.is_string() {
    generate_string_enum(def, shape, context)
  } else {
    generate_literal_newtype(def, shape, context)
  }
}

fn generate_string_enum(def: &TypeDefinition, shape: &EnumShape, context: &EmitContext<'_>) -> TokenStream {
  let name = ident(&def.name);
  let docs = generate_docs(def.descriptor.description.as_deref());
  let vis = context.visibility();
  let derives = generate_derives(&[
    "Debug",
    "Clone",
    "Copy",
    "PartialEq",
    "Eq",
    "Hash",
    "Serialize",
    "Deserialize",
    "Default",
  ]);

  let variants = shape.values.iter().enumerate().map(|(index, value)| {
    let variant = format_ident!("{}", value.name);
    let default_attr = (index == 0).then(|| quote! { #[default] });
    let literal = value.literal.as_str().unwrap_or_default();
    let serde_attrs = if literal == value.name {
      quote! {}
    } else {
      generate_serde_attrs(&[quote! { rename = #literal }])
    };
    quote! {
      #default_attr
      #serde_attrs
      #variant
    }
  });

  quote! {
    #docs
    #derives
    #vis enum #name {
      #(#variants),*
    }
  }
}

/// Integer, number or boolean enums: a transparent wrapper with one constant per allowed value.
fn generate_literal_newtype(def: &TypeDefinition, shape: &EnumShape, context: &EmitContext<'_>) -> TokenStream {
  let name = ident(&def.name);
  let docs = generate_docs(def.descriptor.description.as_deref());
  let vis = context.visibility();
  let base = &shape.base;

  let mut derives = vec!["Debug", "Clone"];
  if is_copy(base) {
    derives.push("Copy");
  }
  derives.extend(["PartialEq", "Serialize", "Deserialize", "Default"]);
  let derives = generate_derives(&derives);

  let constants: Vec<TokenStream> = shape
    .values
    .iter()
    .filter_map(|value| {
      let literal = const_literal(&value.literal, base)?;
      let constant = format_ident!("{}", to_rust_const_name(&value.name));
      Some(quote! { #vis const #constant: Self = Self(#literal); })
    })
    .collect();
  let impl_block = if constants.is_empty() {
    quote! {}
  } else {
    quote! {
      impl #name {
        #(#constants)*
      }
    }
  };

  quote! {
    #docs
    #derives
    #[serde(transparent)]
    #vis struct #name(#vis #base);

    #impl_block
  }
}

fn is_copy(base: &RustType) -> bool {
  matches!(base, RustType::Primitive(primitive) if !matches!(
    primitive,
    RustPrimitive::String
      | RustPrimitive::Email
      | RustPrimitive::Bytes
      | RustPrimitive::Binary
      | RustPrimitive::Value
  ))
}

fn const_literal(literal: &Value, base: &RustType) -> Option<TokenStream> {
  let RustType::Primitive(primitive) = base else {
    return None;
  };
  let token = match (primitive, literal) {
    (RustPrimitive::Bool, Value::Bool(flag)) => return Some(quote! { #flag }),
    (RustPrimitive::F32, Value::Number(n)) => Literal::f32_unsuffixed(n.as_f64()? as f32),
    (RustPrimitive::F64, Value::Number(n)) => Literal::f64_unsuffixed(n.as_f64()?),
    (
      RustPrimitive::I8 | RustPrimitive::I16 | RustPrimitive::I32 | RustPrimitive::I64,
      Value::Number(n),
    ) => Literal::i64_unsuffixed(n.as_i64()?),
    (
      RustPrimitive::U8 | RustPrimitive::U16 | RustPrimitive::U32 | RustPrimitive::U64,
      Value::Number(n),
    ) => Literal::u64_unsuffixed(n.as_u64()?),
    _ => return None,
  };
  Some(quote! { #token })
}

/// `oneOf`/`anyOf` without a discriminator: variants tried in order.
pub(crate) fn generate_union(def: &TypeDefinition, shape: &UnionShape, context: &EmitContext<'_>) -> TokenStream {
  let name = ident(&def.name);
  let docs = generate_docs(def.descriptor.description.as_deref());
  let vis = context.visibility();
  let derives = generate_derives(&["Debug", "Clone", "PartialEq", "Serialize", "Deserialize"]);

  let variants = shape.variants.iter().map(|variant| {
    let variant_name = format_ident!("{}", variant.name);
    let variant_docs = generate_docs(variant.description.as_deref());
    let ty = field_type(&def.name, &variant.rust_type, context);
    quote! {
      #variant_docs
      #variant_name(#ty)
    }
  });

  let default_impl = match shape.variants.first() {
    Some(first) if context.derives_default(&def.name) && context.has_default(&first.rust_type) => {
      let first_name = format_ident!("{}", first.name);
      quote! {
        impl Default for #name {
          fn default() -> Self {
            Self::#first_name(Default::default())
          }
        }
      }
    }
    _ => quote! {},
  };

  quote! {
    #docs
    #derives
    #[serde(untagged)]
    #vis enum #name {
      #(#variants),*
    }

    #default_impl
  }
}

/// A union selected by a discriminator property, through the support crate's macro.
pub(crate) fn generate_discriminated_union(
  def: &TypeDefinition,
  shape: &UnionShape,
  context: &EmitContext<'_>,
) -> TokenStream {
  let name = ident(&def.name);
  let docs = generate_docs(def.descriptor.description.as_deref());
  let vis = context.visibility();
  let disc_field = shape.discriminator.as_deref().unwrap_or_default();

  let variants: Vec<TokenStream> = shape
    .variants
    .iter()
    .map(|variant| {
      let variant_name = format_ident!("{}", variant.name);
      let ty = field_type(&def.name, &variant.rust_type, context);
      let mut values: Vec<&str> = shape.values_for(variant).collect();
      if values.is_empty() {
        values.push(variant.name.as_str());
      }
      quote! { #variant_name(#ty) => [#(#values),*] }
    })
    .collect();

  quote! {
    oas3_typegen_support::discriminated_enum! {
      #docs
      #vis enum #name {
        discriminator: #disc_field,
        variants: [
          #(#variants),*
        ],
      }
    }
  }
}
