use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};

/// Doc lines for a schema description. Blank descriptions produce nothing.
pub(crate) fn generate_docs(description: Option<&str>) -> TokenStream {
  let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
    return quote! {};
  };
  let doc_lines: Vec<TokenStream> = description
    .lines()
    .map(|line| {
      let line = format!(" {}", line.trim_end());
      quote! { #[doc = #line] }
    })
    .collect();
  quote! { #(#doc_lines)* }
}

pub(crate) fn generate_derives(derives: &[&str]) -> TokenStream {
  if derives.is_empty() {
    return quote! {};
  }
  let derive_idents = derives.iter().filter_map(|d| d.parse::<TokenStream>().ok());
  quote! { #[derive(#(#derive_idents),*)] }
}

/// Generates a single combined `#[serde(...)]` attribute.
///
/// If attrs is empty, returns nothing.
pub(crate) fn generate_serde_attrs(attrs: &[TokenStream]) -> TokenStream {
  if attrs.is_empty() {
    return quote! {};
  }
  quote! { #[serde(#(#attrs),*)] }
}

pub(crate) fn generate_deprecated_attr(deprecated: bool, reason: Option<&str>) -> TokenStream {
  match (deprecated, reason) {
    (_, Some(note)) => quote! { #[deprecated(note = #note)] },
    (true, None) => quote! { #[deprecated] },
    (false, None) => quote! {},
  }
}

/// Attributes listed in `x-rust-attrs`, verbatim. Entries that do not parse are dropped.
pub(crate) fn generate_extra_attrs(attrs: &[String]) -> TokenStream {
  let attr_tokens = attrs.iter().filter_map(|attr| {
    let attr = attr.trim();
    let inner = attr
      .strip_prefix("#[")
      .and_then(|a| a.strip_suffix(']'))
      .unwrap_or(attr);
    match inner.parse::<TokenStream>() {
      Ok(tokens) => Some(quote! { #[#tokens] }),
      Err(err) => {
        tracing::warn!(attribute = attr, %err, "ignoring unparsable x-rust-attrs entry");
        None
      }
    }
  });
  quote! { #(#attr_tokens)* }
}

/// An identifier, raw when the name carries the `r#` prefix.
pub(crate) fn ident(name: &str) -> Ident {
  match name.strip_prefix("r#") {
    Some(raw) => Ident::new_raw(raw, Span::call_site()),
    None => format_ident!("{name}"),
  }
}
