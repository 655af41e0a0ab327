use std::{collections::HashSet, sync::LazyLock};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

pub(crate) static FORBIDDEN_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen", "self", "Self",
  ]
  .into_iter()
  .collect()
});

/// Names the generated module imports or relies on from the prelude.
static SHADOWED_TYPE_NAMES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "Box", "Clone", "Copy", "Default", "Deserialize", "Display", "HashMap", "Option", "Result", "Send", "Serialize",
    "String", "Sync", "Type", "Value", "Vec", "Nullable",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Transliterates to ASCII, turns every run of invalid characters into one underscore and trims
/// underscores from both ends.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Upper-cases the first letter of every word. Words break on non-alphanumerics and on a
/// lower-to-upper transition; separators are dropped.
///
/// Runs of capitals are kept when the input has no separators (`XMLParser` stays as is), and
/// folded otherwise (`PDF_FILE` becomes `PdfFile`).
pub(crate) fn capitalize_words(input: &str) -> String {
  let ascii = any_ascii(input);
  let has_separators = ascii.contains(|c: char| !c.is_ascii_alphanumeric());
  let has_lower = ascii.chars().any(|c| c.is_ascii_lowercase());
  let fold_upper_runs = has_separators || !has_lower;

  let mut out = String::with_capacity(ascii.len());
  let mut word_start = true;
  let mut prev_lower = false;

  for c in ascii.chars() {
    if !c.is_ascii_alphanumeric() {
      word_start = true;
      prev_lower = false;
      continue;
    }

    let boundary = word_start || (prev_lower && c.is_ascii_uppercase());
    if boundary {
      out.push(c.to_ascii_uppercase());
    } else if fold_upper_runs {
      out.push(c.to_ascii_lowercase());
    } else {
      out.push(c);
    }

    word_start = false;
    prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
  }

  out
}

/// Converts a string into a valid Rust field name (`snake_case`).
///
/// A leading `-` becomes a `negative_` prefix, keywords become raw identifiers (`self` is
/// suffixed instead), and a leading digit gets an underscore.
pub(crate) fn to_rust_field_name(name: &str) -> String {
  let (negative, name) = match name.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, name),
  };

  let mut ident = sanitize(name).to_snake_case();
  if ident.is_empty() {
    return "_".to_string();
  }
  if negative {
    ident = format!("negative_{ident}");
  }

  if ident == "self" {
    return "self_".to_string();
  }
  if FORBIDDEN_IDENTIFIERS.contains(ident.as_str()) {
    return format!("r#{ident}");
  }

  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }
  ident
}

pub(crate) fn to_rust_const_name(input: &str) -> String {
  let sanitized = sanitize(input);
  if sanitized.is_empty() {
    return "EMPTY".to_string();
  }

  let mut ident = sanitized.to_constant_case();
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'N');
    ident.insert(1, '_');
  }
  ident
}

/// Converts a string into a valid Rust type name (`PascalCase`).
///
/// Names that would shadow a prelude or imported type get a `Type` suffix, a leading digit
/// gets a `T` prefix, and an input with no usable characters becomes `Unnamed`.
pub(crate) fn to_rust_type_name(name: &str) -> String {
  let (negative, name) = match name.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, name),
  };
  let name = name.strip_prefix("r#").unwrap_or(name);

  let mut ident = capitalize_words(name);
  if ident.is_empty() {
    return "Unnamed".to_string();
  }
  if negative {
    ident = format!("Negative{ident}");
  }

  guard_type_name(ident)
}

/// Joins breadcrumb segments into one type name, `["Pet", "owner", "Item"]` to `PetOwnerItem`.
pub(crate) fn segments_to_type_name<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
  let joined: String = segments.into_iter().map(capitalize_words).collect();
  if joined.is_empty() {
    return "Unnamed".to_string();
  }
  guard_type_name(joined)
}

/// Variant name for an enum literal. The empty string is spelled `Empty`.
pub(crate) fn to_rust_variant_name(literal: &str) -> String {
  if literal.is_empty() {
    return "Empty".to_string();
  }
  let (negative, rest) = match literal.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, literal),
  };
  let mut ident = capitalize_words(rest);
  if ident.is_empty() {
    return "Empty".to_string();
  }
  if negative {
    ident = format!("Negative{ident}");
  }
  if ident == "Self" {
    return "SelfValue".to_string();
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'V');
  }
  ident
}

fn guard_type_name(mut ident: String) -> String {
  if SHADOWED_TYPE_NAMES.contains(ident.as_str()) {
    ident.push_str("Type");
  } else if ident == "Self" {
    return "SelfType".to_string();
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'T');
  }
  ident
}

/// Whether `name` is already a usable field identifier.
pub(crate) fn is_valid_field_name(name: &str) -> bool {
  let raw = name.strip_prefix("r#").unwrap_or(name);
  !raw.is_empty()
    && raw.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
    && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    && (name.starts_with("r#") || !FORBIDDEN_IDENTIFIERS.contains(raw))
}
