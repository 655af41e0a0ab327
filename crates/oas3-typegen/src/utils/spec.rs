use std::{
  collections::{BTreeMap, BTreeSet, VecDeque},
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde_json::Value;

use crate::utils::{
  dialect,
  refs::{collect_refs, split_reference},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension)
  }
}

pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open '{}'", path.display()))?;

    Ok(Self {
      file,
      format: SpecFormat::from_path(path),
    })
  }

  /// Reads the raw document and rewrites 3.0 schema syntax into 3.1 form.
  pub fn parse_value(&self) -> anyhow::Result<Value> {
    let mut value: Value = match self.format {
      SpecFormat::Json => serde_json::from_slice(self.file.as_slice())?,
      SpecFormat::Yaml => serde_yaml::from_slice(self.file.as_slice())?,
    };
    dialect::normalize(&mut value);
    Ok(value)
  }
}

/// Types a normalized document, reporting the JSON path of the first mismatch.
pub fn into_spec(value: Value) -> anyhow::Result<oas3::Spec> {
  serde_path_to_error::deserialize(value).map_err(|err| {
    let path = err.path().to_string();
    anyhow::anyhow!("invalid OpenAPI document at '{path}': {}", err.into_inner())
  })
}

/// A root document plus every external document reachable through its references.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
  pub spec: oas3::Spec,
  /// The normalized root document the typed spec was read from.
  pub document: Value,
  /// External documents keyed by the file part of the references that name them.
  pub externals: BTreeMap<String, Value>,
}

/// Loads `path` and, transitively, every file its `$ref`s point into.
///
/// External files are resolved relative to the root document. A file that cannot be
/// read is fatal unless `ignore_missing_refs` is set, in which case references into it stay
/// unresolved.
pub async fn load_spec(path: &Path, ignore_missing_refs: bool) -> anyhow::Result<LoadedSpec> {
  let root = SpecLoader::open(path).await?.parse_value()?;
  let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

  let mut externals = BTreeMap::new();
  let mut pending: VecDeque<String> = external_documents(&root).into_iter().collect();
  let mut seen: BTreeSet<String> = pending.iter().cloned().collect();

  while let Some(name) = pending.pop_front() {
    let Some(value) = load_external(&base, &name, ignore_missing_refs).await? else {
      continue;
    };
    for nested in external_documents(&value) {
      if seen.insert(nested.clone()) {
        pending.push_back(nested);
      }
    }
    tracing::debug!(document = %name, "loaded external document");
    externals.insert(name, value);
  }

  Ok(LoadedSpec {
    spec: into_spec(root.clone())?,
    document: root,
    externals,
  })
}

async fn load_external(base: &Path, name: &str, ignore_missing_refs: bool) -> anyhow::Result<Option<Value>> {
  if name.contains("://") {
    if ignore_missing_refs {
      tracing::warn!(document = %name, "skipping remote reference");
      return Ok(None);
    }
    bail!("remote reference '{name}' is not supported, download it next to the document");
  }

  let file: PathBuf = base.join(name);
  let loaded = match SpecLoader::open(&file).await {
    Ok(loader) => loader.parse_value(),
    Err(err) => Err(err),
  };
  match loaded {
    Ok(value) => Ok(Some(value)),
    Err(err) if ignore_missing_refs => {
      tracing::warn!(document = %name, error = %err, "ignoring unreadable external reference");
      Ok(None)
    }
    Err(err) => Err(err.context(format!("failed to load external reference '{name}'"))),
  }
}

fn external_documents(document: &Value) -> BTreeSet<String> {
  let mut refs = BTreeSet::new();
  collect_refs(document, &mut refs);
  refs
    .iter()
    .filter_map(|r| split_reference(r).ok())
    .map(|(document, _)| document)
    .filter(|document| !document.is_empty())
    .map(str::to_string)
    .collect()
}
