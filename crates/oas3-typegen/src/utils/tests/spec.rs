use std::path::Path;

use crate::utils::spec::{SpecFormat, SpecLoader, into_spec, load_spec};

const ROOT_YAML: &str = r##"openapi: 3.0.3
info:
  title: Loader Test
  version: 1.0.0
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
          nullable: true
        tag:
          $ref: "common.yaml#/components/schemas/Tag"
"##;

const COMMON_YAML: &str = r##"components:
  schemas:
    Tag:
      type: object
      properties:
        owner:
          $ref: "people.json#/components/schemas/Person"
"##;

const PEOPLE_JSON: &str = r#"{ "components": { "schemas": { "Person": { "type": "string" } } } }"#;

#[test]
fn test_format_follows_the_extension() {
  assert_eq!(SpecFormat::from_path(Path::new("api.yaml")), SpecFormat::Yaml);
  assert_eq!(SpecFormat::from_path(Path::new("api.yml")), SpecFormat::Yaml);
  assert_eq!(SpecFormat::from_path(Path::new("api.json")), SpecFormat::Json);
  assert_eq!(SpecFormat::from_path(Path::new("api")), SpecFormat::Json);
}

#[tokio::test]
async fn test_yaml_document_is_normalized_on_load() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("api.yaml");
  std::fs::write(&path, ROOT_YAML)?;

  let value = SpecLoader::open(&path).await?.parse_value()?;
  assert_eq!(
    value.pointer("/components/schemas/Pet/properties/name/type"),
    Some(&serde_json::json!(["string", "null"]))
  );
  Ok(())
}

#[tokio::test]
async fn test_external_documents_are_loaded_transitively() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("api.yaml");
  std::fs::write(&path, ROOT_YAML)?;
  std::fs::write(dir.path().join("common.yaml"), COMMON_YAML)?;
  std::fs::write(dir.path().join("people.json"), PEOPLE_JSON)?;

  let loaded = load_spec(&path, false).await?;
  assert_eq!(loaded.spec.info.title, "Loader Test");
  let externals: Vec<&str> = loaded.externals.keys().map(String::as_str).collect();
  assert_eq!(externals, vec!["common.yaml", "people.json"]);
  Ok(())
}

#[tokio::test]
async fn test_missing_external_document_is_fatal_unless_ignored() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("api.yaml");
  std::fs::write(&path, ROOT_YAML)?;

  let error = load_spec(&path, false)
    .await
    .expect_err("common.yaml does not exist");
  assert!(format!("{error:#}").contains("common.yaml"), "error should name the file: {error:#}");

  let loaded = load_spec(&path, true).await?;
  assert!(loaded.externals.is_empty(), "missing document should be skipped");
  Ok(())
}

#[tokio::test]
async fn test_missing_root_document_names_the_path() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("absent.json");
  let Err(error) = SpecLoader::open(&path).await else {
    anyhow::bail!("opening a missing file should fail");
  };
  assert!(format!("{error}").contains("absent.json"), "{error}");
  Ok(())
}

#[test]
fn test_invalid_document_reports_its_path() {
  let error = into_spec(serde_json::json!({
    "openapi": "3.1.0",
    "info": { "title": 7, "version": "1.0.0" }
  }))
  .expect_err("title must be a string");
  assert!(format!("{error}").contains("info.title"), "{error}");
}
