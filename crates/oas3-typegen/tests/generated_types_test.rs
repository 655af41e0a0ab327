//! End-to-end runs of the `oas3-typegen` binary.

use std::{path::Path, process::Command};

const STORE: &str = r##"
openapi: 3.0.3
info:
  title: Store
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      parameters:
        - name: limit
          in: query
          schema: { type: integer }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: { $ref: "#/components/schemas/Pet" }
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id: { type: integer, format: int64 }
        nickname: { type: string, nullable: true }
    Legacy:
      type: object
      properties:
        code: { type: string }
"##;

fn typegen() -> Command {
  let mut command = Command::new(env!("CARGO_BIN_EXE_oas3-typegen"));
  command.env_remove("RUST_LOG").args(["--color", "never"]);
  command
}

fn write_store(dir: &Path) -> anyhow::Result<std::path::PathBuf> {
  let input = dir.join("store.yaml");
  std::fs::write(&input, STORE)?;
  Ok(input)
}

#[test]
fn test_generate_writes_types_to_file() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let input = write_store(dir.path())?;
  let output = dir.path().join("out").join("types.rs");

  let run = typegen()
    .arg("generate")
    .arg("-i")
    .arg(&input)
    .arg("-o")
    .arg(&output)
    .output()?;
  assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

  let code = std::fs::read_to_string(&output)?;
  assert!(code.starts_with("//! AUTO-GENERATED CODE - DO NOT EDIT!"), "{code}");
  assert!(code.contains("pub struct Pet {"), "{code}");
  assert!(code.contains("pub id: i64,"), "{code}");
  assert!(code.contains("pub nickname: Option<String>,"), "{code}");
  assert!(code.contains("pub struct ListPetsParams {"), "{code}");
  assert!(!code.contains("Legacy"), "unreferenced schema should be pruned:\n{code}");
  Ok(())
}

#[test]
fn test_generate_to_stdout_prints_only_code() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let input = write_store(dir.path())?;

  let run = typegen()
    .args(["generate", "--no-prune", "--nullable-type", "-i"])
    .arg(&input)
    .output()?;
  assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

  let code = String::from_utf8(run.stdout)?;
  assert!(code.starts_with("//! AUTO-GENERATED CODE"), "progress output leaked into stdout:\n{code}");
  assert!(code.contains("pub struct Legacy {"), "{code}");
  assert!(code.contains("oas3_typegen_support::Nullable<String>"), "{code}");
  Ok(())
}

#[test]
fn test_missing_input_fails_with_its_path() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let missing = dir.path().join("missing.yaml");

  let run = typegen().arg("generate").arg("-i").arg(&missing).output()?;
  assert!(!run.status.success(), "a missing document must fail");
  let stderr = String::from_utf8(run.stderr)?;
  assert!(stderr.contains("missing.yaml"), "error should name the document: {stderr}");
  Ok(())
}

#[test]
fn test_list_operations_shows_ids_and_tags() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let input = write_store(dir.path())?;

  let run = typegen().args(["list", "operations", "-i"]).arg(&input).output()?;
  assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

  let table = String::from_utf8(run.stdout)?;
  assert!(table.contains("listPets"), "{table}");
  assert!(table.contains("GET"), "{table}");
  assert!(table.contains("/pets"), "{table}");
  assert!(table.contains("pets"), "{table}");
  Ok(())
}

#[test]
fn test_list_schemas_marks_pruned_components() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let input = write_store(dir.path())?;

  let run = typegen().args(["list", "schemas", "-i"]).arg(&input).output()?;
  assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

  let table = String::from_utf8(run.stdout)?;
  assert!(table.contains("Legacy"), "{table}");
  assert!(table.contains("pruned"), "{table}");
  assert!(table.contains("1 of 2 schemas kept"), "{table}");
  Ok(())
}
