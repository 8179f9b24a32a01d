//! Command-line behaviour of `mg`

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const PRODUCTS: &str = r#"
models:
  - name: Product
    config:
      extra: forbid
    fields:
      - { name: name, type: str, min_length: 1 }
      - { name: price, type: float, gt: 0 }
      - { name: tags, type: "list[str]", default_factory: list }
"#;

fn schema_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(PRODUCTS.as_bytes()).unwrap();
    file
}

fn mg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mg"))
}

#[test]
fn validate_accepts_payload_from_stdin() {
    let schema = schema_file();
    mg().arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .write_stdin(r#"{"name": "Laptop", "price": "999.99"}"#)
        .assert()
        .success()
        .stdout(predicate::str::diff("{\"name\":\"Laptop\",\"price\":999.99,\"tags\":[]}\n"));
}

#[test]
fn validate_reports_errors_and_exits_one() {
    let schema = schema_file();
    let mut payload = NamedTempFile::new().unwrap();
    payload
        .write_all(br#"{"name": "", "price": -10, "color": "red"}"#)
        .unwrap();

    mg().arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--model")
        .arg("Product")
        .arg("--input")
        .arg(payload.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""loc":["name"]"#))
        .stdout(predicate::str::contains(r#""constraint":"minimum""#))
        .stdout(predicate::str::contains(r#""type":"extra_forbidden""#))
        .stderr(predicate::str::contains("3 validation error(s) for Product"));
}

#[test]
fn validate_unknown_model_is_usage_error() {
    let schema = schema_file();
    mg().args(["validate", "--model", "Order", "--schema"])
        .arg(schema.path())
        .write_stdin("{}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown model 'Order'"));
}

#[test]
fn schema_prints_json_schema() {
    let schema = schema_file();
    mg().arg("schema")
        .arg("--schema")
        .arg(schema.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Product""#))
        .stdout(predicate::str::contains(r#""exclusiveMinimum": 0"#))
        .stdout(predicate::str::contains(r#""additionalProperties": false"#));
}

#[test]
fn inspect_lists_fields() {
    let schema = schema_file();
    mg().arg("inspect")
        .arg("--schema")
        .arg(schema.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Product"))
        .stdout(predicate::str::contains("price  float  required  [minimum]"))
        .stdout(predicate::str::contains("tags   list[str]  default_factory"));
}

#[test]
fn missing_document_fails() {
    mg().args(["inspect", "--schema", "/nonexistent/models.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load schema document"));
}
