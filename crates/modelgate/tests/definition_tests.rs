//! Schema document loading tests

use modelgate::*;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const SHOP_YAML: &str = r#"
models:
  - name: Item
    fields:
      - name: sku
        type: str
        pattern: "[A-Z]{3}-[0-9]{4}"
      - name: price
        type: float
        gt: 0
      - name: quantity
        type: int
        ge: 1
        default: 1
  - name: Order
    description: Customer order
    config:
      extra: forbid
      validate_assignment: true
    fields:
      - name: email
        type: str
        format: email
      - name: items
        type: "list[Item]"
        non_empty: true
      - name: placed_at
        type: datetime
        default: "2024-01-01T00:00:00Z"
      - name: notes
        type: "dict[str, str] | None"
        default: null
"#;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = write_temp(".yaml", SHOP_YAML);
    let registry = SchemaDocument::load(file.path()).unwrap().build().unwrap();
    let order = registry.require("Order").unwrap();

    let model = order
        .validate_json(r#"{"email": "ada@example.com", "items": [{"sku": "ABC-1234", "price": "9.5"}]}"#)
        .unwrap();
    assert_eq!(
        model.to_text(),
        r#"{"email":"ada@example.com","items":[{"sku":"ABC-1234","price":9.5,"quantity":1}],"placed_at":"2024-01-01T00:00:00Z","notes":null}"#
    );
    assert!(matches!(model.get("placed_at"), Some(Value::DateTime(_))));
}

#[test]
fn test_yaml_constraints_report_paths() {
    let registry = SchemaDocument::from_yaml(SHOP_YAML).unwrap().build().unwrap();
    let order = registry.require("Order").unwrap();

    let errors = order
        .validate_json(r#"{"email": "nope", "items": [{"sku": "abc", "price": 0, "quantity": 0}], "vip": true}"#)
        .unwrap_err();
    let report: Vec<(String, String)> = errors
        .iter()
        .map(|e| (e.loc(), e.kind.to_string()))
        .collect();
    assert_eq!(
        report,
        vec![
            ("email".to_string(), "constraint_violation.format".to_string()),
            ("items.0.sku".to_string(), "constraint_violation.pattern".to_string()),
            ("items.0.price".to_string(), "constraint_violation.minimum".to_string()),
            ("items.0.quantity".to_string(), "constraint_violation.minimum".to_string()),
            ("vip".to_string(), "extra_forbidden".to_string()),
        ]
    );

    let empty = order.validate_json(r#"{"email": "a@b.io", "items": []}"#).unwrap_err();
    assert_eq!(empty.errors[0].kind, ErrorKind::ConstraintViolation(ConstraintKind::NonEmpty));
}

#[test]
fn test_load_json_file() {
    let file = write_temp(
        ".json",
        r#"{"models": [{"name": "Point", "config": {"frozen": true},
            "fields": [{"name": "x", "type": "int"}, {"name": "y", "type": "int", "default": 0}]}]}"#,
    );
    let registry = SchemaDocument::load(file.path()).unwrap().build().unwrap();
    let point = registry.last().unwrap();
    assert_eq!(point.name(), "Point");

    let mut model = point.validate_json(r#"{"x": "3"}"#).unwrap();
    assert_eq!(model.to_text(), r#"{"x":3,"y":0}"#);
    assert!(matches!(model.set("x", 4), Err(ModelError::Frozen { .. })));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    assert!(matches!(SchemaDocument::load(&missing), Err(DefinitionError::Io { .. })));
}

#[test]
fn test_document_json_schema() {
    let registry = SchemaDocument::from_yaml(SHOP_YAML).unwrap().build().unwrap();
    let doc = registry.require("Order").unwrap().json_schema();

    assert_eq!(doc["description"], "Customer order");
    assert_eq!(doc["properties"]["items"]["items"]["$ref"], "#/$defs/Item");
    assert_eq!(doc["properties"]["items"]["minItems"], 1);
    assert_eq!(doc["properties"]["placed_at"]["format"], "date-time");
    assert_eq!(doc["$defs"]["Item"]["properties"]["sku"]["pattern"], "[A-Z]{3}-[0-9]{4}");
    assert_eq!(doc["required"], serde_json::json!(["email", "items"]));
}
