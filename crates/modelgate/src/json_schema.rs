//! JSON Schema export
//!
//! Generates JSON Schema 2020-12 documents from schemas. Nested models are
//! emitted once under `$defs` and referenced with `$ref`.

use crate::config::ExtraFields;
use crate::constraints::Constraint;
use crate::fields::{DefaultValue, FieldDescriptor};
use crate::schema::Schema;
use crate::types::FieldType;
use serde_json::{json, Map, Value as JsonValue};

const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

impl Schema {
    /// JSON Schema describing payloads this schema accepts
    ///
    /// # Example
    ///
    /// ```
    /// use modelgate::{Constraint, FieldDescriptor, FieldType, Schema};
    ///
    /// let schema = Schema::builder("Product")
    ///     .field(FieldDescriptor::new("price", FieldType::Float).constraint(Constraint::gt(0)))
    ///     .build()
    ///     .unwrap();
    /// let doc = schema.json_schema();
    /// assert_eq!(doc["properties"]["price"]["exclusiveMinimum"], 0);
    /// assert_eq!(doc["required"][0], "price");
    /// ```
    pub fn json_schema(&self) -> JsonValue {
        let mut defs = Map::new();
        let body = object_schema(self, &mut defs);

        let mut root = Map::new();
        root.insert("$schema".into(), json!(DRAFT));
        root.extend(body);
        if !defs.is_empty() {
            root.insert("$defs".into(), JsonValue::Object(defs));
        }
        JsonValue::Object(root)
    }
}

fn object_schema(schema: &Schema, defs: &mut Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut out = Map::new();
    out.insert("title".into(), json!(schema.name()));
    if let Some(desc) = schema.description() {
        out.insert("description".into(), json!(desc));
    }
    out.insert("type".into(), json!("object"));

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in schema.fields() {
        let key = field.alias.clone().unwrap_or_else(|| field.name.clone());
        if field.is_required() {
            required.push(json!(key));
        }
        properties.insert(key, field_schema(field, defs));
    }
    out.insert("properties".into(), JsonValue::Object(properties));
    if !required.is_empty() {
        out.insert("required".into(), JsonValue::Array(required));
    }
    if schema.config().extra == ExtraFields::Forbid {
        out.insert("additionalProperties".into(), json!(false));
    }
    out
}

fn field_schema(field: &FieldDescriptor, defs: &mut Map<String, JsonValue>) -> JsonValue {
    let mut out = type_schema(&field.field_type, defs);
    if let Some(desc) = &field.description {
        out.insert("description".into(), json!(desc));
    }
    if let Some(DefaultValue::Value(value)) = &field.default {
        out.insert("default".into(), JsonValue::from(value));
    }
    apply_constraints(&mut out, &field.constraints, &field.field_type);
    JsonValue::Object(out)
}

fn type_schema(field_type: &FieldType, defs: &mut Map<String, JsonValue>) -> Map<String, JsonValue> {
    let value = match field_type {
        FieldType::Str => json!({"type": "string"}),
        FieldType::Int => json!({"type": "integer"}),
        FieldType::Float => json!({"type": "number"}),
        FieldType::Bool => json!({"type": "boolean"}),
        FieldType::DateTime => json!({"type": "string", "format": "date-time"}),
        FieldType::Any => json!({}),
        FieldType::Optional(inner) => {
            json!({"anyOf": [JsonValue::Object(type_schema(inner, defs)), {"type": "null"}]})
        }
        FieldType::List(items) => {
            json!({"type": "array", "items": JsonValue::Object(type_schema(items, defs))})
        }
        FieldType::Map { values, .. } => json!({
            "type": "object",
            "additionalProperties": JsonValue::Object(type_schema(values, defs)),
        }),
        FieldType::Model(schema) => {
            if !defs.contains_key(schema.name()) {
                let body = object_schema(schema, defs);
                defs.insert(schema.name().to_string(), JsonValue::Object(body));
            }
            json!({"$ref": format!("#/$defs/{}", schema.name())})
        }
        FieldType::Union(variants) => {
            let any_of: Vec<JsonValue> = variants
                .iter()
                .map(|v| JsonValue::Object(type_schema(v, defs)))
                .collect();
            json!({ "anyOf": any_of })
        }
        FieldType::Annotated { inner, constraints } => {
            let mut out = type_schema(inner, defs);
            apply_constraints(&mut out, constraints, inner);
            return out;
        }
    };
    match value {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    }
}

fn apply_constraints(out: &mut Map<String, JsonValue>, constraints: &[Constraint], field_type: &FieldType) {
    let (min_key, max_key) = length_keywords(field_type);
    for constraint in constraints {
        match constraint {
            Constraint::MinLength(n) => {
                out.insert(min_key.into(), json!(n));
            }
            Constraint::MaxLength(n) => {
                out.insert(max_key.into(), json!(n));
            }
            Constraint::NonEmpty => {
                out.entry(min_key).or_insert(json!(1));
            }
            Constraint::Minimum { bound, inclusive } => {
                let key = if *inclusive { "minimum" } else { "exclusiveMinimum" };
                out.insert(key.into(), JsonValue::from(bound));
            }
            Constraint::Maximum { bound, inclusive } => {
                let key = if *inclusive { "maximum" } else { "exclusiveMaximum" };
                out.insert(key.into(), JsonValue::from(bound));
            }
            Constraint::Pattern(pattern) => {
                out.insert("pattern".into(), json!(pattern.as_str()));
            }
            Constraint::OneOf(values) => {
                out.insert(
                    "enum".into(),
                    JsonValue::Array(values.iter().map(JsonValue::from).collect()),
                );
            }
            Constraint::MultipleOf(n) => {
                out.insert("multipleOf".into(), json!(n));
            }
            Constraint::Format(format) => {
                out.insert("format".into(), json!(format.json_schema_format()));
            }
            Constraint::Custom(_) => {}
        }
    }
}

/// Length keywords for the value kind a type produces
fn length_keywords(field_type: &FieldType) -> (&'static str, &'static str) {
    match field_type.base() {
        FieldType::Optional(inner) => length_keywords(inner),
        FieldType::List(_) => ("minItems", "maxItems"),
        FieldType::Map { .. } | FieldType::Model(_) => ("minProperties", "maxProperties"),
        _ => ("minLength", "maxLength"),
    }
}
