//! Core validation engine
//!
//! This module implements coercion of raw payload values into declared field
//! types, constraint checking and the per-schema validation pass. Every
//! function here accumulates errors rather than returning on the first one;
//! errors are produced relative to the value being validated and re-anchored
//! by the caller.

use crate::config::{ExtraFields, ModelConfig};
use crate::constraints::{Constraint, ConstraintKind, Violation};
use crate::errors::{PathSegment, ValidationError, ValidationErrors, ValidationResult};
use crate::fields::FieldDescriptor;
use crate::model::Model;
use crate::schema::{CrossFieldValidator, FieldValues, Schema};
use crate::types::{FieldType, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Output of a successful pass over one schema
#[derive(Debug, Clone, Default)]
pub(crate) struct Validated {
    /// Declared fields, in declaration order
    pub values: Vec<(String, Value)>,
    /// Unknown payload keys kept under `ExtraFields::Allow`
    pub extras: Vec<(String, Value)>,
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a payload against a schema, building a model on success
pub(crate) fn validate_model(schema: &Arc<Schema>, payload: &Value) -> ValidationResult<Model> {
    match validate_fields(schema, payload) {
        Ok(validated) => {
            tracing::debug!(model = %schema.name(), "validation succeeded");
            Ok(Model::new(Arc::clone(schema), validated.values, validated.extras))
        }
        Err(errors) => {
            tracing::debug!(model = %schema.name(), errors = errors.len(), "validation failed");
            Err(errors)
        }
    }
}

/// Coerce a raw value into a declared type
///
/// Nested models, sequence elements, mapping entries, union alternatives and
/// annotated constraints are all handled here. Errors are located relative
/// to `value`.
///
/// # Example
///
/// ```
/// use modelgate::{coerce, FieldType, ModelConfig, Value};
///
/// let config = ModelConfig::default();
/// assert_eq!(coerce(&Value::from("42"), &FieldType::Int, &config).unwrap(), Value::Int(42));
/// assert!(coerce(&Value::from("abc"), &FieldType::Int, &config).is_err());
/// ```
pub fn coerce(value: &Value, field_type: &FieldType, config: &ModelConfig) -> ValidationResult<Value> {
    match field_type {
        FieldType::Str => coerce_str(value, config),
        FieldType::Int => coerce_int(value),
        FieldType::Float => coerce_float(value),
        FieldType::Bool => coerce_bool(value),
        FieldType::DateTime => coerce_datetime(value),
        FieldType::Any => Ok(value.clone()),
        FieldType::Optional(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => coerce(other, inner, config),
        },
        FieldType::List(items) => coerce_list(value, items, config),
        FieldType::Map { keys, values } => coerce_map(value, keys, values, config),
        FieldType::Model(schema) => {
            let validated = validate_fields(schema, value)?;
            let mut pairs = validated.values;
            pairs.extend(validated.extras);
            Ok(Value::Object(pairs))
        }
        FieldType::Union(variants) => coerce_union(value, variants, config),
        FieldType::Annotated { inner, constraints } => {
            let coerced = coerce(value, inner, config)?;
            check_constraints(coerced, constraints).map_err(|violations| {
                let mut errors = ValidationErrors::new();
                errors.extend(
                    violations
                        .into_iter()
                        .map(|v| ValidationError::constraint(Vec::new(), v)),
                );
                errors
            })
        }
    }
}

/// Run constraints in order, threading values a custom check transforms.
///
/// Every constraint runs even after one fails; all violations are returned.
pub fn check_constraints(value: Value, constraints: &[Constraint]) -> Result<Value, Vec<Violation>> {
    let mut current = value;
    let mut violations = Vec::new();
    for constraint in constraints {
        match constraint.check(current.clone()) {
            Ok(next) => current = next,
            Err(violation) => violations.push(violation),
        }
    }
    if violations.is_empty() {
        Ok(current)
    } else {
        Err(violations)
    }
}

// ============================================================================
// Schema Pass
// ============================================================================

/// Validate every declared field, then extras, then cross-field validators
pub(crate) fn validate_fields(schema: &Schema, payload: &Value) -> ValidationResult<Validated> {
    let pairs = match payload {
        Value::Object(pairs) => pairs,
        other => {
            return Err(ValidationErrors::single(ValidationError::type_error(
                Vec::new(),
                format!(
                    "Input should be a valid dictionary or instance of {}, got {}",
                    schema.name(),
                    other.type_name()
                ),
            )))
        }
    };

    let config = schema.config();
    let mut errors = ValidationErrors::new();
    let mut failed: HashSet<&str> = HashSet::new();
    let mut validated = Validated {
        values: Vec::with_capacity(schema.fields().len()),
        extras: Vec::new(),
    };

    for field in schema.fields() {
        match validate_field(schema, field, pairs, config) {
            Ok(value) => validated.values.push((field.name.clone(), value)),
            Err(field_errors) => {
                errors.merge(field_errors.prefixed(PathSegment::field(&field.name)));
                failed.insert(field.name.as_str());
            }
        }
    }

    for (key, value) in pairs {
        if schema.fields().iter().any(|f| f.accepts_key(key)) {
            continue;
        }
        match config.extra {
            ExtraFields::Forbid => errors.add(ValidationError::extra(vec![PathSegment::Key(key.clone())])),
            ExtraFields::Allow => validated.extras.push((key.clone(), value.clone())),
            ExtraFields::Ignore => {}
        }
    }

    for validator in schema.validators() {
        let blocked = std::iter::once(validator.field())
            .chain(validator.dependencies().iter().map(String::as_str))
            .find(|name| failed.contains(name));
        if let Some(name) = blocked {
            tracing::trace!(
                model = %schema.name(),
                validator = validator.name(),
                field = name,
                "skipping cross-field validator after failed field"
            );
            continue;
        }
        match run_cross_field(validator, &validated.values) {
            Ok(Some((index, value))) => validated.values[index].1 = value,
            Ok(None) => {}
            Err(error) => {
                errors.add(error);
                failed.insert(validator.field());
            }
        }
    }

    errors.into_result().map(|()| validated)
}

/// Validate one field, with errors relative to the field
fn validate_field(
    schema: &Schema,
    field: &FieldDescriptor,
    pairs: &[(String, Value)],
    config: &ModelConfig,
) -> ValidationResult<Value> {
    let supplied = lookup(pairs, &field.name).or_else(|| {
        field
            .alias
            .as_deref()
            .and_then(|alias| lookup(pairs, alias))
    });

    let value = match supplied {
        Some(raw) => coerce(raw, &field.field_type, config)?,
        None => match field.resolve_default() {
            Some(default) => {
                tracing::trace!(model = %schema.name(), field = %field.name, "using default");
                default
            }
            None => return Err(ValidationErrors::single(ValidationError::missing(Vec::new()))),
        },
    };

    check_field_constraints(value, &field.constraints)
}

fn check_field_constraints(value: Value, constraints: &[Constraint]) -> ValidationResult<Value> {
    check_constraints(value, constraints).map_err(|violations| {
        let mut errors = ValidationErrors::new();
        errors.extend(
            violations
                .into_iter()
                .map(|v| ValidationError::constraint(Vec::new(), v)),
        );
        errors
    })
}

fn lookup<'a>(pairs: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Run a cross-field validator; `Ok(Some)` carries the anchor's index and
/// its replacement value
fn run_cross_field(
    validator: &CrossFieldValidator,
    values: &[(String, Value)],
) -> Result<Option<(usize, Value)>, ValidationError> {
    let Some(index) = values.iter().position(|(k, _)| k == validator.field()) else {
        return Ok(None);
    };
    let path = vec![PathSegment::field(validator.field())];
    match validator.run(&values[index].1, &FieldValues::new(values)) {
        Ok(Ok(value)) => Ok(Some((index, value))),
        Ok(Err(message)) => Err(ValidationError::cross_field(path, message)),
        Err(message) => Err(ValidationError::constraint(
            path,
            Violation::new(ConstraintKind::Custom, message),
        )),
    }
}

// ============================================================================
// Assignment
// ============================================================================

/// Validate a single assignment against a model's current values.
///
/// Runs the field's coercion and constraints, then every cross-field
/// validator referencing the field, on a copy. Returns the values to commit.
pub(crate) fn validate_assignment(
    schema: &Schema,
    values: &[(String, Value)],
    field: &FieldDescriptor,
    raw: &Value,
) -> ValidationResult<Vec<(String, Value)>> {
    let path = PathSegment::field(&field.name);
    let value = coerce(raw, &field.field_type, schema.config())
        .and_then(|v| check_field_constraints(v, &field.constraints))
        .map_err(|errors| errors.prefixed(path.clone()))?;

    let mut updated = values.to_vec();
    match updated.iter_mut().find(|(k, _)| *k == field.name) {
        Some(slot) => slot.1 = value,
        None => updated.push((field.name.clone(), value)),
    }

    let mut errors = ValidationErrors::new();
    for validator in schema.validators().iter().filter(|v| v.references(&field.name)) {
        match run_cross_field(validator, &updated) {
            Ok(Some((index, value))) => updated[index].1 = value,
            Ok(None) => {}
            Err(error) => errors.add(error),
        }
    }

    tracing::debug!(
        model = %schema.name(),
        field = %field.name,
        errors = errors.len(),
        "assignment validated"
    );
    errors.into_result().map(|()| updated)
}

// ============================================================================
// Primitive Coercion
// ============================================================================

fn type_error(message: impl Into<String>) -> ValidationErrors {
    ValidationErrors::single(ValidationError::type_error(Vec::new(), message))
}

fn coerce_str(value: &Value, config: &ModelConfig) -> ValidationResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(config.process_string(s))),
        other => Err(type_error(format!(
            "Input should be a valid string, got {}",
            other.type_name()
        ))),
    }
}

fn coerce_int(value: &Value) -> ValidationResult<Value> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => float_to_int(*f).map(Value::Int).map_err(type_error),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            match text.parse::<f64>().ok().filter(|f| f.is_finite() && f.fract() == 0.0) {
                Some(f) => float_to_int(f).map(Value::Int).map_err(type_error),
                None => Err(type_error(
                    "Input should be a valid integer, unable to parse string as an integer",
                )),
            }
        }
        other => Err(type_error(format!(
            "Input should be a valid integer, got {}",
            other.type_name()
        ))),
    }
}

/// Narrow an integral float; JSON integers beyond `i64` arrive here as floats
fn float_to_int(f: f64) -> Result<i64, &'static str> {
    if !f.is_finite() {
        Err("Input should be a finite number")
    } else if f.fract() != 0.0 {
        Err("Input should be a valid integer, got a number with a fractional part")
    } else if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        Err("Input should be a valid integer, unable to fit in a 64-bit integer")
    } else {
        Ok(f as i64)
    }
}

fn coerce_float(value: &Value) -> ValidationResult<Value> {
    match value {
        Value::Float(f) if f.is_finite() => Ok(Value::Float(*f)),
        Value::Float(_) => Err(type_error("Input should be a finite number")),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(|| type_error("Input should be a valid number, unable to parse string as a number")),
        other => Err(type_error(format!(
            "Input should be a valid number, got {}",
            other.type_name()
        ))),
    }
}

fn coerce_bool(value: &Value) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed
        .map(Value::Bool)
        .ok_or_else(|| type_error("Input should be a valid boolean"))
}

fn coerce_datetime(value: &Value) -> ValidationResult<Value> {
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::String(s) => parse_datetime(s.trim())
            .map(Value::DateTime)
            .ok_or_else(|| type_error("Input should be a valid datetime, invalid ISO 8601 format")),
        Value::Int(secs) => DateTime::<Utc>::from_timestamp(*secs, 0)
            .map(|dt| Value::DateTime(dt.fixed_offset()))
            .ok_or_else(|| type_error("Input should be a valid datetime, timestamp out of range")),
        other => Err(type_error(format!(
            "Input should be a valid datetime, got {}",
            other.type_name()
        ))),
    }
}

/// Parse ISO 8601 text; values without an offset are taken as UTC
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

// ============================================================================
// Container Coercion
// ============================================================================

fn coerce_list(value: &Value, items: &FieldType, config: &ModelConfig) -> ValidationResult<Value> {
    let Value::List(elements) = value else {
        return Err(type_error(format!(
            "Input should be a valid list, got {}",
            value.type_name()
        )));
    };

    let mut errors = ValidationErrors::new();
    let mut coerced = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match coerce(element, items, config) {
            Ok(v) => coerced.push(v),
            Err(e) => errors.merge(e.prefixed(PathSegment::Index(index))),
        }
    }
    errors.into_result().map(|()| Value::List(coerced))
}

fn coerce_map(
    value: &Value,
    keys: &FieldType,
    values: &FieldType,
    config: &ModelConfig,
) -> ValidationResult<Value> {
    let Value::Object(entries) = value else {
        return Err(type_error(format!(
            "Input should be a valid dictionary, got {}",
            value.type_name()
        )));
    };

    let mut errors = ValidationErrors::new();
    let mut coerced = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let segment = PathSegment::Key(key.clone());
        let key_value = coerce(&Value::String(key.clone()), keys, config)
            .map_err(|e| e.prefixed(segment.clone()));
        let entry_value = coerce(entry, values, config).map_err(|e| e.prefixed(segment.clone()));
        match (key_value, entry_value) {
            (Ok(k), Ok(v)) => coerced.push((key_text(&k), v)),
            (k, v) => {
                if let Err(e) = k {
                    errors.merge(e);
                }
                if let Err(e) = v {
                    errors.merge(e);
                }
            }
        }
    }
    errors.into_result().map(|()| Value::Object(coerced))
}

/// Canonical text of a coerced mapping key
fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        other => serde_json::Value::from(other).to_string(),
    }
}

fn coerce_union(value: &Value, variants: &[FieldType], config: &ModelConfig) -> ValidationResult<Value> {
    for variant in variants {
        if let Ok(coerced) = coerce(value, variant, config) {
            return Ok(coerced);
        }
    }
    let names: Vec<String> = variants.iter().map(ToString::to_string).collect();
    Err(type_error(format!(
        "Input should match one of: {}",
        names.join(", ")
    )))
}
