//! Schemas: ordered fields, model configuration and cross-field validators
//!
//! A [`Schema`] is built once, shared behind an `Arc` and validated against
//! any number of payloads. Field order is the canonical order for errors,
//! for cross-field validators and for serialized output.

use crate::config::ModelConfig;
use crate::constraints::catch_hook;
use crate::errors::{SchemaError, ValidationError, ValidationErrors, ValidationResult};
use crate::fields::FieldDescriptor;
use crate::model::Model;
use crate::types::{FieldType, Value};
use crate::validators;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Signature of a cross-field check: anchor value and validated siblings in,
/// value to keep (or a message) out
pub type CrossFieldFn = dyn Fn(&Value, &FieldValues<'_>) -> Result<Value, String> + Send + Sync;

// ============================================================================
// Field Values View
// ============================================================================

/// Read-only view of the values validated so far
#[derive(Debug, Clone, Copy)]
pub struct FieldValues<'a> {
    values: &'a [(String, Value)],
}

impl<'a> FieldValues<'a> {
    pub fn new(values: &'a [(String, Value)]) -> Self {
        Self { values }
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// Cross-Field Validator
// ============================================================================

/// Validator anchored on one field with access to its validated siblings
/// (like Pydantic's `@field_validator` using `info.data`)
#[derive(Clone)]
pub struct CrossFieldValidator {
    name: String,
    field: String,
    depends_on: Vec<String>,
    check: Arc<CrossFieldFn>,
}

impl CrossFieldValidator {
    /// Create a validator anchored on `field`
    pub fn new<F>(field: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &FieldValues<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        let field = field.into();
        Self {
            name: format!("validate_{}", field),
            field,
            depends_on: Vec::new(),
            check: Arc::new(check),
        }
    }

    /// Declare sibling fields the check reads.
    ///
    /// The validator is skipped when any of them failed validation, and it
    /// re-runs when one of them is assigned on a model with
    /// `validate_assignment`.
    pub fn depends_on<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.depends_on.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Name used in logs and schema errors
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Anchor field; errors are reported at this location
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    /// Whether the validator reads the given field
    pub fn references(&self, field: &str) -> bool {
        self.field == field || self.depends_on.iter().any(|d| d == field)
    }

    /// Run the check, turning a panic into `Err(Err(message))`
    pub(crate) fn run(
        &self,
        value: &Value,
        siblings: &FieldValues<'_>,
    ) -> Result<Result<Value, String>, String> {
        catch_hook(&self.name, || (self.check)(value, siblings))
    }
}

impl fmt::Debug for CrossFieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFieldValidator")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

// ============================================================================
// Schema
// ============================================================================

/// The declarative contract a payload is validated against
#[derive(Debug)]
pub struct Schema {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
    validators: Vec<CrossFieldValidator>,
    config: ModelConfig,
}

impl Schema {
    /// Start declaring a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Cross-field validators in declaration order
    pub fn validators(&self) -> &[CrossFieldValidator] {
        &self.validators
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Validate a payload, producing a model or every error found
    ///
    /// # Example
    ///
    /// ```
    /// use modelgate::{Constraint, FieldDescriptor, FieldType, Schema, Value};
    ///
    /// let schema = Schema::builder("Product")
    ///     .field(FieldDescriptor::new("name", FieldType::Str).constraint(Constraint::min_length(1)))
    ///     .field(FieldDescriptor::new("price", FieldType::Float).constraint(Constraint::gt(0)))
    ///     .build()
    ///     .unwrap();
    ///
    /// let payload = Value::object([("name", Value::from("Laptop")), ("price", Value::from(999.99))]);
    /// let product = schema.validate(&payload).unwrap();
    /// assert_eq!(product.to_text(), r#"{"name":"Laptop","price":999.99}"#);
    ///
    /// let bad = Value::object([("name", Value::from("")), ("price", Value::from(-10))]);
    /// assert_eq!(schema.validate(&bad).unwrap_err().len(), 2);
    /// ```
    pub fn validate(self: &Arc<Self>, payload: &Value) -> ValidationResult<Model> {
        validators::validate_model(self, payload)
    }

    /// Validate a JSON document
    pub fn validate_json(self: &Arc<Self>, text: &str) -> ValidationResult<Model> {
        let json: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            ValidationErrors::single(ValidationError::type_error(
                Vec::new(),
                format!("Invalid JSON: {}", e),
            ))
        })?;
        self.validate(&Value::from(json))
    }

    /// Validate a `serde_json` value
    pub fn validate_json_value(self: &Arc<Self>, json: serde_json::Value) -> ValidationResult<Model> {
        self.validate(&Value::from(json))
    }
}

// ============================================================================
// Schema Builder
// ============================================================================

/// Builder for statically declared schemas
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
    validators: Vec<CrossFieldValidator>,
    config: ModelConfig,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            validators: Vec::new(),
            config: ModelConfig::default(),
        }
    }

    /// Add a field (declaration order is kept)
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Add a cross-field validator (declaration order is kept)
    pub fn validator(mut self, validator: CrossFieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Check the declaration and freeze it into a shareable schema
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let keys = std::iter::once(field.name.as_str()).chain(field.alias.as_deref());
            for key in keys {
                if !seen.insert(key) {
                    return Err(SchemaError::DuplicateField {
                        model: self.name.clone(),
                        field: key.to_string(),
                    });
                }
            }
            check_field_type(&field.name, &field.field_type)?;
        }

        for validator in &self.validators {
            let referenced = std::iter::once(validator.field()).chain(
                validator.dependencies().iter().map(String::as_str),
            );
            for name in referenced {
                if !self.fields.iter().any(|f| f.name == name) {
                    return Err(SchemaError::UnknownValidatorField {
                        model: self.name.clone(),
                        validator: validator.name().to_string(),
                        field: name.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            model = %self.name,
            fields = self.fields.len(),
            validators = self.validators.len(),
            "schema built"
        );

        Ok(Arc::new(Schema {
            name: self.name,
            description: self.description,
            fields: self.fields,
            validators: self.validators,
            config: self.config,
        }))
    }
}

fn check_field_type(field: &str, field_type: &FieldType) -> Result<(), SchemaError> {
    match field_type {
        FieldType::Union(variants) if variants.is_empty() => Err(SchemaError::EmptyUnion {
            field: field.to_string(),
        }),
        FieldType::Union(variants) => variants
            .iter()
            .try_for_each(|variant| check_field_type(field, variant)),
        FieldType::Optional(inner) | FieldType::List(inner) => check_field_type(field, inner),
        FieldType::Annotated { inner, .. } => check_field_type(field, inner),
        FieldType::Map { keys, values } => {
            check_field_type(field, keys)?;
            check_field_type(field, values)
        }
        _ => Ok(()),
    }
}
