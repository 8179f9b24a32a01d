//! Validation error types
//!
//! A validation run reports every problem it finds as a [`ValidationError`]
//! collected into [`ValidationErrors`]. Schema construction and model
//! mutation failures have their own error enums.

use crate::constraints::{ConstraintKind, Violation};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// ============================================================================
// Path Segments
// ============================================================================

/// One step of the location of a failure inside the payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Declared field of a model
    Field(String),
    /// Position inside a sequence
    Index(usize),
    /// Key inside a mapping (or an unrecognized payload key)
    Key(String),
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) | Self::Key(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(name) | Self::Key(name) => serializer.serialize_str(name),
            Self::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

// ============================================================================
// Error Kind Classification
// ============================================================================

/// Classification of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required field absent from the payload
    MissingField,
    /// Value could not be coerced to the declared type
    TypeError,
    /// Coercion succeeded but a constraint failed
    ConstraintViolation(ConstraintKind),
    /// Payload key not recognized while extra fields are forbidden
    ExtraField,
    /// A cross-field validator rejected the model
    CrossFieldViolation,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField => "missing",
            Self::TypeError => "type_error",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::ExtraField => "extra_forbidden",
            Self::CrossFieldViolation => "cross_field_violation",
        }
    }

    /// The violated constraint, for constraint violations
    pub fn constraint(&self) -> Option<ConstraintKind> {
        match self {
            Self::ConstraintViolation(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintViolation(kind) => write!(f, "{}.{}", self.code(), kind),
            other => f.write_str(other.code()),
        }
    }
}

// ============================================================================
// Single Validation Error
// ============================================================================

/// A single validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Location of the failure, outermost field first
    pub path: Vec<PathSegment>,
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    pub fn new(path: Vec<PathSegment>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    pub fn missing(path: Vec<PathSegment>) -> Self {
        Self::new(path, ErrorKind::MissingField, "Field required")
    }

    pub fn type_error(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::TypeError, message)
    }

    pub fn constraint(path: Vec<PathSegment>, violation: Violation) -> Self {
        Self::new(
            path,
            ErrorKind::ConstraintViolation(violation.kind),
            violation.message,
        )
    }

    pub fn extra(path: Vec<PathSegment>) -> Self {
        Self::new(path, ErrorKind::ExtraField, "Extra inputs are not permitted")
    }

    pub fn cross_field(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::CrossFieldViolation, message)
    }

    /// Dotted location, e.g. `items.0.price`
    pub fn loc(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Re-anchor this error under a parent segment
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Whether the error is located at (or below) the given top-level field
    pub fn is_for_field(&self, name: &str) -> bool {
        matches!(self.path.first(), Some(PathSegment::Field(f) | PathSegment::Key(f)) if f == name)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = self.loc();
        let loc = if loc.is_empty() { "__root__" } else { loc.as_str() };
        write!(f, "{}\n  {} [type={}]", loc, self.message, self.kind)
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("loc", &self.path)?;
        map.serialize_entry("type", self.kind.code())?;
        if let Some(constraint) = self.kind.constraint() {
            map.serialize_entry("constraint", &constraint)?;
        }
        map.serialize_entry("msg", &self.message)?;
        map.end()
    }
}

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of validation errors
///
/// Holds every error a validation run produced, in field-declaration order.
/// Serializes to the `[{loc, type, msg}]` list an HTTP 422 body carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    /// List of individual validation errors
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Collection holding a single error
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add multiple validation errors
    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Merge another ValidationErrors into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Re-anchor every error under a parent segment
    pub fn prefixed(self, segment: PathSegment) -> Self {
        Self {
            errors: self
                .errors
                .into_iter()
                .map(|e| e.prefixed(segment.clone()))
                .collect(),
        }
    }

    /// Convert to Result - Ok if no errors, Err if there are errors
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors located at (or below) a top-level field
    pub fn for_field<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.is_for_field(name))
    }

    /// The error list as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.errors.len()))?;
        for error in &self.errors {
            seq.serialize_element(error)?;
        }
        seq.end()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

// ============================================================================
// Schema and Model Errors
// ============================================================================

/// Schema construction failure
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Duplicate field name '{field}' in model '{model}'")]
    DuplicateField { model: String, field: String },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Validator '{validator}' references unknown field '{field}' in model '{model}'")]
    UnknownValidatorField {
        model: String,
        validator: String,
        field: String,
    },

    #[error("Union type for field '{field}' has no alternatives")]
    EmptyUnion { field: String },
}

/// Model mutation failure
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Instance of '{model}' is frozen; cannot assign '{field}'")]
    Frozen { model: String, field: String },

    #[error("Object '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("Assignment rejected: {0}")]
    Validation(#[from] ValidationErrors),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_add() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        errors.add(ValidationError::type_error(
            vec![PathSegment::field("age")],
            "Input should be a valid integer",
        ));
        assert_eq!(errors.len(), 1);
        assert!(errors.clone().into_result().is_err());
    }

    #[test]
    fn test_prefixed_reanchors_path() {
        let inner = ValidationErrors::single(ValidationError::missing(vec![PathSegment::field("city")]));
        let outer = inner
            .prefixed(PathSegment::Index(0))
            .prefixed(PathSegment::field("addresses"));
        assert_eq!(outer.errors[0].loc(), "addresses.0.city");
        assert!(outer.errors[0].is_for_field("addresses"));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::MissingField.to_string(), "missing");
        assert_eq!(
            ErrorKind::ConstraintViolation(ConstraintKind::MinLength).to_string(),
            "constraint_violation.min_length"
        );
    }

    #[test]
    fn test_serialize_error_list() {
        let errors = ValidationErrors::single(ValidationError::constraint(
            vec![PathSegment::field("items"), PathSegment::Index(1)],
            Violation::new(ConstraintKind::Minimum, "Input should be greater than 0"),
        ));
        assert_eq!(
            errors.to_json().to_string(),
            r#"[{"loc":["items",1],"type":"constraint_violation","constraint":"minimum","msg":"Input should be greater than 0"}]"#
        );
    }

    #[test]
    fn test_display_lists_every_error() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::missing(vec![PathSegment::field("name")]));
        errors.add(ValidationError::extra(vec![PathSegment::Key("color".into())]));
        let text = errors.to_string();
        assert!(text.starts_with("2 validation error(s)"));
        assert!(text.contains("name\n  Field required [type=missing]"));
        assert!(text.contains("color\n  Extra inputs are not permitted [type=extra_forbidden]"));
    }
}
