//! Core type system for validation
//!
//! This module defines the runtime values that flow through the engine and
//! the field types a schema declares for them.

use crate::constraints::Constraint;
use crate::schema::Schema;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Value Enum - Runtime values to be validated
// ============================================================================

/// Runtime value that can be validated
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// Structured date-time (produced by coercion from ISO 8601 text)
    DateTime(DateTime<FixedOffset>),
    /// List/Array of values
    List(Vec<Value>),
    /// Object/Dictionary (ordered key-value pairs)
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Build an object from ordered key-value pairs
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a key in an object value (first occurrence wins)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Length used by length constraints: characters for strings, items for
    /// lists, entries for objects.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Object(pairs) => Some(pairs.len()),
            _ => None,
        }
    }

    /// Natural ordering between comparable values.
    ///
    /// Integers compare exactly, mixed int/float compare as f64, strings
    /// lexicographically and date-times chronologically. Anything else is
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::String(s) => write!(f, "'{}'", s),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::List(_) | Self::Object(_) => {
                write!(f, "{}", serde_json::Value::from(self))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::List(items) => serde_json::Value::Array(items.iter().map(Into::into).collect()),
            Value::Object(pairs) => serde_json::Value::Object(
                pairs.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

// ============================================================================
// FieldType - Declared types for validation
// ============================================================================

/// Declared type of a field, a sequence element, a mapping value or a union
/// alternative.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// String (`str`)
    Str,
    /// Integer (`int`); numeric strings and integral floats coerce
    Int,
    /// Float (`float`); integers and numeric strings coerce
    Float,
    /// Boolean (`bool`)
    Bool,
    /// ISO 8601 date-time (`datetime`)
    DateTime,
    /// No validation
    Any,
    /// Nullable wrapper (`Optional[T]`)
    Optional(Box<FieldType>),
    /// Homogeneous sequence (`list[T]`)
    List(Box<FieldType>),
    /// String-keyed mapping (`dict[K, V]`); keys are coerced from their text
    Map {
        keys: Box<FieldType>,
        values: Box<FieldType>,
    },
    /// Nested model, validated recursively against its own schema
    Model(Arc<Schema>),
    /// First alternative that coerces and satisfies its own constraints wins
    Union(Vec<FieldType>),
    /// A type carrying its own constraints (`Annotated[T, Field(...)]`)
    Annotated {
        inner: Box<FieldType>,
        constraints: Vec<Constraint>,
    },
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(items: FieldType) -> Self {
        Self::List(Box::new(items))
    }

    pub fn map(keys: FieldType, values: FieldType) -> Self {
        Self::Map {
            keys: Box::new(keys),
            values: Box::new(values),
        }
    }

    pub fn model(schema: Arc<Schema>) -> Self {
        Self::Model(schema)
    }

    pub fn union(variants: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Union(variants.into_iter().collect())
    }

    pub fn annotated(inner: FieldType, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self::Annotated {
            inner: Box::new(inner),
            constraints: constraints.into_iter().collect(),
        }
    }

    /// The type with every `Annotated` layer removed
    pub fn base(&self) -> &FieldType {
        match self {
            Self::Annotated { inner, .. } => inner.base(),
            other => other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "str"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::DateTime => write!(f, "datetime"),
            Self::Any => write!(f, "Any"),
            Self::Optional(inner) => write!(f, "Optional[{}]", inner),
            Self::List(items) => write!(f, "list[{}]", items),
            Self::Map { keys, values } => write!(f, "dict[{}, {}]", keys, values),
            Self::Model(schema) => write!(f, "{}", schema.name()),
            Self::Union(variants) => {
                let names: Vec<String> = variants.iter().map(ToString::to_string).collect();
                write!(f, "Union[{}]", names.join(", "))
            }
            Self::Annotated { inner, .. } => write!(f, "{}", inner),
        }
    }
}
