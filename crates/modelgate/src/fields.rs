//! Field descriptors
//!
//! A field binds a name to a declared type, an optional default and the
//! ordered constraints its value must satisfy.

use crate::constraints::Constraint;
use crate::types::{FieldType, Value};
use std::fmt;
use std::sync::Arc;

/// Signature of a default factory
pub type FactoryFn = dyn Fn() -> Value + Send + Sync;

// ============================================================================
// Default Value
// ============================================================================

/// Default used when the payload omits a field
#[derive(Clone)]
pub enum DefaultValue {
    /// Stored value, cloned for every validation run
    Value(Value),
    /// Factory invoked once per validation run (`default_factory=list`)
    Factory(Arc<FactoryFn>),
}

impl DefaultValue {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    /// Produce a fresh default
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }

    /// The stored value, if this is not a factory
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Factory(_) => None,
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// Field descriptor for model validation
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name (unique within its schema)
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Default used when the payload omits the field
    pub default: Option<DefaultValue>,
    /// Constraints, checked in order
    pub constraints: Vec<Constraint>,
    /// Alternative input key accepted during validation
    pub alias: Option<String>,
    /// Optional description for documentation
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Create a new required field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            constraints: Vec::new(),
            alias: None,
            description: None,
        }
    }

    /// Set a stored default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Set a default factory, invoked fresh for every validation run
    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::factory(factory));
        self
    }

    /// Attach a constraint
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Attach several constraints
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Set alias accepted as input key
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// A field is required iff it has neither a default nor a factory
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Fresh default for a payload that omits this field
    pub fn resolve_default(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::resolve)
    }

    /// Whether a payload key addresses this field
    pub fn accepts_key(&self, key: &str) -> bool {
        self.name == key || self.alias.as_deref() == Some(key)
    }
}
