//! Dynamic model creation
//!
//! Builds schemas at runtime from an ordered list of `(name, spec)` pairs,
//! like Pydantic's `create_model`. The result is the same [`Schema`] a
//! statically declared model produces.

use crate::config::ModelConfig;
use crate::constraints::Constraint;
use crate::errors::SchemaError;
use crate::fields::{DefaultValue, FieldDescriptor};
use crate::schema::{CrossFieldValidator, Schema};
use crate::types::{FieldType, Value};
use std::sync::Arc;

// ============================================================================
// Field Spec
// ============================================================================

/// Type plus default-or-required marker for one dynamic field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    field_type: FieldType,
    default: Option<DefaultValue>,
    constraints: Vec<Constraint>,
    alias: Option<String>,
    description: Option<String>,
}

impl FieldSpec {
    /// Field without a default (`(str, ...)`)
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            default: None,
            constraints: Vec::new(),
            alias: None,
            description: None,
        }
    }

    /// Field with a stored default (`(int, 0)`)
    pub fn with_default(field_type: FieldType, default: impl Into<Value>) -> Self {
        Self {
            default: Some(DefaultValue::Value(default.into())),
            ..Self::required(field_type)
        }
    }

    /// Field with a default factory, invoked per validation run
    pub fn with_factory<F>(field_type: FieldType, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            default: Some(DefaultValue::factory(factory)),
            ..Self::required(field_type)
        }
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Bind the spec to a name
    pub fn into_descriptor(self, name: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            field_type: self.field_type,
            default: self.default,
            constraints: self.constraints,
            alias: self.alias,
            description: self.description,
        }
    }
}

// ============================================================================
// Model Creation
// ============================================================================

/// Create a schema from ordered field specs with the default config
///
/// # Example
///
/// ```
/// use modelgate::{create_model, Constraint, FieldSpec, FieldType, Value};
///
/// let schema = create_model(
///     "DynamicModel",
///     [
///         ("name", FieldSpec::required(FieldType::Str)),
///         ("age", FieldSpec::required(FieldType::Int).constraint(Constraint::gt(0))),
///         ("tags", FieldSpec::with_factory(FieldType::list(FieldType::Str), || Value::List(vec![]))),
///     ],
/// )
/// .unwrap();
///
/// let model = schema
///     .validate(&Value::object([("name", Value::from("Test")), ("age", Value::Int(25))]))
///     .unwrap();
/// assert_eq!(model.to_text(), r#"{"name":"Test","age":25,"tags":[]}"#);
/// ```
pub fn create_model<N, I>(name: impl Into<String>, fields: I) -> Result<Arc<Schema>, SchemaError>
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldSpec)>,
{
    create_model_with(name, ModelConfig::default(), fields, Vec::new())
}

/// Create a schema with an explicit config and cross-field validators
pub fn create_model_with<N, I>(
    name: impl Into<String>,
    config: ModelConfig,
    fields: I,
    validators: Vec<CrossFieldValidator>,
) -> Result<Arc<Schema>, SchemaError>
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldSpec)>,
{
    let mut builder = Schema::builder(name).config(config);
    for (field_name, spec) in fields {
        builder = builder.field(spec.into_descriptor(field_name));
    }
    for validator in validators {
        builder = builder.validator(validator);
    }
    builder.build()
}
