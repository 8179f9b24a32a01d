//! Validated model instances

use crate::errors::ModelError;
use crate::schema::Schema;
use crate::types::Value;
use crate::validators;
use std::fmt;
use std::sync::Arc;

/// A payload that passed validation against its schema
///
/// Values are held in field-declaration order; extras kept under
/// `ExtraFields::Allow` follow the declared fields.
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<Schema>,
    values: Vec<(String, Value)>,
    extras: Vec<(String, Value)>,
}

impl Model {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<(String, Value)>, extras: Vec<(String, Value)>) -> Self {
        Self {
            schema,
            values,
            extras,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get a field (or kept extra) by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .chain(&self.extras)
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Declared fields in order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Extra payload keys kept by the `allow` policy
    pub fn extras(&self) -> &[(String, Value)] {
        &self.extras
    }

    /// Ordered mapping of every field; nested models are nested mappings
    pub fn to_mapping(&self) -> Value {
        Value::Object(self.values.iter().chain(&self.extras).cloned().collect())
    }

    /// Mapping as a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.to_mapping())
    }

    /// Deterministic compact JSON text
    pub fn to_text(&self) -> String {
        self.to_json().to_string()
    }

    /// Indented JSON text
    pub fn to_text_pretty(&self) -> String {
        format!("{:#}", self.to_json())
    }

    /// Assign a field value.
    ///
    /// Frozen models reject every assignment. With `validate_assignment` the
    /// value is coerced, constraint-checked and passed through every
    /// cross-field validator that references the field; on any failure the
    /// model is left unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let config = self.schema.config();
        if config.frozen {
            return Err(ModelError::Frozen {
                model: self.schema.name().to_string(),
                field: name.to_string(),
            });
        }

        let Some(field) = self.schema.field(name) else {
            return Err(ModelError::UnknownField {
                model: self.schema.name().to_string(),
                field: name.to_string(),
            });
        };

        let value = value.into();
        if config.validate_assignment {
            self.values = validators::validate_assignment(&self.schema, &self.values, field, &value)?;
        } else if let Some(slot) = self.values.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        }
        Ok(())
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.values == other.values
            && self.extras == other.extras
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .values
            .iter()
            .chain(&self.extras)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}({})", self.schema.name(), fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::constraints::Constraint;
    use crate::fields::FieldDescriptor;
    use crate::types::FieldType;

    fn user_schema(config: ModelConfig) -> Arc<Schema> {
        Schema::builder("User")
            .field(FieldDescriptor::new("name", FieldType::Str))
            .field(FieldDescriptor::new("age", FieldType::Int).constraint(Constraint::ge(0)))
            .config(config)
            .build()
            .unwrap()
    }

    fn payload() -> Value {
        Value::object([("name", Value::from("Ada")), ("age", Value::Int(36))])
    }

    #[test]
    fn test_display_is_python_like() {
        let user = user_schema(ModelConfig::default()).validate(&payload()).unwrap();
        assert_eq!(user.to_string(), "User(name='Ada', age=36)");
    }

    #[test]
    fn test_set_without_validation_assigns_raw() {
        let mut user = user_schema(ModelConfig::default()).validate(&payload()).unwrap();
        user.set("age", "not a number").unwrap();
        assert_eq!(user.get("age"), Some(&Value::from("not a number")));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut user = user_schema(ModelConfig::default()).validate(&payload()).unwrap();
        let err = user.set("email", "a@b.c").unwrap_err();
        assert!(matches!(err, ModelError::UnknownField { .. }));
    }

    #[test]
    fn test_frozen_rejects_set() {
        let schema = user_schema(ModelConfig::new().frozen(true));
        let mut user = schema.validate(&payload()).unwrap();
        let err = user.set("name", "Bob").unwrap_err();
        assert!(matches!(err, ModelError::Frozen { .. }));
        assert_eq!(user.get("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn test_validated_set_coerces() {
        let schema = user_schema(ModelConfig::new().validate_assignment(true));
        let mut user = schema.validate(&payload()).unwrap();
        user.set("age", "40").unwrap();
        assert_eq!(user.get("age"), Some(&Value::Int(40)));

        let err = user.set("age", -1).unwrap_err();
        assert!(matches!(err, ModelError::Validation(ref e) if e.len() == 1));
        assert_eq!(user.get("age"), Some(&Value::Int(40)));
    }
}
