//! Schema documents
//!
//! Models can be declared in YAML or JSON instead of code:
//!
//! ```yaml
//! models:
//!   - name: Address
//!     fields:
//!       - { name: city, type: str, min_length: 1 }
//!   - name: User
//!     config: { extra: forbid }
//!     fields:
//!       - { name: name, type: str, min_length: 1, max_length: 50 }
//!       - { name: age, type: int, ge: 0, le: 150 }
//!       - { name: address, type: "Optional[Address]", default: null }
//!       - { name: tags, type: "list[str]", default_factory: list }
//! ```
//!
//! Models are built in document order, so a model may reference any model
//! declared before it.

use crate::annotation::parse_annotation;
use crate::config::{ExtraFields, ModelConfig};
use crate::constraints::Constraint;
use crate::dynamic::FieldSpec;
use crate::errors::{SchemaError, ValidationErrors};
use crate::formats::StringFormat;
use crate::registry::ModelRegistry;
use crate::schema::Schema;
use crate::types::Value;
use crate::validators::coerce;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure to load or build a schema document
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Failed to read schema document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML schema document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Malformed type annotation '{0}'")]
    MalformedAnnotation(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Model '{0}' is defined more than once")]
    DuplicateModel(String),

    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("Field '{model}.{field}' cannot set both default and default_factory")]
    ConflictingDefaults { model: String, field: String },

    #[error("Invalid default for '{model}.{field}': {source}")]
    InvalidDefault {
        model: String,
        field: String,
        #[source]
        source: ValidationErrors,
    },
}

// ============================================================================
// Document Types
// ============================================================================

/// A document declaring one or more models
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub models: Vec<ModelDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: ConfigDefinition,
    pub fields: Vec<FieldDefinition>,
}

/// The `config` block of a model (like `model_config = ConfigDict(...)`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDefinition {
    #[serde(default)]
    pub extra: ExtraFields,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub validate_assignment: bool,
    #[serde(default)]
    pub str_strip_whitespace: bool,
}

impl From<&ConfigDefinition> for ModelConfig {
    fn from(def: &ConfigDefinition) -> Self {
        ModelConfig::new()
            .extra(def.extra)
            .frozen(def.frozen)
            .validate_assignment(def.validate_assignment)
            .strip_whitespace(def.str_strip_whitespace)
    }
}

/// One field: annotation plus `Field(...)` keywords
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub annotation: String,
    #[serde(default, deserialize_with = "explicit_value")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub default_factory: Option<DefaultFactory>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub gt: Option<NumberBound>,
    #[serde(default)]
    pub ge: Option<NumberBound>,
    #[serde(default)]
    pub lt: Option<NumberBound>,
    #[serde(default)]
    pub le: Option<NumberBound>,
    #[serde(default)]
    pub multiple_of: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub format: Option<StringFormat>,
    #[serde(default)]
    pub choices: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub non_empty: bool,
}

/// Numeric bound keeping integer bounds exact
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberBound {
    Int(i64),
    Float(f64),
}

impl From<NumberBound> for Value {
    fn from(bound: NumberBound) -> Self {
        match bound {
            NumberBound::Int(i) => Value::Int(i),
            NumberBound::Float(f) => Value::Float(f),
        }
    }
}

/// Builtin factories available to documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultFactory {
    List,
    Dict,
}

impl DefaultFactory {
    fn produce(self) -> Value {
        match self {
            Self::List => Value::List(Vec::new()),
            Self::Dict => Value::Object(Vec::new()),
        }
    }
}

/// Keeps an explicit `default: null` distinct from an absent default
fn explicit_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// Loading and Building
// ============================================================================

impl SchemaDocument {
    pub fn from_yaml(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a document; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Build every model in document order
    pub fn build(&self) -> Result<ModelRegistry, DefinitionError> {
        let mut registry = ModelRegistry::new();
        for model in &self.models {
            let schema = model.build(&registry)?;
            registry.insert(schema)?;
        }
        tracing::debug!(models = registry.len(), "schema document built");
        Ok(registry)
    }
}

impl ModelDefinition {
    fn build(&self, registry: &ModelRegistry) -> Result<Arc<Schema>, DefinitionError> {
        if registry.get(&self.name).is_some() {
            return Err(DefinitionError::DuplicateModel(self.name.clone()));
        }
        let config = ModelConfig::from(&self.config);
        let mut builder = Schema::builder(&self.name).config(config.clone());
        if let Some(desc) = &self.description {
            builder = builder.description(desc.clone());
        }
        for field in &self.fields {
            let spec = field.to_spec(&self.name, &config, registry)?;
            builder = builder.field(spec.into_descriptor(&field.name));
        }
        Ok(builder.build()?)
    }
}

impl FieldDefinition {
    fn to_spec(&self, model: &str, config: &ModelConfig, registry: &ModelRegistry) -> Result<FieldSpec, DefinitionError> {
        let field_type = parse_annotation(&self.annotation, registry)?;

        let mut spec = match (&self.default, self.default_factory) {
            (Some(_), Some(_)) => {
                return Err(DefinitionError::ConflictingDefaults {
                    model: model.to_string(),
                    field: self.name.clone(),
                })
            }
            (None, Some(factory)) => FieldSpec::with_factory(field_type.clone(), move || factory.produce()),
            (Some(raw), None) => {
                let value = coerce(&Value::from(raw.clone()), &field_type, config).map_err(|source| {
                    DefinitionError::InvalidDefault {
                        model: model.to_string(),
                        field: self.name.clone(),
                        source,
                    }
                })?;
                FieldSpec::with_default(field_type.clone(), value)
            }
            (None, None) => FieldSpec::required(field_type.clone()),
        };

        spec = spec.constraints(self.constraints()?);
        if let Some(alias) = &self.alias {
            spec = spec.alias(alias.clone());
        }
        if let Some(desc) = &self.description {
            spec = spec.description(desc.clone());
        }
        Ok(spec)
    }

    /// Constraints in keyword order: lengths, bounds, multiple, pattern,
    /// format, choices, non-empty
    fn constraints(&self) -> Result<Vec<Constraint>, DefinitionError> {
        let mut constraints = Vec::new();
        if let Some(n) = self.min_length {
            constraints.push(Constraint::min_length(n));
        }
        if let Some(n) = self.max_length {
            constraints.push(Constraint::max_length(n));
        }
        if let Some(bound) = self.gt {
            constraints.push(Constraint::gt(bound));
        }
        if let Some(bound) = self.ge {
            constraints.push(Constraint::ge(bound));
        }
        if let Some(bound) = self.lt {
            constraints.push(Constraint::lt(bound));
        }
        if let Some(bound) = self.le {
            constraints.push(Constraint::le(bound));
        }
        if let Some(n) = self.multiple_of {
            constraints.push(Constraint::multiple_of(n));
        }
        if let Some(pattern) = &self.pattern {
            constraints.push(Constraint::pattern(pattern.as_str())?);
        }
        if let Some(format) = self.format {
            constraints.push(Constraint::format(format));
        }
        if let Some(choices) = &self.choices {
            constraints.push(Constraint::one_of(choices.iter().cloned().map(Value::from)));
        }
        if self.non_empty {
            constraints.push(Constraint::NonEmpty);
        }
        Ok(constraints)
    }
}
