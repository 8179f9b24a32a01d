//! Modelgate
//!
//! Schema-driven model validation: Pydantic-style coercion, constraint
//! checking, custom and cross-field validation hooks, and structured error
//! reports.
//!
//! # Architecture
//!
//! ```text
//! Constraint  ->  FieldDescriptor  ->  Schema  ->  validate()  ->  Model
//!                                                      |
//!                                                      +-> ValidationErrors
//! ```
//!
//! A validation run never stops at the first problem: every field is
//! processed and every failure is reported with its location.
//!
//! # Example
//!
//! ```rust
//! use modelgate::{Constraint, CrossFieldValidator, FieldDescriptor, FieldType, Schema, Value};
//!
//! let item = Schema::builder("Item")
//!     .field(FieldDescriptor::new("price", FieldType::Float).constraint(Constraint::gt(0)))
//!     .field(FieldDescriptor::new("quantity", FieldType::Int).constraint(Constraint::ge(1)))
//!     .build()
//!     .unwrap();
//!
//! let order = Schema::builder("Order")
//!     .field(FieldDescriptor::new("items", FieldType::list(FieldType::model(item))))
//!     .field(FieldDescriptor::new("total", FieldType::Float))
//!     .validator(
//!         CrossFieldValidator::new("total", |total, data| {
//!             let expected: f64 = data
//!                 .get("items")
//!                 .and_then(Value::as_list)
//!                 .unwrap_or_default()
//!                 .iter()
//!                 .map(|i| i.get("price").and_then(Value::as_f64).unwrap_or(0.0)
//!                     * i.get("quantity").and_then(Value::as_f64).unwrap_or(0.0))
//!                 .sum();
//!             match total.as_f64() {
//!                 Some(t) if (t - expected).abs() < 0.01 => Ok(total.clone()),
//!                 _ => Err(format!("Total must equal sum of items (expected {:?})", expected)),
//!             }
//!         })
//!         .depends_on(["items"]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let ok = order.validate_json(r#"{"items": [{"price": 10, "quantity": 2}], "total": 20.0}"#);
//! assert!(ok.is_ok());
//!
//! let errors = order
//!     .validate_json(r#"{"items": [{"price": 10, "quantity": 2}], "total": 19.99}"#)
//!     .unwrap_err();
//! assert_eq!(errors.errors[0].loc(), "total");
//! ```

pub mod annotation;
pub mod config;
pub mod constraints;
pub mod definition;
pub mod dynamic;
pub mod errors;
pub mod fields;
pub mod formats;
pub mod json_schema;
pub mod model;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validators;

// Re-export commonly used types
pub use annotation::parse_annotation;
pub use config::{ExtraFields, ModelConfig};
pub use constraints::{Constraint, ConstraintKind, CustomCheck, Pattern, Violation};
pub use definition::{DefinitionError, SchemaDocument};
pub use dynamic::{create_model, create_model_with, FieldSpec};
pub use errors::{
    ErrorKind, ModelError, PathSegment, SchemaError, ValidationError, ValidationErrors,
    ValidationResult,
};
pub use fields::{DefaultValue, FieldDescriptor};
pub use formats::StringFormat;
pub use model::Model;
pub use registry::ModelRegistry;
pub use schema::{CrossFieldValidator, FieldValues, Schema, SchemaBuilder};
pub use types::{FieldType, Value};
pub use validators::{check_constraints, coerce};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
