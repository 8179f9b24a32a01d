//! Constraint primitives attached to fields
//!
//! Every constraint exposes [`Constraint::check`], which either passes the
//! (possibly transformed) value through or reports a [`Violation`]. The
//! engine runs all constraints of a field in declaration order and keeps
//! every failure.

use crate::errors::SchemaError;
use crate::formats::StringFormat;
use crate::types::Value;
use regex::Regex;
use serde::Serialize;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Signature of a custom field check: returns the value to keep or a message
pub type CheckFn = dyn Fn(&Value) -> Result<Value, String> + Send + Sync;

// ============================================================================
// Constraint Kind
// ============================================================================

/// Which constraint produced a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    Pattern,
    NonEmpty,
    OneOf,
    MultipleOf,
    Format,
    Custom,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Pattern => "pattern",
            Self::NonEmpty => "non_empty",
            Self::OneOf => "one_of",
            Self::MultipleOf => "multiple_of",
            Self::Format => "format",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A failed constraint check
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ConstraintKind,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ConstraintKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// Pattern
// ============================================================================

/// Regular expression that must match the whole string
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern; the expression is anchored at both ends
    pub fn new(source: impl Into<String>) -> Result<Self, SchemaError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            SchemaError::InvalidPattern {
                pattern: source.clone(),
                source: e,
            }
        })?;
        Ok(Self { source, regex })
    }

    /// The expression as written by the caller
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

// ============================================================================
// Custom Check
// ============================================================================

/// Caller-supplied predicate over a single value (like `@field_validator`)
#[derive(Clone)]
pub struct CustomCheck {
    name: String,
    check: Arc<CheckFn>,
}

impl CustomCheck {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the predicate; a panic is reported as `Err` with its message
    pub fn run(&self, value: &Value) -> Result<Value, String> {
        catch_hook(&self.name, || (self.check)(value)).and_then(|outcome| outcome)
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomCheck").field(&self.name).finish()
    }
}

/// Run third-party hook code, turning a panic into `Err(message)`
pub(crate) fn catch_hook<T>(name: &str, hook: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(hook)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::warn!(hook = name, %message, "validator hook panicked");
        format!("Assertion failed, {}", message)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "validator panicked".to_string()
    }
}

// ============================================================================
// Constraint
// ============================================================================

/// A named rule a coerced value must satisfy
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Minimum length (characters for strings, items for collections)
    MinLength(usize),
    /// Maximum length (characters for strings, items for collections)
    MaxLength(usize),
    /// Lower bound; `inclusive` selects `ge` over `gt`
    Minimum { bound: Value, inclusive: bool },
    /// Upper bound; `inclusive` selects `le` over `lt`
    Maximum { bound: Value, inclusive: bool },
    /// Full-match regular expression
    Pattern(Pattern),
    /// String or collection must not be empty
    NonEmpty,
    /// Value must equal one of the listed values
    OneOf(Vec<Value>),
    /// Numeric value must be a multiple of this number
    MultipleOf(f64),
    /// Predefined string format
    Format(StringFormat),
    /// Caller-supplied predicate
    Custom(CustomCheck),
}

impl Constraint {
    pub fn min_length(n: usize) -> Self {
        Self::MinLength(n)
    }

    pub fn max_length(n: usize) -> Self {
        Self::MaxLength(n)
    }

    /// `>= bound`
    pub fn ge(bound: impl Into<Value>) -> Self {
        Self::Minimum {
            bound: bound.into(),
            inclusive: true,
        }
    }

    /// `> bound`
    pub fn gt(bound: impl Into<Value>) -> Self {
        Self::Minimum {
            bound: bound.into(),
            inclusive: false,
        }
    }

    /// `<= bound`
    pub fn le(bound: impl Into<Value>) -> Self {
        Self::Maximum {
            bound: bound.into(),
            inclusive: true,
        }
    }

    /// `< bound`
    pub fn lt(bound: impl Into<Value>) -> Self {
        Self::Maximum {
            bound: bound.into(),
            inclusive: false,
        }
    }

    pub fn pattern(source: impl Into<String>) -> Result<Self, SchemaError> {
        Pattern::new(source).map(Self::Pattern)
    }

    pub fn one_of(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn multiple_of(n: f64) -> Self {
        Self::MultipleOf(n)
    }

    pub fn format(format: StringFormat) -> Self {
        Self::Format(format)
    }

    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::Custom(CustomCheck::new(name, check))
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::MinLength(_) => ConstraintKind::MinLength,
            Self::MaxLength(_) => ConstraintKind::MaxLength,
            Self::Minimum { .. } => ConstraintKind::Minimum,
            Self::Maximum { .. } => ConstraintKind::Maximum,
            Self::Pattern(_) => ConstraintKind::Pattern,
            Self::NonEmpty => ConstraintKind::NonEmpty,
            Self::OneOf(_) => ConstraintKind::OneOf,
            Self::MultipleOf(_) => ConstraintKind::MultipleOf,
            Self::Format(_) => ConstraintKind::Format,
            Self::Custom(_) => ConstraintKind::Custom,
        }
    }

    /// Check a value, returning the value to keep.
    ///
    /// Built-in constraints only apply to values of a compatible kind (a
    /// length bound ignores integers, a pattern ignores lists, and so on) and
    /// return the value unchanged. Only `Custom` may transform it.
    pub fn check(&self, value: Value) -> Result<Value, Violation> {
        match self {
            Self::MinLength(min) => match value.length() {
                Some(len) if len < *min => Err(Violation::new(
                    ConstraintKind::MinLength,
                    format!("{} should have at least {}", noun(&value), count(*min, &value)),
                )),
                _ => Ok(value),
            },
            Self::MaxLength(max) => match value.length() {
                Some(len) if len > *max => Err(Violation::new(
                    ConstraintKind::MaxLength,
                    format!("{} should have at most {}", noun(&value), count(*max, &value)),
                )),
                _ => Ok(value),
            },
            Self::Minimum { bound, inclusive } => match value.compare(bound) {
                Some(Ordering::Less) => Err(lower_bound_violation(bound, *inclusive)),
                Some(Ordering::Equal) if !inclusive => Err(lower_bound_violation(bound, false)),
                None if both_numeric(&value, bound) => Err(lower_bound_violation(bound, *inclusive)),
                _ => Ok(value),
            },
            Self::Maximum { bound, inclusive } => match value.compare(bound) {
                Some(Ordering::Greater) => Err(upper_bound_violation(bound, *inclusive)),
                Some(Ordering::Equal) if !inclusive => Err(upper_bound_violation(bound, false)),
                None if both_numeric(&value, bound) => Err(upper_bound_violation(bound, *inclusive)),
                _ => Ok(value),
            },
            Self::Pattern(pattern) => match &value {
                Value::String(s) if !pattern.is_match(s) => Err(Violation::new(
                    ConstraintKind::Pattern,
                    format!("String should match pattern '{}'", pattern.as_str()),
                )),
                _ => Ok(value),
            },
            Self::NonEmpty => match value.length() {
                Some(0) => Err(Violation::new(
                    ConstraintKind::NonEmpty,
                    format!("{} should not be empty", noun(&value)),
                )),
                _ => Ok(value),
            },
            Self::OneOf(allowed) => {
                if value.is_null() || allowed.contains(&value) {
                    Ok(value)
                } else {
                    let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                    Err(Violation::new(
                        ConstraintKind::OneOf,
                        format!("Input should be {}", names.join(" or ")),
                    ))
                }
            }
            Self::MultipleOf(multiple) => match value.as_f64() {
                Some(n) if !is_multiple(n, *multiple) => Err(Violation::new(
                    ConstraintKind::MultipleOf,
                    format!("Input should be a multiple of {}", multiple),
                )),
                _ => Ok(value),
            },
            Self::Format(format) => match &value {
                Value::String(s) if !format.matches(s) => Err(Violation::new(
                    ConstraintKind::Format,
                    format!("Input should be a valid {}", format.describe()),
                )),
                _ => Ok(value),
            },
            Self::Custom(check) => check
                .run(&value)
                .map_err(|message| Violation::new(ConstraintKind::Custom, message)),
        }
    }
}

fn noun(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "String",
        Value::List(_) => "List",
        _ => "Dictionary",
    }
}

fn count(n: usize, value: &Value) -> String {
    let unit = match value {
        Value::String(_) => "character",
        _ => "item",
    };
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Unordered numbers (NaN on either side) never satisfy a bound
fn both_numeric(value: &Value, bound: &Value) -> bool {
    value.as_f64().is_some() && bound.as_f64().is_some()
}

fn lower_bound_violation(bound: &Value, inclusive: bool) -> Violation {
    let relation = if inclusive {
        "greater than or equal to"
    } else {
        "greater than"
    };
    Violation::new(
        ConstraintKind::Minimum,
        format!("Input should be {} {}", relation, bound_text(bound)),
    )
}

fn upper_bound_violation(bound: &Value, inclusive: bool) -> Violation {
    let relation = if inclusive {
        "less than or equal to"
    } else {
        "less than"
    };
    Violation::new(
        ConstraintKind::Maximum,
        format!("Input should be {} {}", relation, bound_text(bound)),
    )
}

fn bound_text(bound: &Value) -> String {
    match bound {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_multiple(n: f64, multiple: f64) -> bool {
    if multiple == 0.0 {
        return true;
    }
    let ratio = n / multiple;
    (ratio - ratio.round()).abs() < 1e-9
}
