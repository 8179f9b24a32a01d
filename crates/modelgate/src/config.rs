//! Per-model behavior switches: extra-key policy, immutability, assignment
//! validation and string stripping.

use serde::Deserialize;

// ============================================================================
// Extra Field Handling
// ============================================================================

/// How to handle payload keys not declared in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFields {
    /// Drop extra keys (default)
    #[default]
    Ignore,
    /// Keep extra keys and include them in output after declared fields
    Allow,
    /// Reject extra keys (validation error)
    Forbid,
}

// ============================================================================
// Model Config
// ============================================================================

/// Configuration options for a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    /// Policy for undeclared payload keys
    pub extra: ExtraFields,

    /// Reject every assignment after construction
    pub frozen: bool,

    /// Re-validate values on assignment (mutable models only)
    pub validate_assignment: bool,

    /// Strip leading/trailing whitespace from string inputs
    pub str_strip_whitespace: bool,
}

impl ModelConfig {
    /// Create a new config with defaults (mutable, extras ignored)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extra field handling
    pub fn extra(mut self, extra: ExtraFields) -> Self {
        self.extra = extra;
        self
    }

    /// Forbid extra fields
    pub fn forbid_extra(self) -> Self {
        self.extra(ExtraFields::Forbid)
    }

    /// Allow extra fields
    pub fn allow_extra(self) -> Self {
        self.extra(ExtraFields::Allow)
    }

    /// Make instances immutable
    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// Enable assignment validation
    pub fn validate_assignment(mut self, validate: bool) -> Self {
        self.validate_assignment = validate;
        self
    }

    /// Enable string whitespace stripping
    pub fn strip_whitespace(mut self, strip: bool) -> Self {
        self.str_strip_whitespace = strip;
        self
    }

    pub fn is_mutable(&self) -> bool {
        !self.frozen
    }

    /// Whether unknown payload keys are accepted
    pub fn allows_extra_fields(&self) -> bool {
        self.extra != ExtraFields::Forbid
    }

    /// Process a string input according to config
    pub fn process_string(&self, s: &str) -> String {
        if self.str_strip_whitespace {
            s.trim().to_string()
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.extra, ExtraFields::Ignore);
        assert!(config.is_mutable());
        assert!(config.allows_extra_fields());
        assert!(!config.validate_assignment);
    }

    #[test]
    fn test_config_builder() {
        let config = ModelConfig::new()
            .forbid_extra()
            .frozen(true)
            .strip_whitespace(true);

        assert!(!config.allows_extra_fields());
        assert!(!config.is_mutable());
        assert_eq!(config.process_string("  HELLO  "), "HELLO");
    }
}
