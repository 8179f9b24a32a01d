//! Format validation for common string patterns
//!
//! Pre-compiled regex validators for email, URL, UUID and date/time text,
//! attached to fields through [`Constraint::Format`](crate::Constraint).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

/// URL regex pattern (http/https)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern compiles")
});

/// UUID regex pattern (any version, hyphenated)
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-8][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern compiles")
});

/// Date regex pattern (YYYY-MM-DD)
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("date pattern compiles")
});

/// Time regex pattern (HH:MM:SS with optional fractional seconds)
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d):([0-5]\d)(\.\d{1,9})?$").expect("time pattern compiles")
});

// ============================================================================
// String Formats
// ============================================================================

/// Predefined string format validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// Email address
    Email,
    /// URL (http/https)
    Url,
    /// Hyphenated UUID
    Uuid,
    /// Date (YYYY-MM-DD)
    Date,
    /// Time (HH:MM:SS)
    Time,
}

impl StringFormat {
    /// Check a string against this format
    ///
    /// # Example
    /// ```
    /// use modelgate::formats::StringFormat;
    ///
    /// assert!(StringFormat::Email.matches("user@example.com"));
    /// assert!(!StringFormat::Email.matches("invalid-email"));
    /// ```
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Email => EMAIL_REGEX.is_match(value),
            Self::Url => URL_REGEX.is_match(value),
            Self::Uuid => UUID_REGEX.is_match(value),
            Self::Date => DATE_REGEX.is_match(value),
            Self::Time => TIME_REGEX.is_match(value),
        }
    }

    /// Name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Email => "email address",
            Self::Url => "URL",
            Self::Uuid => "UUID",
            Self::Date => "date (YYYY-MM-DD)",
            Self::Time => "time (HH:MM:SS)",
        }
    }

    /// JSON Schema `format` keyword
    pub fn json_schema_format(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "uri",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_schema_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(StringFormat::Email.matches("user@example.com"));
        assert!(StringFormat::Email.matches("test.user+tag@subdomain.example.co.uk"));

        assert!(!StringFormat::Email.matches("invalid-email"));
        assert!(!StringFormat::Email.matches("@example.com"));
        assert!(!StringFormat::Email.matches("user@"));
        assert!(!StringFormat::Email.matches("user@example"));
    }

    #[test]
    fn test_url_validation() {
        assert!(StringFormat::Url.matches("https://example.com"));
        assert!(StringFormat::Url.matches("http://localhost:8080/path?q=1"));

        assert!(!StringFormat::Url.matches("ftp://example.com"));
        assert!(!StringFormat::Url.matches("not-a-url"));
    }

    #[test]
    fn test_uuid_validation() {
        assert!(StringFormat::Uuid.matches("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!StringFormat::Uuid.matches("550e8400e29b41d4a716446655440000"));
    }

    #[test]
    fn test_date_and_time_validation() {
        assert!(StringFormat::Date.matches("2024-01-19"));
        assert!(!StringFormat::Date.matches("2024-13-01"));
        assert!(!StringFormat::Date.matches("01/19/2024"));

        assert!(StringFormat::Time.matches("23:59:59.999"));
        assert!(!StringFormat::Time.matches("25:00:00"));
        assert!(!StringFormat::Time.matches("12:00"));
    }
}
