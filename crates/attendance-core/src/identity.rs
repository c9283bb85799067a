use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pattern accepted by [`Identity::parse`].
const IDENTITY_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._:@-]{0,127}$";

/// Validation errors for caller-supplied identities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Opaque caller identity, compared by equality only.
///
/// The empty string is the *zero identity*. It can be constructed (so that
/// the registry can reject it with a proper error) but never parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the zero identity.
    pub fn zero() -> Self {
        Self(String::new())
    }

    /// Parses an identity, rejecting anything outside the accepted pattern.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !Regex::new(IDENTITY_PATTERN)
            .expect("invalid regex")
            .is_match(&s)
        {
            return Err(ValidationError::PatternMismatch {
                field: "identity",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// True for the zero identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("<zero>")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_forms() {
        for value in ["alice", "org:events", "0xAbC123", "bob@example.org", "a"] {
            assert!(Identity::parse(value).is_ok(), "{value} should parse");
        }
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!(Identity::parse("").is_err());
        assert!(Identity::parse(" alice").is_err());
        assert!(Identity::parse("al ice").is_err());
        assert!(Identity::parse("-leading").is_err());
    }

    #[test]
    fn zero_identity() {
        assert!(Identity::zero().is_zero());
        assert!(Identity::default().is_zero());
        assert!(!Identity::new("alice").is_zero());
        assert_eq!(Identity::zero().to_string(), "<zero>");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::new("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
