//! Error types for rule definitions and lookups.
//!
//! A [`ConfigError`] always points at a defect in a field specification
//! (a typo in a rule name, a missing argument, a rule applied to a value it
//! cannot handle). It is never caused by user input and should be treated
//! as a programming mistake.

use thiserror::Error;

/// Result type for rule definition operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Defect in a field specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Rule name is not part of the catalog
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    /// Rule segment could not be parsed or has the wrong arguments
    #[error("Malformed rule '{rule}': {reason}")]
    MalformedRule {
        /// The offending rule segment as written
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// Same field declared twice in one specification
    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    /// Rule applied to a value shape it does not support
    #[error("{field} must be a string or integer for {rule} validation.")]
    UnsupportedShape {
        /// Field being validated
        field: String,
        /// Rule name
        rule: String,
        /// Type name of the value the rule received
        shape: String,
    },

    /// `exists` target rejected by the lookup gateway
    #[error("Invalid lookup target in rule for field '{field}': {reason}")]
    InvalidTarget {
        /// Field being validated
        field: String,
        /// Gateway explanation
        reason: String,
    },
}

impl ConfigError {
    /// Creates a new malformed rule error.
    pub fn malformed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new unsupported shape error.
    pub fn unsupported_shape(
        field: impl Into<String>,
        rule: impl Into<String>,
        shape: impl Into<String>,
    ) -> Self {
        Self::UnsupportedShape {
            field: field.into(),
            rule: rule.into(),
            shape: shape.into(),
        }
    }
}

/// Errors reported by a [`crate::LookupGateway`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The gateway does not know the table
    #[error("Invalid table specified in validation rule: {0}.")]
    UnsupportedTable(String),

    /// The table cannot be searched by this identifier column
    #[error("Identifier is not valid: {identifier} (table {table})")]
    UnsupportedIdentifier {
        /// Table name
        table: String,
        /// Identifier column
        identifier: String,
    },

    /// The backing store failed
    #[error("Lookup backend failure: {0}")]
    Backend(String),
}

impl LookupError {
    /// Returns true if the error comes from the rule definition rather than
    /// the backing store.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            LookupError::UnsupportedTable(_) | LookupError::UnsupportedIdentifier { .. }
        )
    }
}
