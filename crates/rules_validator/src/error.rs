//! Error types for validation operations.
//!
//! Three kinds of failure are kept apart:
//!
//! - [`ValidationError::Config`]: the field specification itself is wrong
//! - [`ValidationError::MissingField`]: a declared field was not sent
//! - [`ValidationError::Rules`]: sent values did not satisfy their rules
//!
//! Only the last two are caused by the requester.

use rules_core::ConfigError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The field specification is defective
    #[error("Rule configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A declared field is absent from the input
    #[error("Missing field: {0}")]
    MissingField(String),

    /// One or more fields failed their rules
    #[error("{0}")]
    Rules(FieldErrors),

    /// The lookup gateway failed for a field
    #[error("Lookup failed for field '{field}': {message}")]
    Lookup { field: String, message: String },

    /// A standalone value check failed
    #[error("{0}")]
    InvalidValue(String),
}

impl ValidationError {
    /// Creates a new missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates a new lookup error.
    pub fn lookup(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Returns true if the error points at the field specification.
    pub fn is_config(&self) -> bool {
        matches!(self, ValidationError::Config(_))
    }

    /// Returns true if the error was caused by the request content and can
    /// be reported back to the requester.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingField(_)
                | ValidationError::Rules(_)
                | ValidationError::InvalidValue(_)
        )
    }

    /// Returns the per-field messages of a rule failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationError::Rules(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Per-field failure messages, in field declaration order.
///
/// Serializes to a JSON object mapping field names to messages, and
/// displays as that JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message of a failed field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push((field.into(), message.into()));
    }

    /// Returns the message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Iterates over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Returns the failed field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    /// Returns the number of failed fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
