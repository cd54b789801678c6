//! Options controlling how a validation session treats its input.

use serde::{Deserialize, Serialize};

/// Orchestration policy of a validation session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Full rule chains. Empty strings may coerce to the empty marker.
    #[default]
    Chain,
    /// Credential checks. Empty strings count as missing and every field
    /// must carry a real value.
    StrictAuth,
}

/// What to do with a declared field that is absent from the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Every declared field must be present.
    #[default]
    Reject,
    /// In chain mode, a field without a `required` rule may be absent and
    /// is reported as empty.
    AllowOptional,
}

/// Options for a validation session.
///
/// # Example
///
/// ```rust
/// use rules_core::{EvaluationMode, ValidationOptions};
///
/// let options = ValidationOptions::new()
///     .with_mode(EvaluationMode::StrictAuth)
///     .with_fail_fast(true);
/// assert!(options.fail_fast);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Evaluation mode
    pub mode: EvaluationMode,

    /// Stop at the first field whose rules fail instead of collecting all
    pub fail_fast: bool,

    /// Handling of absent fields
    pub missing_fields: MissingFieldPolicy,
}

impl ValidationOptions {
    /// Creates options with default settings (chain mode, collect all).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets fail-fast aggregation.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Sets the missing field policy.
    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }
}
