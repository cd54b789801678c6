//! Evaluation of a single field's rule chain.

use crate::catalog::RuleCatalog;
use crate::rules::{RuleContext, RuleOutcome};
use crate::ValidationError;
use rules_core::{EvaluationMode, LookupGateway, RawValue, RuleDirective, RuleKind, Value};
use tracing::debug;

/// Outcome of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Every rule matched; carries the coerced value
    Value(Value),
    /// The field is present but empty and no rule objected
    Absent,
    /// A rule did not match; carries the rendered message
    Failure(String),
}

impl ValidationOutcome {
    /// Returns true if the field failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, ValidationOutcome::Failure(_))
    }

    /// Returns the value the field contributes to validated data, or the
    /// failure message.
    pub fn into_value(self) -> Result<Value, String> {
        match self {
            ValidationOutcome::Value(value) => Ok(value),
            ValidationOutcome::Absent => Ok(Value::Empty),
            ValidationOutcome::Failure(message) => Err(message),
        }
    }
}

/// Runs rule chains for individual fields.
pub struct FieldValidator<'a> {
    gateway: &'a dyn LookupGateway,
    mode: EvaluationMode,
}

impl<'a> FieldValidator<'a> {
    /// Creates a field validator.
    pub fn new(gateway: &'a dyn LookupGateway, mode: EvaluationMode) -> Self {
        Self { gateway, mode }
    }

    /// Runs `directives` against `raw`, left to right.
    ///
    /// Each matching rule hands its (possibly coerced) value to the next.
    /// The first rule that does not match stops the chain with a
    /// [`ValidationOutcome::Failure`]. A rule that turns the value into
    /// [`Value::Empty`] stops it with [`ValidationOutcome::Absent`], unless a
    /// `required` rule is still pending later in the chain, which then fails.
    ///
    /// # Errors
    ///
    /// Configuration problems and gateway failures stop evaluation and are
    /// returned as errors.
    pub fn evaluate(
        &self,
        field: &str,
        raw: &RawValue,
        directives: &[RuleDirective],
    ) -> Result<ValidationOutcome, ValidationError> {
        let mut value = Value::from(raw.clone());

        for (index, directive) in directives.iter().enumerate() {
            let ctx = RuleContext {
                field,
                directive,
                mode: self.mode,
                gateway: self.gateway,
            };

            match RuleCatalog::execute(&ctx, &value)? {
                RuleOutcome::Matched(Value::Empty) => {
                    let pending = directives[index + 1..]
                        .iter()
                        .find(|d| d.kind() == RuleKind::Required);
                    if let Some(required) = pending {
                        let message =
                            RuleCatalog::message_for(RuleKind::Required, field, required, &value)?;
                        debug!(field, rule = %required, %message, "empty value is required");
                        return Ok(ValidationOutcome::Failure(message));
                    }
                    debug!(field, rule = %directive, "field is empty, skipping remaining rules");
                    return Ok(ValidationOutcome::Absent);
                }
                RuleOutcome::Matched(next) => value = next,
                RuleOutcome::Unmatched => {
                    let message =
                        RuleCatalog::message_for(directive.kind(), field, directive, &value)?;
                    debug!(field, rule = %directive, %message, "rule failed");
                    return Ok(ValidationOutcome::Failure(message));
                }
            }
        }

        Ok(ValidationOutcome::Value(value))
    }
}
