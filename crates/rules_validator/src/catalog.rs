//! Rule catalog: the fixed table from rule kind to executor and message.

use crate::ValidationError;
use crate::rules::{self, Measure, RuleContext, RuleOutcome};
use rules_core::{ConfigError, RuleDirective, RuleKind, Value};

/// Evaluates one rule against the value produced by the previous one.
pub type Executor = fn(&RuleContext<'_>, &Value) -> Result<RuleOutcome, ValidationError>;

/// Renders the failure message of one rule.
pub type MessageTemplate = fn(&MessageContext<'_>) -> Result<String, ConfigError>;

/// Inputs of a message template.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    /// Field that failed
    pub field: &'a str,
    /// Directive that failed
    pub directive: &'a RuleDirective,
    /// Value the directive saw
    pub value: &'a Value,
}

/// Executor and message template of a rule kind.
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    /// Rule the entry belongs to
    pub kind: RuleKind,
    /// Function that runs the rule against a value
    pub executor: Executor,
    /// Function that renders the failure message
    pub message: MessageTemplate,
}

/// Registry of every supported rule.
///
/// The table is closed: adding a rule means adding a [`RuleKind`] variant,
/// and the exhaustive match in [`RuleCatalog::entry`] then requires an
/// executor and a message for it.
pub struct RuleCatalog;

impl RuleCatalog {
    /// Resolves a rule name.
    ///
    /// ```rust
    /// use rules_validator::RuleCatalog;
    /// use rules_core::RuleKind;
    ///
    /// assert_eq!(RuleCatalog::resolve("exists").unwrap(), RuleKind::Exists);
    /// assert!(RuleCatalog::resolve("integer").is_err());
    /// ```
    pub fn resolve(name: &str) -> Result<RuleKind, ConfigError> {
        name.parse()
    }

    /// Returns the entry for a rule kind.
    pub fn entry(kind: RuleKind) -> CatalogEntry {
        let (executor, message): (Executor, MessageTemplate) = match kind {
            RuleKind::Required => (rules::required, required_message),
            RuleKind::StringType => (rules::string, string_message),
            RuleKind::IntType => (rules::int, int_message),
            RuleKind::Float => (rules::float, float_message),
            RuleKind::Min => (rules::min, min_message),
            RuleKind::Max => (rules::max, max_message),
            RuleKind::Exists => (rules::exists, exists_message),
            RuleKind::Email => (rules::email, email_message),
            RuleKind::Password => (rules::password, password_message),
            RuleKind::Date => (rules::date, date_message),
        };
        CatalogEntry {
            kind,
            executor,
            message,
        }
    }

    /// Runs the executor of `ctx.directive` on `value`.
    pub fn execute(ctx: &RuleContext<'_>, value: &Value) -> Result<RuleOutcome, ValidationError> {
        (Self::entry(ctx.directive.kind()).executor)(ctx, value)
    }

    /// Renders the failure message of `directive` for `field`, given the
    /// value the directive saw.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedShape`] when a `min`/`max` message
    /// is requested for a value that is neither a string nor an integer.
    pub fn message_for(
        kind: RuleKind,
        field: &str,
        directive: &RuleDirective,
        value: &Value,
    ) -> Result<String, ConfigError> {
        let ctx = MessageContext {
            field,
            directive,
            value,
        };
        (Self::entry(kind).message)(&ctx)
    }
}

fn required_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!("{} is required.", ctx.field))
}

fn string_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!("{} must be a string.", ctx.field))
}

fn int_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!("{} must be an integer.", ctx.field))
}

fn float_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!("{} must be a number.", ctx.field))
}

fn min_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    bound_message(ctx, "at least")
}

fn max_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    bound_message(ctx, "at most")
}

fn bound_message(ctx: &MessageContext<'_>, relation: &str) -> Result<String, ConfigError> {
    let bound = ctx.directive.arg(0).unwrap_or_default();
    match Measure::of(ctx.value) {
        Some(Measure::Length) => Ok(format!(
            "{} must be {} {} characters.",
            ctx.field, relation, bound
        )),
        Some(Measure::Magnitude) => Ok(format!("{} must be {} {}.", ctx.field, relation, bound)),
        None => Err(ConfigError::unsupported_shape(
            ctx.field,
            ctx.directive.kind().name(),
            ctx.value.type_name(),
        )),
    }
}

fn exists_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    match ctx.directive.lookup_target() {
        Some(("users", _)) => Ok(format!("{} does not exist.", ctx.value)),
        Some((table, _)) => Ok(format!("{} does not exist.", table_label(table))),
        None => Err(ConfigError::malformed(
            ctx.directive.to_string(),
            "expects a table and an identifier column",
        )),
    }
}

fn email_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!("{} must be a valid email address.", ctx.field))
}

fn password_message(_ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok("The provided value is not a valid password.".to_string())
}

fn date_message(ctx: &MessageContext<'_>) -> Result<String, ConfigError> {
    Ok(format!(
        "Invalid date format for {}. Required format: Y-m-d",
        ctx.value
    ))
}

/// `posts` -> `Post`, `conversations` -> `Conversation`.
fn table_label(table: &str) -> String {
    let singular = table.strip_suffix('s').unwrap_or(table);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn directive(kind: RuleKind, args: &[&str]) -> RuleDirective {
        RuleDirective::new(kind, args.iter().map(|a| a.to_string()).collect()).unwrap()
    }

    fn message(kind: RuleKind, args: &[&str], field: &str, value: Value) -> String {
        RuleCatalog::message_for(kind, field, &directive(kind, args), &value).unwrap()
    }

    #[test]
    fn test_every_kind_has_an_entry() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleCatalog::entry(kind).kind, kind);
            assert_eq!(RuleCatalog::resolve(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(
            RuleCatalog::resolve("numeric").unwrap_err(),
            ConfigError::UnknownRule("numeric".into())
        );
    }

    #[test]
    fn test_simple_messages() {
        let v = Value::String("x".into());
        assert_eq!(
            message(RuleKind::Required, &[], "username", v.clone()),
            "username is required."
        );
        assert_eq!(
            message(RuleKind::StringType, &[], "username", v.clone()),
            "username must be a string."
        );
        assert_eq!(message(RuleKind::IntType, &[], "age", v.clone()), "age must be an integer.");
        assert_eq!(message(RuleKind::Float, &[], "lat", v.clone()), "lat must be a number.");
        assert_eq!(
            message(RuleKind::Email, &[], "email", v.clone()),
            "email must be a valid email address."
        );
        assert_eq!(
            message(RuleKind::Password, &[], "password", v),
            "The provided value is not a valid password."
        );
    }

    #[test]
    fn test_bound_messages_follow_value_shape() {
        assert_eq!(
            message(RuleKind::Min, &["1"], "username", Value::String(String::new())),
            "username must be at least 1 characters."
        );
        assert_eq!(
            message(RuleKind::Max, &["20"], "username", Value::String("x".repeat(21))),
            "username must be at most 20 characters."
        );
        assert_eq!(
            message(RuleKind::Min, &["1"], "age", Value::Int(0)),
            "age must be at least 1."
        );
        assert_eq!(
            message(RuleKind::Max, &["100"], "age", Value::Int(101)),
            "age must be at most 100."
        );

        let err = RuleCatalog::message_for(
            RuleKind::Max,
            "flag",
            &directive(RuleKind::Max, &["1"]),
            &Value::Bool(true),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "flag must be a string or integer for max validation."
        );
    }

    #[test]
    fn test_exists_messages() {
        assert_eq!(
            message(RuleKind::Exists, &["users", "username"], "user", Value::String("bob".into())),
            "bob does not exist."
        );
        assert_eq!(
            message(RuleKind::Exists, &["posts", "id"], "post_id", Value::Int(9)),
            "Post does not exist."
        );
        assert_eq!(
            message(RuleKind::Exists, &["conversations", "id"], "conversation_id", Value::Int(3)),
            "Conversation does not exist."
        );
    }

    #[test]
    fn test_date_message_quotes_value() {
        assert_eq!(
            message(RuleKind::Date, &[], "birthday", Value::String("2024-02-30".into())),
            "Invalid date format for 2024-02-30. Required format: Y-m-d"
        );
    }

    #[test]
    fn test_table_label() {
        assert_eq!(table_label("notifications"), "Notification");
        assert_eq!(table_label("media"), "Media");
        assert_eq!(table_label(""), "");
    }
}
