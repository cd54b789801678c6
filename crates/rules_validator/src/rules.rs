//! Rule executors.
//!
//! One function per [`RuleKind`](rules_core::RuleKind). Each executor
//! receives the value produced by the previous rule of the chain and either
//! matches (possibly coercing the value) or does not. Defects in the rule
//! itself are returned as errors, never as a non-match.

use crate::ValidationError;
use chrono::NaiveDate;
use regex::Regex;
use rules_core::{ConfigError, EvaluationMode, LookupGateway, RuleDirective, Value};
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::debug;
use validator::ValidateEmail;

/// Date layout accepted by the `date` rule.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum password length, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;

static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());
static SYMBOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\W_]").unwrap());

/// Result of running one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule accepted the value; carries the value for the next rule
    Matched(Value),
    /// The rule rejected the value
    Unmatched,
}

/// Everything an executor may look at besides the value.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Field being validated
    pub field: &'a str,
    /// Directive being executed
    pub directive: &'a RuleDirective,
    /// Evaluation mode of the session
    pub mode: EvaluationMode,
    /// Gateway for `exists` lookups
    pub gateway: &'a dyn LookupGateway,
}

/// How `min`/`max` measure a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    /// Character count of a string
    Length,
    /// Numeric value of an integer
    Magnitude,
}

impl Measure {
    pub(crate) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Date(_) | Value::Empty => Some(Measure::Length),
            Value::Int(_) => Some(Measure::Magnitude),
            _ => None,
        }
    }
}

type RuleResult = Result<RuleOutcome, ValidationError>;

/// Handles the empty string and the empty marker for rules that let them
/// through in chain mode.
fn empty_input(ctx: &RuleContext<'_>, value: &Value) -> Option<RuleOutcome> {
    match value {
        Value::Empty => Some(RuleOutcome::Matched(Value::Empty)),
        Value::String(s) if s.is_empty() => Some(match ctx.mode {
            EvaluationMode::Chain => RuleOutcome::Matched(Value::Empty),
            EvaluationMode::StrictAuth => RuleOutcome::Unmatched,
        }),
        _ => None,
    }
}

fn matched_if(condition: bool, value: Value) -> RuleOutcome {
    if condition {
        RuleOutcome::Matched(value)
    } else {
        RuleOutcome::Unmatched
    }
}

pub(crate) fn required(_ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    let present = match value {
        Value::Empty => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    Ok(matched_if(present, value.clone()))
}

pub(crate) fn string(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    if let Some(outcome) = empty_input(ctx, value) {
        return Ok(outcome);
    }
    Ok(match value {
        Value::String(s) | Value::Date(s) => RuleOutcome::Matched(Value::String(s.clone())),
        _ => RuleOutcome::Unmatched,
    })
}

pub(crate) fn int(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    if let Some(outcome) = empty_input(ctx, value) {
        return Ok(outcome);
    }
    Ok(match value {
        Value::Int(i) => RuleOutcome::Matched(Value::Int(*i)),
        Value::String(s) => match parse_integer(s) {
            Some(i) => RuleOutcome::Matched(Value::Int(i)),
            None => RuleOutcome::Unmatched,
        },
        _ => RuleOutcome::Unmatched,
    })
}

pub(crate) fn float(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    if let Some(outcome) = empty_input(ctx, value) {
        return Ok(outcome);
    }
    Ok(match value {
        Value::Int(i) => RuleOutcome::Matched(Value::Float(*i as f64)),
        Value::Float(f) if f.is_finite() => RuleOutcome::Matched(Value::Float(*f)),
        Value::String(s) => match parse_float(s) {
            Some(f) => RuleOutcome::Matched(Value::Float(f)),
            None => RuleOutcome::Unmatched,
        },
        _ => RuleOutcome::Unmatched,
    })
}

pub(crate) fn min(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    bounded(ctx, value, Ordering::is_ge)
}

pub(crate) fn max(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    bounded(ctx, value, Ordering::is_le)
}

/// Compares the measure of `value` against the directive's bound.
///
/// Integers are compared exactly against integral bounds; only fractional
/// bounds fall back to floating point.
fn bounded(ctx: &RuleContext<'_>, value: &Value, accept: fn(Ordering) -> bool) -> RuleResult {
    if let Some(outcome) = empty_input(ctx, value) {
        return Ok(outcome);
    }

    let directive = ctx.directive;
    let bound = directive
        .bound()
        .ok_or_else(|| ConfigError::malformed(directive.to_string(), "missing numeric bound"))?;

    let ordering = match (value, directive.integer_bound()) {
        (Value::String(s) | Value::Date(s), _) => (s.chars().count() as f64).partial_cmp(&bound),
        (Value::Int(i), Some(exact)) => Some(i.cmp(&exact)),
        (Value::Int(i), None) => (*i as f64).partial_cmp(&bound),
        (other, _) => {
            return Err(ConfigError::unsupported_shape(
                ctx.field,
                directive.kind().name(),
                other.type_name(),
            )
            .into());
        }
    };

    Ok(matched_if(ordering.is_some_and(accept), value.clone()))
}

pub(crate) fn exists(ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    let (table, identifier) = ctx.directive.lookup_target().ok_or_else(|| {
        ConfigError::malformed(
            ctx.directive.to_string(),
            "expects a table and an identifier column",
        )
    })?;

    debug!(field = ctx.field, table, identifier, "resolving record");

    match ctx.gateway.find_by_table(table, identifier, value) {
        Ok(Some(record)) => Ok(RuleOutcome::Matched(Value::Record(record))),
        Ok(None) => Ok(RuleOutcome::Unmatched),
        Err(err) if err.is_config() => Err(ConfigError::InvalidTarget {
            field: ctx.field.to_string(),
            reason: err.to_string(),
        }
        .into()),
        Err(err) => Err(ValidationError::lookup(ctx.field, err.to_string())),
    }
}

pub(crate) fn email(_ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    Ok(match value {
        Value::String(s) => matched_if(is_valid_email(s), value.clone()),
        _ => RuleOutcome::Unmatched,
    })
}

pub(crate) fn password(_ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    Ok(match value {
        Value::String(s) => matched_if(is_valid_password(s), value.clone()),
        _ => RuleOutcome::Unmatched,
    })
}

pub(crate) fn date(_ctx: &RuleContext<'_>, value: &Value) -> RuleResult {
    Ok(match value.as_str() {
        Some(s) if parse_date(s).is_some() => RuleOutcome::Matched(Value::Date(s.to_string())),
        _ => RuleOutcome::Unmatched,
    })
}

/// Parses an integer the way form filters do: surrounding ASCII whitespace
/// is ignored, one optional sign, no leading zeros, and the value must fit
/// in an `i64`. Decimal points and exponents are rejected.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }

    trimmed.parse().ok()
}

/// Parses a finite decimal number, with optional exponent.
pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E');

    if trimmed.is_empty() || !trimmed.bytes().all(allowed) {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parses a `YYYY-MM-DD` date, rejecting input that does not render back
/// to exactly the same text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == text).then_some(date)
}

/// Checks an email address: standard syntax, a dotted domain, and no
/// control characters.
pub fn is_valid_email(text: &str) -> bool {
    if text.chars().any(char::is_control) {
        return false;
    }
    match text.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            text.validate_email()
        }
        _ => false,
    }
}

/// Checks the password policy: at least eight characters with an uppercase
/// letter, a lowercase letter, a digit and a symbol.
pub fn is_valid_password(text: &str) -> bool {
    text.chars().count() >= PASSWORD_MIN_LENGTH
        && UPPERCASE.is_match(text)
        && LOWERCASE.is_match(text)
        && DIGIT.is_match(text)
        && SYMBOL.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::{LookupError, Record, RuleKind};

    struct Profiles;

    impl LookupGateway for Profiles {
        fn find_by_table(
            &self,
            table: &str,
            identifier: &str,
            key: &Value,
        ) -> Result<Option<rules_core::Record>, LookupError> {
            match (table, identifier) {
                ("users", "username") => Ok((key.as_str() == Some("alice"))
                    .then(|| Record::new("alice".to_string()))),
                ("users", _) => Err(LookupError::UnsupportedIdentifier {
                    table: table.into(),
                    identifier: identifier.into(),
                }),
                ("posts", _) => Err(LookupError::Backend("database unavailable".into())),
                _ => Err(LookupError::UnsupportedTable(table.into())),
            }
        }
    }

    fn directive(kind: RuleKind, args: &[&str]) -> RuleDirective {
        RuleDirective::new(kind, args.iter().map(|a| a.to_string()).collect()).unwrap()
    }

    fn run(
        executor: fn(&RuleContext<'_>, &Value) -> RuleResult,
        directive: &RuleDirective,
        mode: EvaluationMode,
        value: Value,
    ) -> RuleResult {
        let ctx = RuleContext {
            field: "field",
            directive,
            mode,
            gateway: &Profiles,
        };
        executor(&ctx, &value)
    }

    fn chain(
        executor: fn(&RuleContext<'_>, &Value) -> RuleResult,
        d: &RuleDirective,
        value: Value,
    ) -> RuleOutcome {
        run(executor, d, EvaluationMode::Chain, value).unwrap()
    }

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn test_required() {
        let d = directive(RuleKind::Required, &[]);
        assert_eq!(chain(required, &d, s("")), RuleOutcome::Unmatched);
        assert_eq!(chain(required, &d, Value::Empty), RuleOutcome::Unmatched);
        assert_eq!(chain(required, &d, s("0")), RuleOutcome::Matched(s("0")));
        assert_eq!(chain(required, &d, Value::Int(0)), RuleOutcome::Matched(Value::Int(0)));
    }

    #[test]
    fn test_string_empty_depends_on_mode() {
        let d = directive(RuleKind::StringType, &[]);
        assert_eq!(chain(string, &d, s("")), RuleOutcome::Matched(Value::Empty));
        assert_eq!(
            run(string, &d, EvaluationMode::StrictAuth, s("")).unwrap(),
            RuleOutcome::Unmatched
        );
        assert_eq!(chain(string, &d, s("hi")), RuleOutcome::Matched(s("hi")));
        assert_eq!(chain(string, &d, Value::Int(3)), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_int_parsing() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer(" 12 "), Some(12));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("007"), None);
        assert_eq!(parse_integer("1.0"), None);
        assert_eq!(parse_integer("1e3"), None);
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("99999999999999999999"), None);
    }

    #[test]
    fn test_int_coerces() {
        let d = directive(RuleKind::IntType, &[]);
        assert_eq!(chain(int, &d, s("25")), RuleOutcome::Matched(Value::Int(25)));
        assert_eq!(chain(int, &d, Value::Int(25)), RuleOutcome::Matched(Value::Int(25)));
        assert_eq!(chain(int, &d, s("")), RuleOutcome::Matched(Value::Empty));
        assert_eq!(chain(int, &d, s("2.5")), RuleOutcome::Unmatched);
        assert_eq!(chain(int, &d, Value::Float(2.0)), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_float() {
        let d = directive(RuleKind::Float, &[]);
        assert_eq!(chain(float, &d, s("2.5")), RuleOutcome::Matched(Value::Float(2.5)));
        assert_eq!(chain(float, &d, s("1e3")), RuleOutcome::Matched(Value::Float(1000.0)));
        assert_eq!(chain(float, &d, Value::Int(2)), RuleOutcome::Matched(Value::Float(2.0)));
        assert_eq!(chain(float, &d, s("inf")), RuleOutcome::Unmatched);
        assert_eq!(chain(float, &d, s("NaN")), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_min_max_on_strings_count_characters() {
        let min3 = directive(RuleKind::Min, &["3"]);
        let max3 = directive(RuleKind::Max, &["3"]);

        // three characters, nine bytes
        assert_eq!(chain(min, &min3, s("日本語")), RuleOutcome::Matched(s("日本語")));
        assert_eq!(chain(max, &max3, s("日本語")), RuleOutcome::Matched(s("日本語")));
        assert_eq!(chain(min, &min3, s("ab")), RuleOutcome::Unmatched);
        assert_eq!(chain(max, &max3, s("abcd")), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_min_max_on_integers_compare_magnitude() {
        let min1 = directive(RuleKind::Min, &["1"]);
        let max100 = directive(RuleKind::Max, &["100"]);

        assert_eq!(chain(min, &min1, Value::Int(1)), RuleOutcome::Matched(Value::Int(1)));
        assert_eq!(chain(min, &min1, Value::Int(0)), RuleOutcome::Unmatched);
        assert_eq!(chain(max, &max100, Value::Int(100)), RuleOutcome::Matched(Value::Int(100)));
        assert_eq!(chain(max, &max100, Value::Int(101)), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_min_property_holds_across_lengths() {
        for bound in 0..6 {
            let d = directive(RuleKind::Min, &[bound.to_string().as_str()]);
            for len in 1..8 {
                let text = "x".repeat(len);
                let matched = chain(min, &d, s(&text)) != RuleOutcome::Unmatched;
                assert_eq!(matched, len >= bound, "min:{} on {:?}", bound, text);

                let number = Value::Int(len as i64);
                let matched = chain(min, &d, number) != RuleOutcome::Unmatched;
                assert_eq!(matched, len >= bound, "min:{} on {}", bound, len);
            }
        }
    }

    #[test]
    fn test_max_property_holds_across_lengths() {
        for bound in 0..6 {
            let d = directive(RuleKind::Max, &[bound.to_string().as_str()]);
            for len in 1..8 {
                let text = "x".repeat(len);
                let matched = chain(max, &d, s(&text)) != RuleOutcome::Unmatched;
                assert_eq!(matched, len <= bound, "max:{} on {:?}", bound, text);

                let number = Value::Int(len as i64);
                let matched = chain(max, &d, number) != RuleOutcome::Unmatched;
                assert_eq!(matched, len <= bound, "max:{} on {}", bound, len);
            }
        }
    }

    #[test]
    fn test_integer_bounds_are_exact_above_f64_precision() {
        // 2^53 + 1 has no exact f64 representation
        let above = Value::Int(9_007_199_254_740_993);
        let at = Value::Int(9_007_199_254_740_992);

        let cap = directive(RuleKind::Max, &["9007199254740992"]);
        assert_eq!(chain(max, &cap, above.clone()), RuleOutcome::Unmatched);
        assert_eq!(chain(max, &cap, at.clone()), RuleOutcome::Matched(at.clone()));

        let floor = directive(RuleKind::Min, &["9007199254740993"]);
        assert_eq!(chain(min, &floor, at), RuleOutcome::Unmatched);
        assert_eq!(chain(min, &floor, above.clone()), RuleOutcome::Matched(above));
    }

    #[test]
    fn test_integer_bounds_at_i64_limits() {
        let below_max = directive(RuleKind::Max, &["9223372036854775806"]);
        assert_eq!(chain(max, &below_max, Value::Int(i64::MAX)), RuleOutcome::Unmatched);
        assert_eq!(
            chain(max, &below_max, Value::Int(i64::MAX - 1)),
            RuleOutcome::Matched(Value::Int(i64::MAX - 1))
        );

        let above_min = directive(RuleKind::Min, &["-9223372036854775807"]);
        assert_eq!(chain(min, &above_min, Value::Int(i64::MIN)), RuleOutcome::Unmatched);
        assert_eq!(
            chain(min, &above_min, Value::Int(i64::MIN + 1)),
            RuleOutcome::Matched(Value::Int(i64::MIN + 1))
        );
    }

    #[test]
    fn test_fractional_bounds() {
        let cap = directive(RuleKind::Max, &["2.5"]);
        assert_eq!(chain(max, &cap, Value::Int(2)), RuleOutcome::Matched(Value::Int(2)));
        assert_eq!(chain(max, &cap, Value::Int(3)), RuleOutcome::Unmatched);
        assert_eq!(chain(max, &cap, s("ab")), RuleOutcome::Matched(s("ab")));
        assert_eq!(chain(max, &cap, s("abc")), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_min_on_unsupported_shape_is_config_error() {
        let d = directive(RuleKind::Min, &["1"]);
        let err = run(min, &d, EvaluationMode::Chain, Value::Bool(true)).unwrap_err();
        assert!(err.is_config());
        match err {
            ValidationError::Config(ConfigError::UnsupportedShape { shape, .. }) => {
                assert_eq!(shape, "boolean");
            }
            other => panic!("expected an unsupported shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_exists_substitutes_record() {
        let d = directive(RuleKind::Exists, &["users", "username"]);
        match chain(exists, &d, s("alice")) {
            RuleOutcome::Matched(Value::Record(record)) => {
                assert_eq!(record.downcast_ref::<String>().unwrap(), "alice");
            }
            other => panic!("expected a record, got {:?}", other),
        }
        assert_eq!(chain(exists, &d, s("bob")), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_exists_errors() {
        let by_email = directive(RuleKind::Exists, &["users", "email"]);
        assert!(run(exists, &by_email, EvaluationMode::Chain, s("a")).unwrap_err().is_config());

        let likes = directive(RuleKind::Exists, &["likes", "id"]);
        assert!(run(exists, &likes, EvaluationMode::Chain, s("1")).unwrap_err().is_config());

        let posts = directive(RuleKind::Exists, &["posts", "id"]);
        let err = run(exists, &posts, EvaluationMode::Chain, Value::Int(1)).unwrap_err();
        assert!(matches!(err, ValidationError::Lookup { .. }));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("alice.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@exa\nmple.com"));
        assert!(!is_valid_email(""));

        let d = directive(RuleKind::Email, &[]);
        assert_eq!(chain(email, &d, Value::Int(1)), RuleOutcome::Unmatched);
    }

    #[test]
    fn test_password_policy() {
        assert!(is_valid_password("Abc123!@"));
        assert!(is_valid_password("Abcdef1_"));
        assert!(!is_valid_password("abcdefgh"));
        assert!(!is_valid_password("Ab1!"));
        assert!(!is_valid_password("ABCDEF1!"));
        assert!(!is_valid_password("abcdef1!"));
        assert!(!is_valid_password("Abcdefg!"));
        assert!(!is_valid_password("Abcdefg1"));
    }

    #[test]
    fn test_date_round_trip() {
        let d = directive(RuleKind::Date, &[]);
        assert_eq!(
            chain(date, &d, s("2024-02-29")),
            RuleOutcome::Matched(Value::Date("2024-02-29".into()))
        );
        assert_eq!(chain(date, &d, s("2023-02-29")), RuleOutcome::Unmatched);
        assert_eq!(chain(date, &d, s("2024-02-30")), RuleOutcome::Unmatched);
        assert_eq!(chain(date, &d, s("2024-2-5")), RuleOutcome::Unmatched);
        assert_eq!(chain(date, &d, s("24-02-05")), RuleOutcome::Unmatched);
        assert_eq!(chain(date, &d, s("2024/02/05")), RuleOutcome::Unmatched);
        assert_eq!(chain(date, &d, s("2024-02-05 ")), RuleOutcome::Unmatched);
    }
}
