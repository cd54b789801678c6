//! Rule kinds and parsed rule directives.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of rules a field chain can use.
///
/// Each kind has exactly one executor and one message template in the
/// validator's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Value must be present and non-empty
    Required,
    /// Value must be a string
    #[serde(rename = "string")]
    StringType,
    /// Value must be an integer, coerced to `Value::Int`
    #[serde(rename = "int")]
    IntType,
    /// Value must be a number, coerced to `Value::Float`
    Float,
    /// Lower bound on string length or integer magnitude
    Min,
    /// Upper bound on string length or integer magnitude
    Max,
    /// Value must identify a record through the lookup gateway
    Exists,
    /// Value must be an email address
    Email,
    /// Value must satisfy the password policy
    Password,
    /// Value must be a `YYYY-MM-DD` calendar date
    Date,
}

impl RuleKind {
    /// Every rule kind, in catalog order.
    pub const ALL: [RuleKind; 10] = [
        RuleKind::Required,
        RuleKind::StringType,
        RuleKind::IntType,
        RuleKind::Float,
        RuleKind::Min,
        RuleKind::Max,
        RuleKind::Exists,
        RuleKind::Email,
        RuleKind::Password,
        RuleKind::Date,
    ];

    /// Returns the name used for this rule in chain strings.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::StringType => "string",
            RuleKind::IntType => "int",
            RuleKind::Float => "float",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Exists => "exists",
            RuleKind::Email => "email",
            RuleKind::Password => "password",
            RuleKind::Date => "date",
        }
    }

    /// Looks up a rule kind by its exact chain name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        match self {
            RuleKind::Min | RuleKind::Max => match args {
                [bound] => match bound.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(()),
                    _ => Err(format!("bound '{}' is not a number", bound)),
                },
                _ => Err(format!("expects 1 argument, got {}", args.len())),
            },
            RuleKind::Exists => match args {
                [table, identifier] if !table.is_empty() && !identifier.is_empty() => Ok(()),
                [_, _] => Err("table and identifier column must not be empty".to_string()),
                _ => Err(format!(
                    "expects a table and an identifier column, got {} argument(s)",
                    args.len()
                )),
            },
            _ if args.is_empty() => Ok(()),
            _ => Err("takes no arguments".to_string()),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ConfigError::UnknownRule(s.to_string()))
    }
}

/// A single parsed rule with its arguments.
///
/// Directives are immutable: the argument list is checked against the rule's
/// arity when the directive is built, so executors can rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDirective {
    kind: RuleKind,
    args: Vec<String>,
}

impl RuleDirective {
    /// Creates a directive, checking the argument list for the rule kind.
    ///
    /// `min`/`max` take one numeric bound, `exists` takes a table and an
    /// identifier column, every other rule takes nothing.
    pub fn new(kind: RuleKind, args: Vec<String>) -> Result<Self, ConfigError> {
        let directive = Self { kind, args };
        directive
            .kind
            .check_args(&directive.args)
            .map_err(|reason| ConfigError::malformed(directive.to_string(), reason))?;
        Ok(directive)
    }

    /// Creates an argument-less directive.
    pub(crate) fn bare(kind: RuleKind) -> Self {
        debug_assert!(kind.check_args(&[]).is_ok());
        Self {
            kind,
            args: Vec::new(),
        }
    }

    /// Returns the rule kind.
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Returns the arguments in declaration order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument at `index`, if any.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Returns the numeric bound of a `min`/`max` directive.
    pub fn bound(&self) -> Option<f64> {
        match self.kind {
            RuleKind::Min | RuleKind::Max => self.arg(0).and_then(|b| b.parse().ok()),
            _ => None,
        }
    }

    /// Returns the bound of a `min`/`max` directive when it is written as an
    /// integer that fits in `i64`.
    ///
    /// Integer inputs are compared against this value exactly; [`bound`]
    /// loses precision above 2^53.
    ///
    /// [`bound`]: RuleDirective::bound
    pub fn integer_bound(&self) -> Option<i64> {
        match self.kind {
            RuleKind::Min | RuleKind::Max => self.arg(0).and_then(|b| b.parse().ok()),
            _ => None,
        }
    }

    /// Returns `(table, identifier)` of an `exists` directive.
    pub fn lookup_target(&self) -> Option<(&str, &str)> {
        match (self.kind, self.args.as_slice()) {
            (RuleKind::Exists, [table, identifier]) => Some((table.as_str(), identifier.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for RuleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.args.join(","))
        }
    }
}

/// Renders directives back into chain syntax (`name|name:a,b`).
pub fn render_chain(directives: &[RuleDirective]) -> String {
    directives
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Checks rule combinations that no input could satisfy.
///
/// `min`/`max` measure strings and integers only, so a bound declared after
/// `float` is rejected.
pub fn check_chain(directives: &[RuleDirective]) -> Result<(), ConfigError> {
    let Some(float_at) = directives.iter().position(|d| d.kind == RuleKind::Float) else {
        return Ok(());
    };
    match directives[float_at..]
        .iter()
        .find(|d| matches!(d.kind, RuleKind::Min | RuleKind::Max))
    {
        Some(bound) => Err(ConfigError::malformed(
            render_chain(directives),
            format!("'{}' cannot be applied to a float", bound),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_names_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.name().parse::<RuleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_case_and_whitespace_sensitive() {
        assert!(RuleKind::from_name("Required").is_none());
        assert!(RuleKind::from_name(" required").is_none());
        assert!(matches!(
            "integer".parse::<RuleKind>(),
            Err(ConfigError::UnknownRule(name)) if name == "integer"
        ));
    }

    #[test]
    fn test_min_requires_numeric_bound() {
        assert!(RuleDirective::new(RuleKind::Min, args(&["8"])).is_ok());
        assert!(RuleDirective::new(RuleKind::Max, args(&["2.5"])).is_ok());
        assert!(RuleDirective::new(RuleKind::Min, args(&[])).is_err());
        assert!(RuleDirective::new(RuleKind::Min, args(&["ten"])).is_err());
        assert!(RuleDirective::new(RuleKind::Max, args(&["1", "2"])).is_err());
        assert!(RuleDirective::new(RuleKind::Max, args(&[" 5"])).is_err());
    }

    #[test]
    fn test_exists_requires_table_and_identifier() {
        let directive = RuleDirective::new(RuleKind::Exists, args(&["users", "username"])).unwrap();
        assert_eq!(directive.lookup_target(), Some(("users", "username")));

        assert!(RuleDirective::new(RuleKind::Exists, args(&["users"])).is_err());
        assert!(RuleDirective::new(RuleKind::Exists, args(&["users", ""])).is_err());
        assert!(RuleDirective::new(RuleKind::Exists, args(&["a", "b", "c"])).is_err());
    }

    #[test]
    fn test_plain_rules_reject_arguments() {
        let err = RuleDirective::new(RuleKind::Email, args(&["strict"])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::malformed("email:strict", "takes no arguments")
        );
    }

    #[test]
    fn test_display() {
        let directive = RuleDirective::new(RuleKind::Exists, args(&["posts", "id"])).unwrap();
        assert_eq!(directive.to_string(), "exists:posts,id");
        assert_eq!(RuleDirective::bare(RuleKind::StringType).to_string(), "string");
    }

    #[test]
    fn test_bound() {
        let directive = RuleDirective::new(RuleKind::Min, args(&["8"])).unwrap();
        assert_eq!(directive.bound(), Some(8.0));
        assert_eq!(RuleDirective::bare(RuleKind::Date).bound(), None);
    }

    #[test]
    fn test_integer_bound_is_exact() {
        let above_f64 = RuleDirective::new(RuleKind::Max, args(&["9007199254740993"])).unwrap();
        assert_eq!(above_f64.integer_bound(), Some(9_007_199_254_740_993));

        let extreme = RuleDirective::new(RuleKind::Min, args(&["-9223372036854775808"])).unwrap();
        assert_eq!(extreme.integer_bound(), Some(i64::MIN));

        let fractional = RuleDirective::new(RuleKind::Max, args(&["2.5"])).unwrap();
        assert_eq!(fractional.integer_bound(), None);
        assert_eq!(fractional.bound(), Some(2.5));
    }

    #[test]
    fn test_render_chain() {
        let directives = vec![
            RuleDirective::bare(RuleKind::Required),
            RuleDirective::new(RuleKind::Max, args(&["144"])).unwrap(),
            RuleDirective::new(RuleKind::Exists, args(&["posts", "id"])).unwrap(),
        ];
        assert_eq!(render_chain(&directives), "required|max:144|exists:posts,id");
        assert_eq!(render_chain(&[]), "");
    }

    #[test]
    fn test_check_chain_rejects_bounds_on_floats() {
        let min = RuleDirective::new(RuleKind::Min, args(&["0"])).unwrap();
        let float = RuleDirective::bare(RuleKind::Float);

        let err = check_chain(&[float.clone(), min.clone()]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::malformed("float|min:0", "'min:0' cannot be applied to a float")
        );

        assert!(check_chain(&[RuleDirective::bare(RuleKind::IntType), min.clone()]).is_ok());
        assert!(check_chain(&[min, float]).is_ok());
    }
}
