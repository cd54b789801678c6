//! Rule chain grammar.
//!
//! A chain is a list of segments separated by `|`. Each segment is either a
//! bare rule name (`required`) or a name followed by `:` and a
//! comma-separated argument list (`exists:users,username`).
//!
//! Whitespace is significant and never trimmed: `"required | string"`
//! contains the rule names `"required "` and `" string"`, which are unknown.

use rules_core::{ConfigError, FieldSpec, RuleDirective, RuleKind, check_chain, render_chain};

/// Parses a rule chain into directives.
///
/// An empty chain yields no directives.
///
/// # Errors
///
/// - [`ConfigError::MalformedRule`] if a segment has an empty name or the
///   wrong arguments for its rule, or if `min`/`max` follow `float`
/// - [`ConfigError::UnknownRule`] if a segment names a rule that does not exist
///
/// # Example
///
/// ```rust
/// use rules_parser::parse_chain;
/// use rules_core::RuleKind;
///
/// let directives = parse_chain("required|int|exists:posts,id").unwrap();
/// assert_eq!(directives.len(), 3);
/// assert_eq!(directives[2].kind(), RuleKind::Exists);
/// assert_eq!(directives[2].args(), ["posts", "id"]);
/// ```
pub fn parse_chain(chain: &str) -> Result<Vec<RuleDirective>, ConfigError> {
    if chain.is_empty() {
        return Ok(Vec::new());
    }

    let directives = chain
        .split('|')
        .map(parse_segment)
        .collect::<Result<Vec<_>, _>>()?;
    check_chain(&directives)?;
    Ok(directives)
}

/// Parses a single `name` or `name:arg,arg` segment.
fn parse_segment(segment: &str) -> Result<RuleDirective, ConfigError> {
    let (name, args) = match segment.split_once(':') {
        Some((name, args)) => (name, Some(args)),
        None => (segment, None),
    };

    if name.is_empty() {
        return Err(ConfigError::malformed(segment, "rule name is empty"));
    }

    let kind: RuleKind = name.parse()?;
    let args = args
        .map(|text| text.split(',').map(String::from).collect())
        .unwrap_or_default();

    RuleDirective::new(kind, args)
}

/// Renders directives back into chain syntax.
///
/// For any chain accepted by [`parse_chain`], `to_chain(parse_chain(c)) == c`.
pub fn to_chain(directives: &[RuleDirective]) -> String {
    render_chain(directives)
}

/// Parses `(field, chain)` pairs into a [`FieldSpec`], keeping their order.
///
/// # Example
///
/// ```rust
/// use rules_parser::parse_field_spec;
///
/// let spec = parse_field_spec([
///     ("username", "required|string|min:1|max:20"),
///     ("age", "int|min:1|max:100"),
/// ])
/// .unwrap();
/// assert_eq!(spec.field_names().collect::<Vec<_>>(), vec!["username", "age"]);
/// ```
pub fn parse_field_spec<I, K, V>(entries: I) -> Result<FieldSpec, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let mut spec = FieldSpec::new();
    for (name, chain) in entries {
        spec.push(name, parse_chain(chain.as_ref())?)?;
    }
    Ok(spec)
}
