//! Parser for field rule chains and rule set files (YAML/TOML formats).
//!
//! Rule chains use a compact pipe-delimited grammar, see [`parse_chain`].
//! Rule set files group the field specifications of several endpoints so
//! they can be reviewed and checked outside the application.
//!
//! # Example
//!
//! ```rust
//! use rules_parser::parse_yaml;
//! use rules_core::EvaluationMode;
//!
//! let yaml = r#"
//! specs:
//!   - name: login
//!     mode: strict_auth
//!     fields:
//!       - name: email
//!         type: email
//!       - name: password
//!         type: password
//!   - name: register
//!     fields:
//!       - name: username
//!         rules: "required|string|min:1|max:20"
//! "#;
//!
//! let rules = parse_yaml(yaml).expect("Failed to parse rule set");
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules.get("login").unwrap().mode, EvaluationMode::StrictAuth);
//! ```

mod grammar;

pub use grammar::*;

use rules_core::{
    ConfigError, EvaluationMode, FieldSpec, NamedSpec, RuleDirective, RuleSet, ValueType,
};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a rule set.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A field's rules are invalid
    #[error("Invalid rules for field '{field}' in spec '{spec}': {source}")]
    Rule {
        /// Specification name
        spec: String,
        /// Field name
        field: String,
        /// Underlying rule error
        source: ConfigError,
    },

    /// The document is well-formed but does not describe a valid rule set
    #[error("Invalid rule set: {0}")]
    Definition(String),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported rule set file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSetDocument {
    #[serde(default)]
    specs: Vec<SpecDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecDocument {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    mode: EvaluationMode,
    #[serde(default)]
    fields: Vec<FieldDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDocument {
    name: String,
    #[serde(default)]
    rules: Option<String>,
    #[serde(default, rename = "type")]
    value_type: Option<ValueType>,
}

impl RuleSetDocument {
    fn into_rule_set(self) -> Result<RuleSet> {
        let mut rule_set = RuleSet::new();
        for doc in self.specs {
            let spec = build_spec(&doc.name, doc.fields)?;
            rule_set
                .insert(NamedSpec {
                    name: doc.name,
                    description: doc.description,
                    mode: doc.mode,
                    spec,
                })
                .map_err(|e| ParserError::Definition(e.to_string()))?;
        }
        Ok(rule_set)
    }
}

fn build_spec(spec_name: &str, fields: Vec<FieldDocument>) -> Result<FieldSpec> {
    let mut spec = FieldSpec::new();
    for field in fields {
        let directives = match (&field.rules, field.value_type) {
            (Some(chain), None) => parse_chain(chain),
            (None, Some(value_type)) => {
                RuleDirective::new(value_type.rule_kind(), Vec::new()).map(|d| vec![d])
            }
            (None, None) => Ok(Vec::new()),
            (Some(_), Some(_)) => {
                return Err(ParserError::Definition(format!(
                    "field '{}' in spec '{}' declares both 'rules' and 'type'",
                    field.name, spec_name
                )));
            }
        };

        let rule_error = |source: ConfigError| ParserError::Rule {
            spec: spec_name.to_string(),
            field: field.name.clone(),
            source,
        };
        let directives = directives.map_err(rule_error)?;
        spec.push(field.name.clone(), directives).map_err(rule_error)?;
    }
    Ok(spec)
}

/// Parse a rule set from a YAML string.
///
/// Every rule chain in the document is parsed, so a typo in any rule is
/// reported here rather than when a request arrives.
pub fn parse_yaml(content: &str) -> Result<RuleSet> {
    let document: RuleSetDocument = serde_yaml_ng::from_str(content)?;
    document.into_rule_set()
}

/// Parse a rule set from a TOML string.
///
/// # Example
///
/// ```rust
/// use rules_parser::parse_toml;
///
/// let toml = r#"
/// [[specs]]
/// name = "follow"
///
/// [[specs.fields]]
/// name = "following_id"
/// rules = "required|int"
/// "#;
///
/// let rules = parse_toml(toml).unwrap();
/// assert_eq!(rules.get("follow").unwrap().spec.len(), 1);
/// ```
pub fn parse_toml(content: &str) -> Result<RuleSet> {
    let document: RuleSetDocument =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    document.into_rule_set()
}

/// Detect the rule set format from a file path based on its extension.
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<RuleSetFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(RuleSetFormat::Yaml),
        "toml" => Ok(RuleSetFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a rule set from a file with automatic format detection.
///
/// ```no_run
/// use rules_parser::parse_file;
/// use std::path::Path;
///
/// let rules = parse_file(Path::new("rules/endpoints.yml")).unwrap();
/// println!("Loaded {} specs", rules.len());
/// ```
pub fn parse_file(path: &Path) -> Result<RuleSet> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        RuleSetFormat::Yaml => parse_yaml(&content),
        RuleSetFormat::Toml => parse_toml(&content),
    }
}
