//! Field specifications and named rule sets.

use crate::{ConfigError, EvaluationMode, RuleDirective, RuleKind, check_chain, render_chain};
use serde::{Deserialize, Serialize};

/// Rule chain declared for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRules {
    /// Field name as it appears in the request
    pub name: String,

    /// Rules in evaluation order
    pub directives: Vec<RuleDirective>,
}

impl FieldRules {
    /// Returns true if the chain contains a `required` rule.
    pub fn is_required(&self) -> bool {
        self.directives
            .iter()
            .any(|d| d.kind() == RuleKind::Required)
    }

    /// Renders the chain back into its textual form.
    pub fn chain(&self) -> String {
        render_chain(&self.directives)
    }
}

/// Ordered mapping from field name to rule chain.
///
/// Fields are evaluated in the order they were declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    fields: Vec<FieldRules>,
}

impl FieldSpec {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, failing if the name is already declared or the chain
    /// combines rules that cannot apply together.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        directives: Vec<RuleDirective>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ConfigError::DuplicateField(name));
        }
        check_chain(&directives)?;
        self.fields.push(FieldRules { name, directives });
        Ok(())
    }

    /// Builder form of [`FieldSpec::push`].
    pub fn field(
        mut self,
        name: impl Into<String>,
        directives: Vec<RuleDirective>,
    ) -> Result<Self, ConfigError> {
        self.push(name, directives)?;
        Ok(self)
    }

    /// Builds a single-rule-per-field specification from a type map.
    ///
    /// This is the shape used for credential checks: every field gets
    /// exactly the rule matching its [`ValueType`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateField`] if a name appears more than once.
    pub fn from_types<I, K>(types: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, ValueType)>,
        K: Into<String>,
    {
        let mut spec = Self::new();
        for (name, value_type) in types {
            spec.push(name, vec![RuleDirective::bare(value_type.rule_kind())])?;
        }
        Ok(spec)
    }

    /// Returns the rules declared for `name`.
    pub fn get(&self, name: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRules> {
        self.fields.iter()
    }

    /// Iterates over field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSpec {
    type Item = &'a FieldRules;
    type IntoIter = std::slice::Iter<'a, FieldRules>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Value types accepted by single-rule credential specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Plain string
    String,
    /// Integer
    Int,
    /// Floating point number
    Float,
    /// `YYYY-MM-DD` date
    Date,
    /// Email address
    Email,
    /// Password satisfying the password policy
    Password,
}

impl ValueType {
    /// Returns the rule that checks this type.
    pub fn rule_kind(&self) -> RuleKind {
        match self {
            ValueType::String => RuleKind::StringType,
            ValueType::Int => RuleKind::IntType,
            ValueType::Float => RuleKind::Float,
            ValueType::Date => RuleKind::Date,
            ValueType::Email => RuleKind::Email,
            ValueType::Password => RuleKind::Password,
        }
    }
}

/// A field specification registered under a name, typically one per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSpec {
    /// Name of the specification (e.g. `register`)
    pub name: String,

    /// Optional human-readable description
    pub description: Option<String>,

    /// Evaluation mode the specification is meant for
    pub mode: EvaluationMode,

    /// The fields and their rules
    pub spec: FieldSpec,
}

/// A collection of named field specifications, usually loaded from a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    specs: Vec<NamedSpec>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named specification, failing if the name is taken.
    pub fn insert(&mut self, spec: NamedSpec) -> Result<(), ConfigError> {
        if self.get(&spec.name).is_some() {
            return Err(ConfigError::malformed(
                spec.name,
                "specification name is declared more than once",
            ));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Returns the specification registered under `name`.
    pub fn get(&self, name: &str) -> Option<&NamedSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Iterates over specifications in file order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedSpec> {
        self.specs.iter()
    }

    /// Returns the number of specifications.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the rule set is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
