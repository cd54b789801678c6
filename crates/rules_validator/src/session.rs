//! Validation sessions: whole-request validation against a field spec.

use crate::field::FieldValidator;
use crate::{FieldErrors, ValidationError};
use rules_core::{
    EvaluationMode, FieldRules, FieldSpec, LookupGateway, MissingFieldPolicy, NoLookup, RawInput,
    RawValue, Record, ValidationOptions, Value, raw_input_from_json,
};
use rules_parser::parse_field_spec;
use tracing::{debug, warn};

static NO_LOOKUP: NoLookup = NoLookup;

/// Validates request payloads against field specifications.
///
/// A session is cheap to build and holds no state besides the gateway and
/// the options, so one session can serve many requests.
///
/// # Example
///
/// ```rust
/// use rules_validator::ValidationSession;
/// use rules_core::{RawInput, Value};
///
/// let mut input = RawInput::new();
/// input.insert("username".into(), "alice".into());
/// input.insert("age".into(), "".into());
///
/// let data = ValidationSession::without_lookups()
///     .validate_chains(
///         [("username", "required|string|min:1|max:20"), ("age", "int|min:1|max:100")],
///         &input,
///     )
///     .unwrap();
///
/// assert_eq!(data.get_str("username"), Some("alice"));
/// assert_eq!(data.get("age"), Some(&Value::Empty));
/// ```
pub struct ValidationSession<'a> {
    gateway: &'a dyn LookupGateway,
    options: ValidationOptions,
}

impl<'a> ValidationSession<'a> {
    /// Creates a session with default options.
    pub fn new(gateway: &'a dyn LookupGateway) -> Self {
        Self {
            gateway,
            options: ValidationOptions::default(),
        }
    }

    /// Replaces the session options.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the session options.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates `input` against `spec`.
    ///
    /// Every declared field is first checked for presence, in declaration
    /// order; the first missing one aborts with
    /// [`ValidationError::MissingField`]. Rule chains then run field by
    /// field. Failures are collected into [`ValidationError::Rules`], or the
    /// session stops at the first failing field when `fail_fast` is set.
    pub fn validate(
        &self,
        spec: &FieldSpec,
        input: &RawInput,
    ) -> Result<ValidatedData, ValidationError> {
        debug!(
            fields = spec.len(),
            mode = ?self.options.mode,
            fail_fast = self.options.fail_fast,
            "validating input"
        );

        let present = self.check_presence(spec, input)?;
        let validator = FieldValidator::new(self.gateway, self.options.mode);
        let mut data = ValidatedData::default();
        let mut errors = FieldErrors::new();

        for (field, raw) in present {
            let Some(raw) = raw else {
                debug!(field = %field.name, "optional field not sent");
                data.insert(field.name.clone(), Value::Empty);
                continue;
            };

            let outcome = validator
                .evaluate(&field.name, raw, &field.directives)
                .inspect_err(|err| {
                    warn!(
                        field = %field.name,
                        rules = %field.chain(),
                        error = %err,
                        "validation aborted"
                    );
                })?;

            match outcome.into_value() {
                Ok(value) => {
                    debug!(field = %field.name, value = %value, "field passed");
                    data.insert(field.name.clone(), value);
                }
                Err(message) => {
                    errors.push(field.name.clone(), message);
                    if self.options.fail_fast {
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(data)
        } else {
            debug!(failed = errors.len(), "validation failed");
            Err(ValidationError::Rules(errors))
        }
    }

    /// Parses `(field, chain)` pairs and validates `input` against them.
    pub fn validate_chains<I, K, V>(
        &self,
        chains: I,
        input: &RawInput,
    ) -> Result<ValidatedData, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let spec = parse_field_spec(chains).inspect_err(|err| {
            warn!(error = %err, "invalid field specification");
        })?;
        self.validate(&spec, input)
    }

    /// Validates a JSON request body, which must be an object.
    pub fn validate_json(
        &self,
        spec: &FieldSpec,
        body: serde_json::Value,
    ) -> Result<ValidatedData, ValidationError> {
        let input = raw_input_from_json(body)
            .ok_or_else(|| ValidationError::invalid_value("Request body must be a JSON object."))?;
        self.validate(spec, &input)
    }

    /// Pairs every field with its raw value, `None` marking an optional
    /// field that was not sent.
    fn check_presence<'s, 'i>(
        &self,
        spec: &'s FieldSpec,
        input: &'i RawInput,
    ) -> Result<Vec<(&'s FieldRules, Option<&'i RawValue>)>, ValidationError> {
        let mut present = Vec::with_capacity(spec.len());

        for field in spec {
            let raw = input.get(&field.name).filter(|raw| !self.counts_as_missing(raw));
            if raw.is_none() && !self.may_be_omitted(field) {
                debug!(field = %field.name, "required field missing");
                return Err(ValidationError::missing_field(&field.name));
            }
            present.push((field, raw));
        }

        Ok(present)
    }

    fn counts_as_missing(&self, raw: &RawValue) -> bool {
        match self.options.mode {
            EvaluationMode::Chain => raw.is_null(),
            EvaluationMode::StrictAuth => raw.is_null() || raw.is_empty_string(),
        }
    }

    fn may_be_omitted(&self, field: &FieldRules) -> bool {
        self.options.missing_fields == MissingFieldPolicy::AllowOptional && !field.is_required()
    }
}

impl ValidationSession<'static> {
    /// Creates a session whose `exists` rules always report a
    /// configuration error.
    pub fn without_lookups() -> Self {
        Self::new(&NO_LOOKUP)
    }
}

/// Coerced values of a successfully validated request, in field
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedData {
    entries: Vec<(String, Value)>,
}

impl ValidatedData {
    fn insert(&mut self, field: String, value: Value) {
        self.entries.push((field, value));
    }

    /// Returns the value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Returns the value of `field` as a string (or date) slice.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns the value of `field` as an integer.
    pub fn get_int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_int)
    }

    /// Returns the record an `exists` rule resolved for `field`.
    pub fn get_record(&self, field: &str) -> Option<&Record> {
        self.get(field).and_then(Value::as_record)
    }

    /// Returns true if `field` was validated.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Iterates over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON rendering, empty values as `null` and records as their rows.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl IntoIterator for ValidatedData {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rules_core::ValueType;

    fn input(pairs: &[(&str, RawValue)]) -> RawInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_presence_checked_before_rules() {
        let raw = input(&[("username", "".into())]);
        let err = ValidationSession::without_lookups()
            .validate_chains(
                [("username", "required|string"), ("email", "required|email")],
                &raw,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing field: email");
    }

    #[test]
    fn test_first_missing_field_in_declaration_order() {
        let err = ValidationSession::without_lookups()
            .validate_chains([("b", "string"), ("a", "string")], &RawInput::new())
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(ref f) if f == "b"));
    }

    #[test]
    fn test_null_is_missing() {
        let raw = input(&[("content", RawValue::Null)]);
        let err = ValidationSession::without_lookups()
            .validate_chains([("content", "string")], &raw)
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(_)));
    }

    #[test]
    fn test_failures_are_collected_in_order() {
        let raw = input(&[
            ("username", "x".repeat(21).into()),
            ("age", "abc".into()),
            ("email", "alice@example.com".into()),
        ]);
        let err = ValidationSession::without_lookups()
            .validate_chains(
                [
                    ("username", "required|string|min:1|max:20"),
                    ("age", "int|min:1|max:100"),
                    ("email", "required|email"),
                ],
                &raw,
            )
            .unwrap_err();

        let errors = err.field_errors().unwrap();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["username", "age"]);
        assert_eq!(
            err.to_string(),
            r#"{"username":"username must be at most 20 characters.","age":"age must be an integer."}"#
        );
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let raw = input(&[("a", "x".into()), ("b", "y".into())]);
        let err = ValidationSession::without_lookups()
            .with_options(ValidationOptions::new().with_fail_fast(true))
            .validate_chains([("a", "int"), ("b", "int")], &raw)
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap().len(), 1);
    }

    #[test]
    fn test_allow_optional_policy() {
        let session = ValidationSession::without_lookups().with_options(
            ValidationOptions::new().with_missing_fields(MissingFieldPolicy::AllowOptional),
        );
        let raw = input(&[("username", "alice".into())]);

        let data = session
            .validate_chains(
                [("username", "required|string"), ("age", "int|min:1")],
                &raw,
            )
            .unwrap();
        assert_eq!(data.get("age"), Some(&Value::Empty));

        let err = session
            .validate_chains([("username", "string"), ("email", "required|email")], &raw)
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(ref f) if f == "email"));
    }

    #[test]
    fn test_strict_auth_treats_empty_as_missing() {
        let session = ValidationSession::without_lookups()
            .with_options(ValidationOptions::new().with_mode(EvaluationMode::StrictAuth));
        let spec = FieldSpec::from_types([
            ("email", ValueType::Email),
            ("password", ValueType::Password),
        ])
        .unwrap();

        let raw = input(&[("email", "alice@example.com".into()), ("password", "".into())]);
        let err = session.validate(&spec, &raw).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(ref f) if f == "password"));
    }

    #[test]
    fn test_config_error_aborts() {
        let raw = input(&[("user", "alice".into())]);
        let err = ValidationSession::without_lookups()
            .validate_chains([("user", "required|exists:users,username")], &raw)
            .unwrap_err();
        assert!(err.is_config());

        let err = ValidationSession::without_lookups()
            .validate_chains([("user", "required|mail")], &raw)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_validate_json_requires_object() {
        let spec = FieldSpec::from_types([("content", ValueType::String)]).unwrap();
        let session = ValidationSession::without_lookups();

        let data = session
            .validate_json(&spec, serde_json::json!({"content": "hello"}))
            .unwrap();
        assert_eq!(data.to_json(), serde_json::json!({"content": "hello"}));

        let err = session
            .validate_json(&spec, serde_json::json!(["hello"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue(_)));
    }
}
