//! Raw input values and coerced output values.
//!
//! [`RawValue`] is what the request layer hands over: untyped, possibly
//! hostile. [`Value`] is what a successful rule chain produces. The two are
//! kept apart so that application code only ever sees validated data.

use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// An untyped input value.
///
/// A field that was not sent at all is represented by its key being absent
/// from the [`RawInput`] map, not by a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Explicit null
    Null,
    /// String value (form fields are always strings)
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// List value
    List(Vec<RawValue>),
    /// Composite value, e.g. an uploaded-file descriptor
    Map(BTreeMap<String, RawValue>),
}

/// Raw request payload: field name to untyped value.
pub type RawInput = HashMap<String, RawValue>;

impl RawValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Returns true if this value is the empty string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, RawValue::String(s) if s.is_empty())
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::String(_) => "string",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Bool(_) => "boolean",
            RawValue::List(_) => "list",
            RawValue::Map(_) => "map",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get a member of a map value.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        match self {
            RawValue::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Int(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => RawValue::String(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(map) => RawValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Converts a JSON object into a [`RawInput`].
///
/// Returns `None` if `value` is not an object.
pub fn raw_input_from_json(value: serde_json::Value) -> Option<RawInput> {
    match value {
        serde_json::Value::Object(map) => Some(
            map.into_iter()
                .map(|(k, v)| (k, RawValue::from(v)))
                .collect(),
        ),
        _ => None,
    }
}

/// A host entity that can be carried inside a [`Record`].
///
/// Implemented for every `Serialize + Debug` type, so host models and
/// `serde_json::Value` rows work without extra code.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// Upcasts to `Any` for downcasting back to the host type.
    fn as_any(&self) -> &dyn Any;

    /// JSON rendering of the entity, used for reports.
    fn to_json(&self) -> serde_json::Value;
}

impl<T> Entity for T
where
    T: Serialize + Any + Send + Sync + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Opaque handle to a record returned by a lookup gateway.
///
/// Cloning is cheap. Equality is identity: two handles are equal only when
/// they point at the same record instance.
#[derive(Clone)]
pub struct Record(Arc<dyn Entity>);

impl Record {
    /// Wraps a host entity.
    pub fn new(entity: impl Entity) -> Self {
        Self(Arc::new(entity))
    }

    /// Returns the entity as `T` if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns true if both handles point at the same record.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// JSON rendering of the record.
    pub fn to_json(&self) -> serde_json::Value {
        self.0.to_json()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record").field(&self.0).finish()
    }
}

/// The coerced result of a field that passed its rule chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Present but empty, or legitimately absent
    Empty,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Validated `YYYY-MM-DD` date
    Date(String),
    /// List value
    List(Vec<Value>),
    /// Composite value
    Map(BTreeMap<String, Value>),
    /// Record resolved by an `exists` rule
    Record(Record),
}

impl Value {
    /// Returns true if this is the empty marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    /// Attempts to get this value as a string slice. Dates count as strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a resolved record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// JSON rendering of the value. The empty marker renders as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Empty => serde_json::Value::Null,
            Value::String(s) | Value::Date(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => items.iter().map(Value::to_json).collect(),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Record(record) => record.to_json(),
        }
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Null => Value::Empty,
            RawValue::String(s) => Value::String(s),
            RawValue::Int(i) => Value::Int(i),
            RawValue::Float(f) => Value::Float(f),
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
            RawValue::Map(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::String(s) | Value::Date(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            other => write!(f, "{}", other.to_json()),
        }
    }
}
