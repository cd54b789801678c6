//! In-memory lookup gateway backed by JSON rows.
//!
//! Useful for tests, fixtures and the `rulecheck` binary. Hosts with a real
//! persistence layer implement [`LookupGateway`] themselves.

use rules_core::{LookupError, LookupGateway, Record, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Table {
    identifiers: Vec<String>,
    rows: Vec<(serde_json::Value, Record)>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    identifiers: Vec<String>,
    #[serde(default)]
    rows: Vec<serde_json::Value>,
}

/// Gateway holding tables of JSON rows.
///
/// Each table declares the identifier columns it can be searched by. Every
/// row is wrapped in a [`Record`] once, so repeated lookups of the same row
/// return the same record.
///
/// # Example
///
/// ```rust
/// use rules_validator::InMemoryGateway;
/// use rules_core::{LookupGateway, Value};
/// use serde_json::json;
///
/// let gateway = InMemoryGateway::new().table(
///     "users",
///     ["id", "username"],
///     vec![json!({"id": 1, "username": "alice"})],
/// );
///
/// let found = gateway
///     .find_by_table("users", "username", &Value::String("alice".into()))
///     .unwrap();
/// assert!(found.is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: BTreeMap<String, Table>,
}

impl InMemoryGateway {
    /// Creates a gateway without tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table searchable by `identifiers`, replacing any table of the
    /// same name.
    pub fn table<I, S>(
        mut self,
        name: impl Into<String>,
        identifiers: I,
        rows: Vec<serde_json::Value>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = Table {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| {
                    let record = Record::new(row.clone());
                    (row, record)
                })
                .collect(),
        };
        self.tables.insert(name.into(), table);
        self
    }

    /// Builds a gateway from a JSON document of the form
    /// `{"users": {"identifiers": ["id", "username"], "rows": [...]}}`.
    pub fn from_json(document: serde_json::Value) -> Result<Self, serde_json::Error> {
        let tables: BTreeMap<String, TableDocument> = serde_json::from_value(document)?;
        Ok(tables
            .into_iter()
            .fold(Self::new(), |gateway, (name, doc)| {
                gateway.table(name, doc.identifiers, doc.rows)
            }))
    }

    /// Returns the names of the known tables.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl LookupGateway for InMemoryGateway {
    fn find_by_table(
        &self,
        table: &str,
        identifier: &str,
        key: &Value,
    ) -> Result<Option<Record>, LookupError> {
        let entry = self
            .tables
            .get(table)
            .ok_or_else(|| LookupError::UnsupportedTable(table.to_string()))?;

        if !entry.identifiers.iter().any(|column| column == identifier) {
            return Err(LookupError::UnsupportedIdentifier {
                table: table.to_string(),
                identifier: identifier.to_string(),
            });
        }

        let Some(needle) = key_text(key) else {
            return Ok(None);
        };

        Ok(entry
            .rows
            .iter()
            .find(|(row, _)| {
                row.get(identifier).and_then(column_text).as_deref() == Some(needle.as_str())
            })
            .map(|(_, record)| record.clone()))
    }
}

/// Text used to compare a lookup key against a column.
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) | Value::Date(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn column_text(column: &serde_json::Value) -> Option<String> {
    match column {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
