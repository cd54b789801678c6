//! Lookup contract used by `exists` rules.
//!
//! The engine does not own storage. Hosts implement [`LookupGateway`] on top
//! of whatever data access layer they use and hand it to the session.

use crate::{LookupError, Record, Value};

/// Host capability that resolves an identifier to a record.
///
/// Implementations must be safe to share between threads; each call is an
/// independent synchronous lookup with no caching on the engine side.
///
/// # Example
///
/// ```rust
/// use rules_core::{LookupError, LookupGateway, Record, Value};
///
/// struct Users;
///
/// impl LookupGateway for Users {
///     fn find_by_table(
///         &self,
///         table: &str,
///         identifier: &str,
///         key: &Value,
///     ) -> Result<Option<Record>, LookupError> {
///         match (table, identifier) {
///             ("users", "username") if key.as_str() == Some("alice") => {
///                 Ok(Some(Record::new("alice".to_string())))
///             }
///             ("users", "username") => Ok(None),
///             _ => Err(LookupError::UnsupportedTable(table.to_string())),
///         }
///     }
/// }
/// ```
pub trait LookupGateway: Send + Sync {
    /// Looks up the record of `table` whose `identifier` column equals `key`.
    ///
    /// Returns `Ok(None)` when no record matches.
    fn find_by_table(
        &self,
        table: &str,
        identifier: &str,
        key: &Value,
    ) -> Result<Option<Record>, LookupError>;
}

impl<G: LookupGateway + ?Sized> LookupGateway for &G {
    fn find_by_table(
        &self,
        table: &str,
        identifier: &str,
        key: &Value,
    ) -> Result<Option<Record>, LookupError> {
        (**self).find_by_table(table, identifier, key)
    }
}

impl<G: LookupGateway + ?Sized> LookupGateway for std::sync::Arc<G> {
    fn find_by_table(
        &self,
        table: &str,
        identifier: &str,
        key: &Value,
    ) -> Result<Option<Record>, LookupError> {
        (**self).find_by_table(table, identifier, key)
    }
}

/// Gateway for specifications without `exists` rules.
///
/// Every lookup is rejected as an unsupported table.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl LookupGateway for NoLookup {
    fn find_by_table(
        &self,
        table: &str,
        _identifier: &str,
        _key: &Value,
    ) -> Result<Option<Record>, LookupError> {
        Err(LookupError::UnsupportedTable(table.to_string()))
    }
}
