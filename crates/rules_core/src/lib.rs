//! # Field Rules Core
//!
//! Core data structures for the declarative field rules engine.
//!
//! Request handlers describe the fields they accept as a [`FieldSpec`]: an
//! ordered list of field names, each carrying a chain of [`RuleDirective`]s
//! such as `required|string|min:1|max:20`. The validator crate evaluates a
//! spec against untrusted [`RawValue`] input and produces coerced [`Value`]s.
//!
//! ## Key Concepts
//!
//! - **RuleKind**: The closed set of rules the engine knows about
//! - **RuleDirective**: One parsed rule with its arguments
//! - **FieldSpec**: Field name to rule chain, in declaration order
//! - **Value**: The coerced result of a field, possibly a looked-up [`Record`]
//! - **LookupGateway**: The host capability used by `exists` rules
//!
//! ## Example
//!
//! ```rust
//! use rules_core::{FieldSpec, RuleDirective, RuleKind, ValueType};
//!
//! let spec = FieldSpec::new()
//!     .field("username", vec![
//!         RuleDirective::new(RuleKind::Required, Vec::new()).unwrap(),
//!         RuleDirective::new(RuleKind::Max, vec!["20".to_string()]).unwrap(),
//!     ])
//!     .unwrap();
//! assert_eq!(spec.len(), 1);
//!
//! let login = FieldSpec::from_types([
//!     ("email", ValueType::Email),
//!     ("password", ValueType::Password),
//! ])
//! .unwrap();
//! assert_eq!(login.field_names().collect::<Vec<_>>(), vec!["email", "password"]);
//! ```

pub mod error;
pub mod gateway;
pub mod options;
pub mod rule;
pub mod spec;
pub mod value;

pub use error::*;
pub use gateway::*;
pub use options::*;
pub use rule::*;
pub use spec::*;
pub use value::*;
