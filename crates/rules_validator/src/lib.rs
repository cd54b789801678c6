//! # Field Rules Validator
//!
//! Validation engine for declarative field rules. This crate evaluates
//! untrusted request payloads against field specifications, including:
//!
//! - Rule chains (`required|string|min:1|max:20`) with type coercion
//! - Existence checks that substitute looked-up records for their keys
//! - Strict credential checks built from a type map
//! - Standalone checks for integers, dates and uploaded files
//!
//! ## Example
//!
//! ```rust
//! use rules_validator::{InMemoryGateway, ValidationSession};
//! use rules_core::RawInput;
//! use serde_json::json;
//!
//! let gateway = InMemoryGateway::new().table(
//!     "users",
//!     ["id", "username"],
//!     vec![json!({"id": 1, "username": "alice"})],
//! );
//!
//! let mut input = RawInput::new();
//! input.insert("user".into(), "alice".into());
//!
//! let data = ValidationSession::new(&gateway)
//!     .validate_chains([("user", "required|string|exists:users,username")], &input)
//!     .unwrap();
//!
//! let user = data.get_record("user").unwrap();
//! assert_eq!(user.to_json()["id"], 1);
//! ```

mod catalog;
mod error;
mod field;
mod gateway;
mod helpers;
mod rules;
mod session;

pub use catalog::*;
pub use error::*;
pub use field::*;
pub use gateway::*;
pub use helpers::*;
pub use rules::*;
pub use session::*;
