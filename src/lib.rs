//! Carafe: declarative validation and marshalling of JSON-like trees.
//!
//! A schema is an ordered pipeline of processors. Each processor receives
//! the current value and either returns a (possibly transformed) value or
//! rejects it. Rejections are collected into a [`ValidationErrorStack`]
//! rather than stopping at the first problem, unless a rejection asks to
//! interrupt.
//!
//! # Core Concepts
//!
//! - **Processors**: leaf validators/transformers; closures qualify
//! - **Flags**: paired clauses such as `required`/`optional`, negatable with `!`
//! - **Qualifiers**: `apply_to(...)` targets array indices or object keys
//! - **Contexts**: assembled pipelines; nest them to describe trees
//!
//! # Example
//!
//! ```rust
//! use carafe::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), ConfigError> {
//! let has_at = func(|data: Data, _state: &mut State<'_>| match data.as_str() {
//!     Some(s) if !s.contains('@') => {
//!         Err(ValidationError::new("email format does not seem valid").into())
//!     }
//!     _ => Ok(data),
//! });
//!
//! let user = obj![
//!     prim![required(), is_str(), has_at]?.apply_to("email"),
//!     prim![optional(), is_str()]?.apply_to(vec!["firstname", "lastname"]),
//!     unmatched_properties(UnmatchedPolicy::Remove),
//! ]?;
//!
//! let out = user
//!     .validate(json!({"email": "ada@example.com", "nick": "ada"}))
//!     .unwrap();
//! assert_eq!(out, Data::from(json!({"email": "ada@example.com"})));
//!
//! let errors = user.validate(json!({"email": "ada"})).unwrap_err();
//! let leaves = errors.validation_errors().unwrap().flatten();
//! assert_eq!(leaves[0].message, "email format does not seem valid");
//! assert_eq!(leaves[0].path_string(), "$.email");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod core;
pub mod errors;
pub mod prelude;
pub mod processors;
pub mod qualifiers;
pub mod runners;

// Re-export commonly used types
pub use context::{Context, ContextKind, Schema, SchemaConfig, SchemaKind};
pub use core::{Data, DataKind, Position, State};
pub use errors::{ConfigError, Error, Outcome, ProcessError, ValidationError, ValidationErrorStack};
pub use processors::{IntoStep, Processor, Step, StepExt};
pub use stillwater::{Semigroup, Validation};
