//! Contexts and the schema builders that assemble them.

mod base;
mod config;
mod macros;
mod schema;

pub use base::{Context, ContextKind};
pub use config::SchemaConfig;
pub use schema::{arr, items, members, obj, prim, Schema, SchemaKind};
