//! Value model and per-run state.
//!
//! This module contains the pieces every other layer builds on:
//! - `Data`, the JSON-like tree with its `Missing` sentinel
//! - `Position`, addressing array items and object members
//! - `State`, the transient record threaded through one stack run

mod data;
mod state;

pub use data::{render_path, Data, DataKind, Position};
pub use state::{ItemMatches, Matches, MemberMatches, State};
