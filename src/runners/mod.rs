//! Runners and runner stacks: how declared steps are executed.

mod runner;
mod stack;

pub use runner::Runner;
pub use stack::{Entry, QualifierSlot, RunnerStack};
