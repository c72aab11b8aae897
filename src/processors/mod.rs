//! Processors: the leaf units a schema is built from.
//!
//! A processor takes the current [`Data`] and the per-run [`State`] and
//! returns an [`Outcome`]: the transformed value, or an error. Anything with
//! that shape qualifies, including plain closures:
//!
//! ```rust
//! use carafe::prelude::*;
//!
//! let shout = func(|data: Data, _state: &mut State<'_>| match data {
//!     Data::Str(s) => Ok(Data::Str(s.to_uppercase())),
//!     other => Ok(other),
//! });
//!
//! let schema = prim![shout].unwrap();
//! assert_eq!(schema.validate("hey").unwrap(), Data::from("HEY"));
//! ```

mod builtins;
mod flags;
mod step;
mod types;

pub use builtins::{
    is_int, is_str, maxlength, not_int, not_str, unmatched_properties, MaxLength,
    UnmatchedPolicy, UnmatchedProperties, IS_INT, IS_STR, NOT_INT, NOT_STR,
};
pub use flags::{
    allowempty, allownull, optional, rejectempty, rejectnull, required, Clause, Flag, FlagCheck,
    FlagClass, FlagProcessor, ALLOW_EMPTY, ALLOW_NULL, OPTIONAL, REJECT_EMPTY, REJECT_NULL,
    REQUIRED,
};
pub use step::{Hook, Hooks, IntoStep, Source, Step, StepExt};
pub use types::TypeCheck;

use crate::core::{Data, State};
use crate::errors::Outcome;

/// The processor contract.
pub trait Processor: Send + Sync {
    fn run(&self, data: Data, state: &mut State<'_>) -> Outcome;

    /// Mandatory-clause family this processor belongs to, if any.
    fn clause(&self) -> Option<Clause> {
        None
    }

    /// Name used in logs and configuration errors.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }
}

impl<F> Processor for F
where
    F: Fn(Data, &mut State<'_>) -> Outcome + Send + Sync,
{
    fn run(&self, data: Data, state: &mut State<'_>) -> Outcome {
        self(data, state)
    }

    fn name(&self) -> String {
        "function".to_string()
    }
}

/// Pin a closure to the processor signature.
///
/// Closures passed straight into `prim!`/`obj!` cannot infer their argument
/// types; wrapping them in `func` fixes that.
pub fn func<F>(f: F) -> F
where
    F: Fn(Data, &mut State<'_>) -> Outcome + Send + Sync + 'static,
{
    f
}
