//! Everything a schema author usually needs, in one import.

pub use crate::context::{Context, ContextKind, Schema, SchemaConfig, SchemaKind};
pub use crate::core::{Data, DataKind, Position, State};
pub use crate::errors::{
    ConfigError, Error, ErrorDetail, Outcome, ProcessError, ValidationError, ValidationErrorStack,
};
pub use crate::processors::{
    allowempty, allownull, func, is_int, is_str, maxlength, optional, rejectempty, rejectnull,
    required, unmatched_properties, Clause, IntoStep, Processor, Step, StepExt, UnmatchedPolicy,
};
pub use crate::qualifiers::{Predicate, Qualifier};
pub use crate::{arr, items, members, obj, prim};
pub use stillwater::Validation;
