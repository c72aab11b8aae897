//! Coarse JSON type checks placed right after the required clause.

use super::Processor;
use crate::core::{Data, State};
use crate::errors::{Outcome, ValidationError};

/// Type gate for a schema kind.
///
/// Failures interrupt the stack: later processors assume the checked shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    /// Strings, bytes, numbers, booleans, null and `Missing`.
    Primitive,
    /// Lists and tuples (tuples become lists); null and `Missing` pass.
    Array,
    /// Mappings, copied; null and `Missing` pass.
    Object,
}

impl TypeCheck {
    pub fn expected(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn check(self, data: Data) -> Outcome {
        let accepted = match (self, data) {
            (
                Self::Primitive,
                data @ (Data::Missing
                | Data::Null
                | Data::Bool(_)
                | Data::Int(_)
                | Data::Float(_)
                | Data::Str(_)
                | Data::Bytes(_)),
            ) => data,
            (Self::Array | Self::Object, data @ (Data::Missing | Data::Null)) => data,
            (Self::Array, Data::List(items) | Data::Tuple(items)) => Data::List(items),
            (Self::Object, data @ Data::Map(_)) => data,
            (_, other) => {
                return Err(ValidationError::wrong_type(self.expected(), &other)
                    .interrupt(true)
                    .into())
            }
        };
        Ok(accepted)
    }
}

impl Processor for TypeCheck {
    fn run(&self, data: Data, _state: &mut State<'_>) -> Outcome {
        self.check(data)
    }

    fn name(&self) -> String {
        self.expected().to_string()
    }
}
