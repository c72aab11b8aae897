//! Error model.
//!
//! Two families, kept apart on purpose:
//! - [`ValidationError`]s describe bad data. They are collected into a
//!   [`ValidationErrorStack`] and may or may not stop the run.
//! - [`ConfigError`]s describe a bad pipeline. They abort immediately.
//!
//! Processors return [`Outcome`], whose error side can carry either.

mod config;
mod validation;

pub use config::ConfigError;
pub use validation::{ErrorDetail, ValidationError, ValidationErrorStack};

use crate::core::{Data, Position};
use thiserror::Error;

/// Failure of a single processor invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProcessError {
    /// Annotate a validation failure with the position it occurred at.
    /// Configuration errors pass through untouched.
    pub fn at(self, position: Position) -> Self {
        match self {
            Self::Invalid(e) => Self::Invalid(e.at(position)),
            config => config,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

/// What every processor returns: the (possibly transformed) data, or why
/// it was refused.
pub type Outcome = Result<Data, ProcessError>;

/// Failure of a whole runner-stack or context run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Invalid(ValidationErrorStack),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn validation_errors(&self) -> Option<&ValidationErrorStack> {
        match self {
            Self::Invalid(stack) => Some(stack),
            Self::Config(_) => None,
        }
    }

    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<ValidationErrorStack> for Error {
    fn from(stack: ValidationErrorStack) -> Self {
        Self::Invalid(stack)
    }
}
