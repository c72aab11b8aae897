//! Configuration errors: the schema or pipeline itself is malformed.

use thiserror::Error;

/// Raised while building or running a misconfigured pipeline.
///
/// These always propagate out of a run; they are never collected into a
/// [`ValidationErrorStack`](super::ValidationErrorStack).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("qualifier {qualifier} is not valid for a {stack} qualifier stack")]
    InvalidQualifier { qualifier: String, stack: &'static str },

    #[error("qualifiers cannot be added without specifying a processor")]
    NoRunner,

    #[error("processor {name} does not accept qualifiers")]
    QualifiersForbidden { name: String },

    #[error("a runner stack must be given a context before qualifiers can be added")]
    MissingContext,

    #[error("a {kind} context has no qualifierstack constructor specified")]
    NoQualifierStack { kind: String },

    #[error("cannot qualify processors inside primitive declarations")]
    QualifiedPrimitive,

    #[error("two inactive boolean processors in one relationship: {first} and {second}")]
    InactivePair {
        first: &'static str,
        second: &'static str,
    },

    #[error("unstable state: expected {expected} matches")]
    UnstableState { expected: &'static str },

    #[error("processor used in wrong context: {name}")]
    WrongContext { name: String },

    #[error("unknown unmatched-properties policy: {0}")]
    UnknownPolicy(String),

    #[error("invalid schema configuration: {0}")]
    InvalidConfig(String),
}
