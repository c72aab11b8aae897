//! Qualifiers: which array items or object members a processor targets.
//!
//! A step declared with `apply_to(...)` carries [`Qualifier`]s. When the
//! step joins an array or object context, they are folded into a
//! [`QualifierStack`] that drives per-position dispatch and records what it
//! matched in the run's [`State`].

mod items;
mod members;

pub use items::ItemQualifierStack;
pub use members::MemberQualifierStack;

use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, Outcome, ProcessError, ValidationError, ValidationErrorStack};
use crate::runners::Runner;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Pure predicate deciding whether a position is targeted.
///
/// # Example
///
/// ```rust
/// use carafe::{Data, Position};
/// use carafe::qualifiers::Predicate;
///
/// let names = Predicate::new(|pos: &Position, _value: &Data| {
///     pos.key().map_or(false, |k| k.ends_with("name"))
/// });
///
/// assert!(names.check(&Position::Key("lastname".into()), &Data::Null));
/// assert!(!names.check(&Position::Key("email".into()), &Data::Null));
/// ```
#[derive(Clone)]
pub struct Predicate {
    predicate: Arc<dyn Fn(&Position, &Data) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Position, &Data) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check(&self, position: &Position, value: &Data) -> bool {
        (self.predicate)(position, value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// One targeting declaration.
#[derive(Debug, Clone)]
pub enum Qualifier {
    Index(usize),
    Indices(Vec<usize>),
    Key(String),
    Keys(Vec<String>),
    Call(Predicate),
}

impl Qualifier {
    pub fn call<F>(predicate: F) -> Self
    where
        F: Fn(&Position, &Data) -> bool + Send + Sync + 'static,
    {
        Self::Call(Predicate::new(predicate))
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {i}"),
            Self::Indices(v) => write!(f, "indices {v:?}"),
            Self::Key(k) => write!(f, "key {k:?}"),
            Self::Keys(v) => write!(f, "keys {v:?}"),
            Self::Call(_) => f.write_str("predicate"),
        }
    }
}

impl From<usize> for Qualifier {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Range<usize>> for Qualifier {
    fn from(range: Range<usize>) -> Self {
        Self::Indices(range.collect())
    }
}

impl From<Vec<usize>> for Qualifier {
    fn from(indices: Vec<usize>) -> Self {
        Self::Indices(indices)
    }
}

impl From<&str> for Qualifier {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Qualifier {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<Vec<&str>> for Qualifier {
    fn from(keys: Vec<&str>) -> Self {
        Self::Keys(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Qualifier {
    fn from(keys: Vec<String>) -> Self {
        Self::Keys(keys)
    }
}

impl From<Predicate> for Qualifier {
    fn from(predicate: Predicate) -> Self {
        Self::Call(predicate)
    }
}

/// The shape of positions a qualifier stack addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierKind {
    Items,
    Members,
}

impl QualifierKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Items => "item",
            Self::Members => "member",
        }
    }
}

/// How a position came to be targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Explicit,
    Call,
}

#[derive(Debug, Clone)]
pub enum QualifierStack {
    Items(ItemQualifierStack),
    Members(MemberQualifierStack),
}

impl QualifierStack {
    pub fn for_kind(kind: QualifierKind) -> Self {
        match kind {
            QualifierKind::Items => Self::Items(ItemQualifierStack::new()),
            QualifierKind::Members => Self::Members(MemberQualifierStack::new()),
        }
    }

    pub fn kind(&self) -> QualifierKind {
        match self {
            Self::Items(_) => QualifierKind::Items,
            Self::Members(_) => QualifierKind::Members,
        }
    }

    /// Merge a qualifier into the stack.
    pub fn add(&mut self, qualifier: Qualifier) -> Result<(), ConfigError> {
        match self {
            Self::Items(stack) => stack.add(qualifier),
            Self::Members(stack) => stack.add(qualifier),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Items(stack) => stack.is_empty(),
            Self::Members(stack) => stack.is_empty(),
        }
    }

    pub fn qualify(&self, position: &Position, value: &Data) -> Option<MatchedBy> {
        match (self, position) {
            (Self::Items(stack), Position::Index(i)) => stack.qualify(*i, value),
            (Self::Members(stack), Position::Key(k)) => stack.qualify(k, value),
            _ => None,
        }
    }

    /// Run `runner` on every targeted position of `data`.
    pub fn apply(&self, data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
        match self {
            Self::Items(stack) => stack.apply(data, runner, state),
            Self::Members(stack) => stack.apply(data, runner, state),
        }
    }
}

fn invalid(qualifier: &Qualifier, kind: QualifierKind) -> ConfigError {
    ConfigError::InvalidQualifier {
        qualifier: qualifier.to_string(),
        stack: kind.name(),
    }
}

/// Collects the element failures of one dispatch pass.
#[derive(Default)]
pub(crate) struct ElementErrors {
    stack: ValidationErrorStack,
}

impl ElementErrors {
    /// Record a failure at `position`. Configuration errors are returned
    /// for the caller to propagate.
    pub(crate) fn record(&mut self, error: ProcessError, position: Position) -> Result<(), ProcessError> {
        match error.at(position) {
            ProcessError::Invalid(e) => {
                self.stack.push(e);
                Ok(())
            }
            config => Err(config),
        }
    }

    /// The single error to raise for this pass, if any element failed.
    pub(crate) fn finish(mut self, data: Data) -> Outcome {
        if self.stack.len() > 1 {
            let interrupt = self.stack.iter().any(|e| e.interrupt);
            return Err(ValidationError::nested(self.stack)
                .interrupt(interrupt)
                .into());
        }
        match self.stack.pop() {
            Some(error) => Err(error.into()),
            None => Ok(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_right_shape() {
        assert!(matches!(Qualifier::from(3usize), Qualifier::Index(3)));
        assert!(matches!(Qualifier::from(0usize..3), Qualifier::Indices(v) if v == [0, 1, 2]));
        assert!(matches!(Qualifier::from("email"), Qualifier::Key(k) if k == "email"));
        assert!(matches!(
            Qualifier::from(vec!["a", "b"]),
            Qualifier::Keys(v) if v == ["a", "b"]
        ));
    }

    #[test]
    fn stacks_reject_foreign_qualifiers() {
        let mut items = QualifierStack::for_kind(QualifierKind::Items);
        let error = items.add(Qualifier::from("name")).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidQualifier {
                qualifier: "key \"name\"".into(),
                stack: "item"
            }
        );

        let mut members = QualifierStack::for_kind(QualifierKind::Members);
        assert!(members.add(Qualifier::from(1usize)).is_err());
        assert!(members.is_empty());
    }

    #[test]
    fn element_errors_merge_into_one() {
        let mut errors = ElementErrors::default();
        errors
            .record(ValidationError::new("a").into(), Position::Index(0))
            .unwrap();
        errors
            .record(ValidationError::new("b").into(), Position::Index(2))
            .unwrap();
        let error = errors.finish(Data::Null).unwrap_err();
        let error = error.validation().unwrap();
        let paths: Vec<_> = error
            .nested_stack()
            .unwrap()
            .flatten()
            .iter()
            .map(|e| e.path_string())
            .collect();
        assert_eq!(paths, ["$[0]", "$[2]"]);
    }

    #[test]
    fn element_errors_pass_config_through() {
        let mut errors = ElementErrors::default();
        let config = errors.record(ConfigError::NoRunner.into(), Position::Index(0));
        assert_eq!(config, Err(ProcessError::Config(ConfigError::NoRunner)));
    }
}
