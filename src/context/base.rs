//! Contexts: a runner stack with a kind, usable as a processor itself.

use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, Error, Outcome, ValidationError, ValidationErrorStack};
use crate::processors::{IntoStep, Processor};
use crate::qualifiers::QualifierKind;
use crate::runners::RunnerStack;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::Semigroup;

/// What shape of data a context expects and how it dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// No addressable structure; qualifiers are not allowed.
    Basic,
    /// Qualified entries target indices; unqualified see the whole array.
    Array,
    /// Like `Array`, but unqualified entries run on every item.
    ArrayItems,
    /// Qualified entries target keys; unqualified see the whole object.
    Object,
    /// Like `Object`, but unqualified entries run on every member value.
    ObjectMembers,
}

impl ContextKind {
    pub fn qualifier_kind(self) -> Option<QualifierKind> {
        match self {
            Self::Basic => None,
            Self::Array | Self::ArrayItems => Some(QualifierKind::Items),
            Self::Object | Self::ObjectMembers => Some(QualifierKind::Members),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Array => "array",
            Self::ArrayItems => "array items",
            Self::Object => "object",
            Self::ObjectMembers => "object members",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An assembled pipeline, ready to validate data any number of times.
///
/// Contexts are immutable once built. [`Context::add`] returns an extended
/// sibling instead of changing the original.
///
/// # Example
///
/// ```rust
/// use carafe::prelude::*;
///
/// let trimmed = func(|data: Data, _state: &mut State<'_>| match data {
///     Data::Str(s) => Ok(Data::Str(s.trim().to_string())),
///     other => Ok(other),
/// });
/// let context = Context::basic(vec![trimmed.into_step()]).unwrap();
///
/// assert_eq!(context.validate("  hi ").unwrap(), Data::from("hi"));
/// ```
#[derive(Clone)]
pub struct Context {
    kind: ContextKind,
    runners: RunnerStack,
}

impl Context {
    pub fn new<I>(kind: ContextKind, steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        let mut runners = RunnerStack::new(Some(kind));
        for step in steps {
            runners.add(step)?;
        }
        Ok(Self { kind, runners })
    }

    pub fn basic<I>(steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Self::new(ContextKind::Basic, steps)
    }

    pub fn array<I>(steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Self::new(ContextKind::Array, steps)
    }

    pub fn object<I>(steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Self::new(ContextKind::Object, steps)
    }

    /// Unqualified steps run on every array item.
    pub fn items<I>(steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Self::new(ContextKind::ArrayItems, steps)
    }

    /// Unqualified steps run on every object member value.
    pub fn members<I>(steps: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Self::new(ContextKind::ObjectMembers, steps)
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn runners(&self) -> &RunnerStack {
        &self.runners
    }

    /// A sibling context with `steps` appended. Existing runners are shared.
    pub fn add<I>(&self, steps: I) -> Result<Context, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        let mut runners = self.runners.copy();
        for step in steps {
            runners.add(step)?;
        }
        Ok(Self {
            kind: self.kind,
            runners,
        })
    }

    /// Run the pipeline against `data`.
    pub fn validate(&self, data: impl Into<Data>) -> Result<Data, Error> {
        let out = self.runners.run_with(data.into(), Some(self))?;
        Ok(match self.kind {
            ContextKind::Object => prune_missing(out),
            _ => out,
        })
    }

    /// [`validate`](Self::validate) with rejections as a `Validation`.
    /// Only configuration errors use the outer `Result`.
    pub fn check(
        &self,
        data: impl Into<Data>,
    ) -> Result<Validation<Data, ValidationErrorStack>, ConfigError> {
        match self.validate(data) {
            Ok(data) => Ok(Validation::Success(data)),
            Err(Error::Invalid(errors)) => Ok(Validation::Failure(errors)),
            Err(Error::Config(error)) => Err(error),
        }
    }

    /// Validate a batch of records, accumulating every rejection.
    ///
    /// Each record's errors are nested under its index in the batch.
    pub fn check_all<I>(
        &self,
        records: I,
    ) -> Result<Validation<Vec<Data>, ValidationErrorStack>, ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<Data>,
    {
        let mut accepted = Vec::new();
        let mut failures: Option<ValidationErrorStack> = None;
        for (index, record) in records.into_iter().enumerate() {
            match self.check(record)? {
                Validation::Success(data) => accepted.push(data),
                Validation::Failure(errors) => {
                    let errors = ValidationErrorStack::from(
                        ValidationError::nested(errors).at(Position::Index(index)),
                    );
                    failures = Some(match failures {
                        Some(previous) => previous.combine(errors),
                        None => errors,
                    });
                }
            }
        }
        Ok(match failures {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(accepted),
        })
    }
}

fn prune_missing(data: Data) -> Data {
    match data {
        Data::Map(mut members) => {
            members.retain(|_, value| !value.is_missing());
            Data::Map(members)
        }
        other => other,
    }
}

impl Processor for Context {
    fn run(&self, data: Data, _state: &mut State<'_>) -> Outcome {
        match self.validate(data) {
            Ok(data) => Ok(data),
            Err(Error::Invalid(errors)) => Err(ValidationError::nested(errors).into()),
            Err(Error::Config(error)) => Err(error.into()),
        }
    }

    fn name(&self) -> String {
        format!("{} context", self.kind)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("kind", &self.kind)
            .field("runners", &self.runners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{func, maxlength, Step, StepExt};
    use serde_json::json;

    fn upper() -> Step {
        func(|data: Data, _state: &mut State<'_>| match data {
            Data::Str(s) => Ok(Data::Str(s.to_uppercase())),
            other => Ok(other),
        })
        .into_step()
    }

    fn reject_short() -> Step {
        func(|data: Data, _state: &mut State<'_>| match data.as_str() {
            Some(s) if s.len() < 3 => Err(ValidationError::new("too short").into()),
            _ => Ok(data),
        })
        .into_step()
    }

    #[test]
    fn add_spawns_an_extended_sibling() {
        let base = Context::basic(vec![upper()]).unwrap();
        let extended = base.add(vec![reject_short()]).unwrap();

        assert_eq!(base.runners().len(), 1);
        assert_eq!(extended.runners().len(), 2);
        assert_eq!(base.validate("ab").unwrap(), Data::from("AB"));
        assert!(extended.validate("ab").is_err());
    }

    #[test]
    fn nested_contexts_report_through_their_parent() {
        let child = Context::basic(vec![reject_short()]).unwrap();
        let parent = Context::object(vec![child.apply_to("name")]).unwrap();

        let Err(Error::Invalid(errors)) = parent.validate(json!({"name": "ab"})) else {
            panic!("expected validation errors");
        };
        let leaves = errors.flatten();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].message, "too short");
        assert_eq!(leaves[0].path_string(), "$.name");
    }

    #[test]
    fn object_contexts_drop_missing_members() {
        let context = Context::object(vec![func(|_d: Data, _s: &mut State<'_>| {
            Ok(Data::object([("kept", Data::Int(1)), ("gone", Data::Missing)]))
        })
        .into_step()])
        .unwrap();
        assert_eq!(context.validate(json!({})).unwrap(), Data::from(json!({"kept": 1})));
    }

    #[test]
    fn check_reports_rejections_as_validation() {
        let context = Context::basic(vec![reject_short()]).unwrap();
        assert!(context.check("abcd").unwrap().is_success());
        match context.check("a").unwrap() {
            Validation::Failure(errors) => assert_eq!(errors[0].message, "too short"),
            Validation::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn check_all_accumulates_every_record() {
        let context = Context::basic(vec![reject_short()]).unwrap();
        match context.check_all(["abcd", "a", "xyz", "b"]).unwrap() {
            Validation::Failure(errors) => {
                let paths: Vec<_> = errors.flatten().iter().map(|e| e.path_string()).collect();
                assert_eq!(paths, ["$[1]", "$[3]"]);
            }
            Validation::Success(_) => panic!("expected failure"),
        }
        assert!(context.check_all(["abcd", "xyz"]).unwrap().is_success());
    }

    #[test]
    fn item_contexts_apply_to_every_element() {
        let context = Context::items(vec![upper(), maxlength(2).into_step()]).unwrap();
        assert_eq!(
            context.validate(json!(["abc", "de"])).unwrap(),
            Data::from(vec!["AB", "DE"])
        );
    }

    #[test]
    fn member_contexts_combine_dispatch_with_qualifiers() {
        let context = Context::members(vec![upper(), maxlength(1).apply_to("short")]).unwrap();
        assert_eq!(
            context
                .validate(json!({"short": "abc", "long": "abc"}))
                .unwrap(),
            Data::from(json!({"short": "A", "long": "ABC"}))
        );
    }
}
