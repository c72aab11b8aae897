//! Processor declarations.
//!
//! A [`Step`] is what a schema author writes down for one processor: where
//! the processor comes from, which hook batches wrap it, and which
//! positions it targets. The runner stack turns each step into a runner.

use super::flags::{Clause, Flag};
use super::Processor;
use crate::core::{Data, State};
use crate::errors::{ConfigError, Outcome};
use crate::qualifiers::Qualifier;
use std::fmt;
use std::sync::Arc;

/// One callable in a default, override or failsafe batch.
pub type Hook = Arc<dyn Fn(Data, &mut State<'_>) -> Outcome + Send + Sync>;

type Factory = Arc<dyn Fn() -> Result<Arc<dyn Processor>, ConfigError> + Send + Sync>;

/// Hook batches run around a processor. Each batch threads data through
/// its callables in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pub defaults: Vec<Hook>,
    pub overrides: Vec<Hook>,
    pub failsafe: Vec<Hook>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.overrides.is_empty() && self.failsafe.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("defaults", &self.defaults.len())
            .field("overrides", &self.overrides.len())
            .field("failsafe", &self.failsafe.len())
            .finish()
    }
}

/// Where a step's processor comes from.
#[derive(Clone)]
pub enum Source {
    /// A ready processor.
    Runnable(Arc<dyn Processor>),
    /// Built on demand when the runner is created.
    Deferred(Factory),
}

impl Source {
    pub fn resolve(&self) -> Result<Arc<dyn Processor>, ConfigError> {
        match self {
            Self::Runnable(processor) => Ok(Arc::clone(processor)),
            Self::Deferred(factory) => factory(),
        }
    }
}

/// A processor declaration.
#[derive(Clone)]
pub struct Step {
    pub(crate) source: Source,
    pub(crate) hooks: Hooks,
    pub(crate) clause: Option<Clause>,
    pub(crate) forbidden: bool,
    pub(crate) qualifiers: Vec<Qualifier>,
    pub(crate) label: String,
}

impl Step {
    pub fn new<P: Processor + 'static>(processor: P) -> Self {
        Self::from_arc(Arc::new(processor))
    }

    pub fn from_arc(processor: Arc<dyn Processor>) -> Self {
        Self {
            label: processor.name(),
            clause: processor.clause(),
            source: Source::Runnable(processor),
            hooks: Hooks::default(),
            forbidden: false,
            qualifiers: Vec::new(),
        }
    }

    /// A step whose processor is built by `factory` when the runner is
    /// created. Errors from the factory surface at schema construction.
    pub fn deferred<F>(label: impl Into<String>, clause: Option<Clause>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Processor>, ConfigError> + Send + Sync + 'static,
    {
        Self {
            source: Source::Deferred(Arc::new(factory)),
            hooks: Hooks::default(),
            clause,
            forbidden: false,
            qualifiers: Vec::new(),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn clause(&self) -> Option<Clause> {
        self.clause
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    pub fn is_qualified(&self) -> bool {
        !self.qualifiers.is_empty()
    }

    pub fn is_forbidden(&self) -> bool {
        self.forbidden
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn source(&self) -> &Source {
        &self.source
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("label", &self.label)
            .field("clause", &self.clause)
            .field("forbidden", &self.forbidden)
            .field("qualifiers", &self.qualifiers)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Anything that can be declared as a schema step.
pub trait IntoStep {
    fn into_step(self) -> Step;
}

impl<P: Processor + 'static> IntoStep for P {
    fn into_step(self) -> Step {
        Step::new(self)
    }
}

impl IntoStep for Step {
    fn into_step(self) -> Step {
        self
    }
}

impl IntoStep for Flag {
    fn into_step(self) -> Step {
        let class = self.class();
        Step::deferred(class.name, class.clause, move || {
            let processor = self.instantiate()?;
            Ok(Arc::new(processor) as Arc<dyn Processor>)
        })
    }
}

/// Builder methods available on every step-like value.
///
/// ```rust
/// use carafe::prelude::*;
///
/// let step = maxlength(3)
///     .apply_to(0usize..2)
///     .with_failsafe(|_data: Data, _state: &mut State<'_>| Ok(Data::Null));
/// assert!(step.is_qualified());
/// assert_eq!(step.hooks().failsafe.len(), 1);
/// ```
pub trait StepExt: IntoStep + Sized {
    /// Target specific positions. Repeated calls union their qualifiers.
    fn apply_to(self, qualifier: impl Into<Qualifier>) -> Step {
        let mut step = self.into_step();
        step.qualifiers.push(qualifier.into());
        step
    }

    /// Materialize a value when the processor receives `Missing`.
    fn with_default<F>(self, hook: F) -> Step
    where
        F: Fn(Data, &mut State<'_>) -> Outcome + Send + Sync + 'static,
    {
        let mut step = self.into_step();
        step.hooks.defaults.push(Arc::new(hook));
        step
    }

    /// Replace the incoming value before the processor runs.
    fn with_override<F>(self, hook: F) -> Step
    where
        F: Fn(Data, &mut State<'_>) -> Outcome + Send + Sync + 'static,
    {
        let mut step = self.into_step();
        step.hooks.overrides.push(Arc::new(hook));
        step
    }

    /// Try to recover when the processor rejects the value.
    fn with_failsafe<F>(self, hook: F) -> Step
    where
        F: Fn(Data, &mut State<'_>) -> Outcome + Send + Sync + 'static,
    {
        let mut step = self.into_step();
        step.hooks.failsafe.push(Arc::new(hook));
        step
    }

    /// Tag the step as a member of a mandatory-clause family so schema
    /// assembly treats it as the user's choice for that clause.
    fn as_clause(self, clause: Clause) -> Step {
        let mut step = self.into_step();
        step.clause = Some(clause);
        step
    }

    fn forbid_qualifiers(self) -> Step {
        let mut step = self.into_step();
        step.forbidden = true;
        step
    }
}

impl<T: IntoStep> StepExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{func, required, TypeCheck};

    #[test]
    fn processors_take_their_name_and_clause() {
        let step = TypeCheck::Array.into_step();
        assert_eq!(step.label(), "array");
        assert_eq!(step.clause(), None);
        assert!(!step.is_qualified());
    }

    #[test]
    fn flags_defer_construction() {
        let step = required().into_step();
        assert!(matches!(step.source(), Source::Deferred(_)));
        assert_eq!(step.clause(), Some(Clause::Required));
        assert!(step.source().resolve().is_ok());
    }

    #[test]
    fn apply_to_accumulates() {
        let step = TypeCheck::Primitive.apply_to(0usize).apply_to(vec![2usize, 3]);
        assert_eq!(step.qualifiers().len(), 2);
    }

    #[test]
    fn hooks_accumulate_in_registration_order() {
        let step = func(|data: Data, _state: &mut State<'_>| Ok(data))
            .with_default(|_d: Data, _s: &mut State<'_>| Ok(Data::from("a")))
            .with_default(|_d: Data, _s: &mut State<'_>| Ok(Data::from("b")))
            .with_override(|d: Data, _s: &mut State<'_>| Ok(d));
        assert_eq!(step.hooks().defaults.len(), 2);
        assert_eq!(step.hooks().overrides.len(), 1);
        assert!(step.hooks().failsafe.is_empty());
    }

    #[test]
    fn as_clause_tags_user_processors() {
        let step = func(|data: Data, _state: &mut State<'_>| Ok(data)).as_clause(Clause::Null);
        assert_eq!(step.clause(), Some(Clause::Null));
        assert_eq!(step.label(), "function");
    }
}
