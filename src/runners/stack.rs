//! Ordered execution of runners with error collection.

use super::runner::Runner;
use crate::context::{Context, ContextKind};
use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, Error, Outcome, ProcessError, ValidationError, ValidationErrorStack};
use crate::processors::{Clause, IntoStep};
use crate::qualifiers::{ElementErrors, Qualifier, QualifierStack};
use std::sync::Arc;

/// Qualifier state of one stack entry.
#[derive(Debug, Clone)]
pub enum QualifierSlot {
    /// Applies to the whole value (or every element, for dispatch contexts).
    Open,
    /// May never be qualified.
    Forbidden,
    Stack(QualifierStack),
}

#[derive(Debug, Clone)]
pub struct Entry {
    runner: Arc<Runner>,
    qualifiers: QualifierSlot,
}

impl Entry {
    pub fn runner(&self) -> &Arc<Runner> {
        &self.runner
    }

    pub fn qualifiers(&self) -> &QualifierSlot {
        &self.qualifiers
    }
}

/// FIFO pipeline of runners bound to a context kind.
///
/// Each run starts from a fresh [`State`]. Validation errors are collected;
/// an interrupting error stops the remaining entries. Configuration errors
/// abort immediately. A `required`-family runner that lets `Missing`
/// through ends the run: there is nothing left to check.
#[derive(Debug, Clone, Default)]
pub struct RunnerStack {
    binding: Option<ContextKind>,
    entries: Vec<Entry>,
}

impl RunnerStack {
    pub fn new(binding: Option<ContextKind>) -> Self {
        Self {
            binding,
            entries: Vec::new(),
        }
    }

    pub fn binding(&self) -> Option<ContextKind> {
        self.binding
    }

    /// Build a runner for `step` and append it, together with any
    /// qualifiers the step was declared with.
    pub fn add(&mut self, step: impl IntoStep) -> Result<(), ConfigError> {
        let mut step = step.into_step();
        let qualifiers = std::mem::take(&mut step.qualifiers);
        let slot = if step.forbidden {
            QualifierSlot::Forbidden
        } else {
            QualifierSlot::Open
        };
        self.push(Arc::new(Runner::new(step)?), slot);
        if !qualifiers.is_empty() {
            self.add_qualifiers(qualifiers)?;
        }
        Ok(())
    }

    pub fn push(&mut self, runner: Arc<Runner>, qualifiers: QualifierSlot) {
        self.entries.push(Entry { runner, qualifiers });
    }

    /// Qualify the most recently added runner. Repeated calls merge.
    pub fn add_qualifiers<I>(&mut self, qualifiers: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = Qualifier>,
    {
        let binding = self.binding;
        let entry = self.entries.last_mut().ok_or(ConfigError::NoRunner)?;
        if matches!(entry.qualifiers, QualifierSlot::Forbidden) {
            return Err(ConfigError::QualifiersForbidden {
                name: entry.runner.name().to_string(),
            });
        }
        let binding = binding.ok_or(ConfigError::MissingContext)?;
        let kind = binding
            .qualifier_kind()
            .ok_or_else(|| ConfigError::NoQualifierStack {
                kind: binding.to_string(),
            })?;

        if !matches!(entry.qualifiers, QualifierSlot::Stack(_)) {
            entry.qualifiers = QualifierSlot::Stack(QualifierStack::for_kind(kind));
        }
        if let QualifierSlot::Stack(stack) = &mut entry.qualifiers {
            for qualifier in qualifiers {
                stack.add(qualifier)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Independent entry list sharing the same runners.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Like [`copy`](Self::copy), bound to another context kind (or none).
    pub fn rebind(&self, binding: Option<ContextKind>) -> Self {
        Self {
            binding,
            entries: self.entries.clone(),
        }
    }

    pub fn run(&self, data: Data) -> Result<Data, Error> {
        self.run_with(data, None)
    }

    /// Run every entry in order against `data`, on behalf of `context`.
    pub fn run_with(&self, data: Data, context: Option<&Context>) -> Result<Data, Error> {
        let mut state = match context {
            Some(context) => State::new(Some(context)),
            None => State::for_kind(self.binding),
        };
        let mut data = data;
        let mut errors = ValidationErrorStack::new();
        tracing::trace!(entries = self.entries.len(), binding = ?self.binding, "running stack");

        for entry in &self.entries {
            let result = match &entry.qualifiers {
                QualifierSlot::Stack(stack) if !stack.is_empty() => {
                    stack.apply(data.clone(), &entry.runner, &mut state)
                }
                _ => self.dispatch(data.clone(), &entry.runner, &mut state),
            };
            match result {
                Ok(next) if next.is_missing() && entry.runner.clause() == Some(Clause::Required) => {
                    tracing::trace!(runner = entry.runner.name(), "absent optional value, stopping");
                    data = next;
                    break;
                }
                Ok(next) => data = next,
                Err(ProcessError::Invalid(error)) => {
                    let interrupt = error.interrupt;
                    tracing::debug!(
                        runner = entry.runner.name(),
                        %error,
                        interrupt,
                        "processor rejected data"
                    );
                    errors.push(error.with_data(data.clone()));
                    if interrupt {
                        break;
                    }
                }
                Err(ProcessError::Config(error)) => return Err(Error::Config(error)),
            }
        }

        if errors.is_empty() {
            Ok(data)
        } else {
            errors.data = Some(data);
            Err(Error::Invalid(errors))
        }
    }

    /// Unqualified entries: element-dispatch contexts fan out to every
    /// element; all others see the whole value.
    fn dispatch(&self, data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
        match self.binding {
            Some(ContextKind::ArrayItems) => dispatch_items(data, runner, state),
            Some(ContextKind::ObjectMembers) => dispatch_members(data, runner, state),
            _ => runner.run(data, state),
        }
    }
}

fn dispatch_items(data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
    let items = match data {
        Data::Missing | Data::Null => return Ok(data),
        Data::List(items) | Data::Tuple(items) => items,
        other => return Err(ValidationError::wrong_type("array", &other).into()),
    };
    let mut errors = ElementErrors::default();
    let mut out = Vec::with_capacity(items.len());
    for (index, value) in items.into_iter().enumerate() {
        match runner.run(value.clone(), state) {
            Ok(processed) => out.push(processed),
            Err(error) => {
                errors.record(error, Position::Index(index))?;
                out.push(value);
            }
        }
    }
    errors.finish(Data::List(out))
}

fn dispatch_members(data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
    let members = match data {
        Data::Missing | Data::Null => return Ok(data),
        Data::Map(members) => members,
        other => return Err(ValidationError::wrong_type("object", &other).into()),
    };
    let mut errors = ElementErrors::default();
    let mut out = members.clone();
    for (key, value) in members {
        match runner.run(value, state) {
            Ok(processed) => {
                out.insert(key, processed);
            }
            Err(error) => errors.record(error, Position::Key(key))?,
        }
    }
    errors.finish(Data::Map(out))
}
