//! Index-based targeting for array contexts.

use super::{invalid, ElementErrors, MatchedBy, Predicate, Qualifier, QualifierKind};
use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, Outcome, ValidationError};
use crate::runners::Runner;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct ItemQualifierStack {
    indices: BTreeSet<usize>,
    calls: Vec<Predicate>,
}

impl ItemQualifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, qualifier: Qualifier) -> Result<(), ConfigError> {
        match qualifier {
            Qualifier::Index(i) => {
                self.indices.insert(i);
            }
            Qualifier::Indices(v) => self.indices.extend(v),
            Qualifier::Call(p) => self.calls.push(p),
            other => return Err(invalid(&other, QualifierKind::Items)),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.calls.is_empty()
    }

    pub fn indices(&self) -> &BTreeSet<usize> {
        &self.indices
    }

    pub fn qualify(&self, index: usize, value: &Data) -> Option<MatchedBy> {
        if self.indices.contains(&index) {
            return Some(MatchedBy::Explicit);
        }
        let position = Position::Index(index);
        self.calls
            .iter()
            .any(|p| p.check(&position, value))
            .then_some(MatchedBy::Call)
    }

    /// Run `runner` on each targeted item; untargeted items pass through at
    /// their original position.
    pub fn apply(&self, data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
        let items = match data {
            Data::Missing | Data::Null => return Ok(data),
            Data::List(items) | Data::Tuple(items) => items,
            other => return Err(ValidationError::wrong_type("array", &other).into()),
        };

        let mut errors = ElementErrors::default();
        let mut out = Vec::with_capacity(items.len());
        for (index, value) in items.into_iter().enumerate() {
            let matched = self.qualify(index, &value);
            let matches = state.item_matches_mut()?;
            match matched {
                Some(MatchedBy::Explicit) => matches.by_index.insert(index),
                Some(MatchedBy::Call) => matches.by_call.insert(index),
                None => {
                    matches.not_matched.insert(index);
                    out.push(value);
                    continue;
                }
            };
            tracing::trace!(index, runner = runner.name(), "dispatching to item");
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
}
