//! Key-based targeting for object contexts.

use super::{invalid, ElementErrors, MatchedBy, Predicate, Qualifier, QualifierKind};
use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, Outcome, ProcessError, ValidationError};
use crate::runners::Runner;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct MemberQualifierStack {
    keys: BTreeSet<String>,
    calls: Vec<Predicate>,
}

impl MemberQualifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, qualifier: Qualifier) -> Result<(), ConfigError> {
        match qualifier {
            Qualifier::Key(k) => {
                self.keys.insert(k);
            }
            Qualifier::Keys(v) => self.keys.extend(v),
            Qualifier::Call(p) => self.calls.push(p),
            other => return Err(invalid(&other, QualifierKind::Members)),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.calls.is_empty()
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    pub fn qualify(&self, key: &str, value: &Data) -> Option<MatchedBy> {
        if self.keys.contains(key) {
            return Some(MatchedBy::Explicit);
        }
        let position = Position::Key(key.to_string());
        self.calls
            .iter()
            .any(|p| p.check(&position, value))
            .then_some(MatchedBy::Call)
    }

    /// Run `runner` on each targeted member.
    ///
    /// Declared keys absent from the object are then offered to the runner
    /// as `Missing`. A concrete result is inserted; `Missing` or a rejection
    /// leaves the key absent.
    pub fn apply(&self, data: Data, runner: &Runner, state: &mut State<'_>) -> Outcome {
        let members = match data {
            Data::Missing | Data::Null => return Ok(data),
            Data::Map(members) => members,
            other => return Err(ValidationError::wrong_type("object", &other).into()),
        };

        let mut errors = ElementErrors::default();
        let mut out = members.clone();
        for (key, value) in members {
            let matched = self.qualify(&key, &value);
            let matches = state.member_matches_mut()?;
            match matched {
                Some(MatchedBy::Explicit) => matches.by_key.insert(key.clone()),
                Some(MatchedBy::Call) => matches.by_call.insert(key.clone()),
                None => {
                    matches.not_matched.insert(key);
                    continue;
                }
            };
            tracing::trace!(key = %key, runner = runner.name(), "dispatching to member");
            match runner.run(value, state) {
                Ok(processed) => {
                    out.insert(key, processed);
                }
                Err(error) => errors.record(error, Position::Key(key))?,
            }
        }

        let absent: Vec<&String> = self.keys.iter().filter(|k| !out.contains_key(*k)).collect();
        for key in absent {
            state.member_matches_mut()?.by_key.insert(key.clone());
            match runner.run(Data::Missing, state) {
                Ok(Data::Missing) => {}
                Ok(materialized) => {
                    tracing::trace!(key = %key, "materialized missing member");
                    out.insert(key.clone(), materialized);
                }
                Err(ProcessError::Invalid(error)) => {
                    tracing::trace!(key = %key, %error, "missing member left absent");
                }
                Err(config) => return Err(config),
            }
        }
        errors.finish(Data::Map(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{func, required, IntoStep, StepExt};
    use serde_json::json;

    fn upper() -> Runner {
        Runner::new(func(|data: Data, _state: &mut State<'_>| match data {
            Data::Str(s) => Ok(Data::Str(s.to_uppercase())),
            other => Ok(other),
        }).into_step())
        .unwrap()
    }

    #[test]
    fn applies_to_keys_and_predicates() {
        let mut stack = MemberQualifierStack::new();
        stack.add(Qualifier::from("first")).unwrap();
        stack
            .add(Qualifier::call(|pos, _value| pos.key() == Some("last")))
            .unwrap();
        let mut state = State::detached();

        let out = stack
            .apply(
                Data::from(json!({"first": "ada", "last": "lovelace", "other": "x"})),
                &upper(),
                &mut state,
            )
            .unwrap();
        assert_eq!(
            out,
            Data::from(json!({"first": "ADA", "last": "LOVELACE", "other": "x"}))
        );

        let matches = state.member_matches().unwrap();
        assert!(matches.by_key.contains("first"));
        assert!(matches.by_call.contains("last"));
        assert!(matches.not_matched.contains("other"));
    }

    #[test]
    fn missing_declared_keys_are_materialized_by_defaults() {
        let runner = Runner::new(
            required().with_default(|_data: Data, _state: &mut State<'_>| Ok(Data::from("b"))),
        )
        .unwrap();
        let mut stack = MemberQualifierStack::new();
        stack.add(Qualifier::from("a")).unwrap();

        let out = stack
            .apply(Data::from(json!({})), &runner, &mut State::detached())
            .unwrap();
        assert_eq!(out, Data::from(json!({"a": "b"})));
    }

    #[test]
    fn missing_optional_keys_stay_absent() {
        let runner = upper();
        let mut stack = MemberQualifierStack::new();
        stack.add(Qualifier::from(vec!["a", "b"])).unwrap();

        let out = stack
            .apply(Data::from(json!({"a": "x"})), &runner, &mut State::detached())
            .unwrap();
        assert_eq!(out, Data::from(json!({"a": "X"})));
    }

    #[test]
    fn rejected_missing_keys_stay_absent() {
        let runner = Runner::new(required().into_step()).unwrap();
        let mut stack = MemberQualifierStack::new();
        stack.add(Qualifier::from("email")).unwrap();
        let mut state = State::detached();

        let out = stack
            .apply(Data::from(json!({"name": "ada"})), &runner, &mut state)
            .unwrap();
        assert_eq!(out, Data::from(json!({"name": "ada"})));
        assert!(state.member_matches().unwrap().is_matched("email"));
    }

    #[test]
    fn config_errors_from_missing_keys_propagate() {
        let runner = Runner::new(
            func(|data: Data, _state: &mut State<'_>| {
                if data.is_missing() {
                    Err(ConfigError::InvalidConfig("broken".into()).into())
                } else {
                    Ok(data)
                }
            })
            .into_step(),
        )
        .unwrap();
        let mut stack = MemberQualifierStack::new();
        stack.add(Qualifier::from("a")).unwrap();

        let error = stack
            .apply(Data::from(json!({"b": 1})), &runner, &mut State::detached())
            .unwrap_err();
        assert_eq!(
            error,
            ProcessError::Config(ConfigError::InvalidConfig("broken".into()))
        );
    }
}
