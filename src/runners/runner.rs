//! A resolved processor plus its hook batches.

use crate::core::{Data, State};
use crate::errors::{ConfigError, Outcome, ProcessError, ValidationError};
use crate::processors::{Clause, Hook, Hooks, Processor, Step};
use std::fmt;
use std::sync::Arc;

/// Executes one processor with override, default and failsafe semantics.
///
/// Order inside [`Runner::run`]:
/// 1. overrides replace the incoming value unconditionally
/// 2. defaults materialize a value when the input is `Missing`
/// 3. the processor runs
/// 4. on a validation failure, failsafe hooks get a chance to recover
pub struct Runner {
    processor: Arc<dyn Processor>,
    hooks: Hooks,
    clause: Option<Clause>,
    name: String,
}

impl Runner {
    /// Resolve the step's processor. Deferred sources are built here.
    pub fn new(step: Step) -> Result<Self, ConfigError> {
        let processor = step.source.resolve()?;
        Ok(Self {
            processor,
            hooks: step.hooks,
            clause: step.clause,
            name: step.label,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clause(&self) -> Option<Clause> {
        self.clause
    }

    pub fn processor(&self) -> &Arc<dyn Processor> {
        &self.processor
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn run(&self, data: Data, state: &mut State<'_>) -> Outcome {
        let mut data = data;
        if !self.hooks.overrides.is_empty() {
            data = self.run_override(data, state)?;
        }
        if data.is_missing() && !self.hooks.defaults.is_empty() {
            data = self.run_default(data, state)?;
        }
        if self.hooks.failsafe.is_empty() {
            return self.processor.run(data, state);
        }

        let input = data.clone();
        match self.processor.run(data, state) {
            Err(ProcessError::Invalid(error)) => self.save_or_fail(input, error, state),
            other => other,
        }
    }

    pub fn run_override(&self, data: Data, state: &mut State<'_>) -> Outcome {
        run_batch(&self.hooks.overrides, data, state)
    }

    pub fn run_default(&self, data: Data, state: &mut State<'_>) -> Outcome {
        run_batch(&self.hooks.defaults, data, state)
    }

    pub fn run_failsafe(&self, data: Data, state: &mut State<'_>) -> Outcome {
        run_batch(&self.hooks.failsafe, data, state)
    }

    /// Recover through the failsafe batch, or re-raise `error`.
    fn save_or_fail(&self, input: Data, error: ValidationError, state: &mut State<'_>) -> Outcome {
        match self.run_failsafe(input, state) {
            Ok(recovered) if !recovered.is_missing() => {
                tracing::debug!(runner = %self.name, %error, "failsafe recovered rejected data");
                Ok(recovered)
            }
            Err(ProcessError::Config(config)) => Err(config.into()),
            _ => Err(error.into()),
        }
    }
}

fn run_batch(hooks: &[Hook], data: Data, state: &mut State<'_>) -> Outcome {
    hooks.iter().try_fold(data, |data, hook| hook(data, state))
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("name", &self.name)
            .field("clause", &self.clause)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{func, required, IntoStep, StepExt};

    fn tag(name: &'static str) -> Step {
        func(move |data: Data, _state: &mut State<'_>| {
            let inner = data.as_str().unwrap_or_default().to_string();
            Ok(Data::Str(format!("<{name}>{inner}</{name}>")))
        })
        .into_step()
    }

    fn reject(_data: Data, _state: &mut State<'_>) -> Outcome {
        Err(ValidationError::new("rejected").into())
    }

    fn run(runner: &Runner, data: Data) -> Outcome {
        runner.run(data, &mut State::detached())
    }

    #[test]
    fn overrides_thread_in_order_before_the_processor() {
        let runner = Runner::new(
            tag("b")
                .with_override(|_d: Data, _s: &mut State<'_>| Ok(Data::from("x")))
                .with_override(|d: Data, _s: &mut State<'_>| {
                    Ok(Data::Str(format!("{}y", d.as_str().unwrap_or_default())))
                }),
        )
        .unwrap();
        assert_eq!(run(&runner, Data::from("ignored")).unwrap(), Data::from("<b>xy</b>"));
    }

    #[test]
    fn defaults_only_fire_on_missing() {
        let runner = Runner::new(
            required().with_default(|_d: Data, _s: &mut State<'_>| Ok(Data::from("fallback"))),
        )
        .unwrap();
        assert_eq!(run(&runner, Data::Missing).unwrap(), Data::from("fallback"));
        assert_eq!(run(&runner, Data::Null).unwrap(), Data::Null);
    }

    #[test]
    fn missing_required_without_default_fails() {
        let runner = Runner::new(required().into_step()).unwrap();
        assert!(run(&runner, Data::Missing).is_err());
    }

    #[test]
    fn failsafe_recovers_rejections() {
        let runner = Runner::new(
            reject.with_failsafe(|d: Data, _s: &mut State<'_>| {
                Ok(Data::Str(format!("saved {}", d.as_str().unwrap_or_default())))
            }),
        )
        .unwrap();
        assert_eq!(run(&runner, Data::from("x")).unwrap(), Data::from("saved x"));
    }

    #[test]
    fn failsafe_without_usable_value_reraises() {
        let runner = Runner::new(
            reject.with_failsafe(|_d: Data, _s: &mut State<'_>| Ok(Data::Missing)),
        )
        .unwrap();
        let error = run(&runner, Data::from("x")).unwrap_err();
        assert_eq!(error.validation().unwrap().message, "rejected");

        let runner = Runner::new(reject.with_failsafe(|_d: Data, _s: &mut State<'_>| {
            Err(ValidationError::new("failsafe also failed").into())
        }))
        .unwrap();
        let error = run(&runner, Data::from("x")).unwrap_err();
        assert_eq!(error.validation().unwrap().message, "rejected");
    }

    #[test]
    fn failsafe_skipped_on_success() {
        let runner = Runner::new(
            tag("i").with_failsafe(|_d: Data, _s: &mut State<'_>| Ok(Data::from("never"))),
        )
        .unwrap();
        assert_eq!(run(&runner, Data::from("x")).unwrap(), Data::from("<i>x</i>"));
    }

    #[test]
    fn deferred_flags_resolve_at_construction() {
        let runner = Runner::new(required().into_step()).unwrap();
        assert_eq!(runner.name(), "required");
        assert_eq!(runner.clause(), Some(Clause::Required));
    }
}
