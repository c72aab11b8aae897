//! Schema assembly for primitive, array and object contexts.
//!
//! Assembly turns the steps a schema author declares into a canonical
//! pipeline:
//!
//! 1. the `required` clause (declared or injected) comes first
//! 2. the type check follows it and may never be qualified
//! 3. the declared steps keep their relative order
//! 4. the `empty` and `null` clauses are appended when undeclared
//!
//! When a clause family is declared more than once, the last declaration
//! wins.

use super::base::{Context, ContextKind};
use super::config::SchemaConfig;
use crate::errors::ConfigError;
use crate::processors::{
    Clause, Flag, IntoStep, Step, StepExt, TypeCheck, ALLOW_NULL, REJECT_EMPTY, REQUIRED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Primitive,
    Array,
    Object,
}

impl SchemaKind {
    pub fn context_kind(self) -> ContextKind {
        match self {
            Self::Primitive => ContextKind::Basic,
            Self::Array => ContextKind::Array,
            Self::Object => ContextKind::Object,
        }
    }

    pub fn type_check(self) -> TypeCheck {
        match self {
            Self::Primitive => TypeCheck::Primitive,
            Self::Array => TypeCheck::Array,
            Self::Object => TypeCheck::Object,
        }
    }
}

/// Builds type-bound contexts.
///
/// # Example
///
/// ```rust
/// use carafe::prelude::*;
///
/// let config = SchemaConfig { required: false, ..SchemaConfig::default() };
/// let schema = Schema::with_config(SchemaKind::Primitive, config)
///     .build(Vec::<Step>::new())
///     .unwrap();
///
/// assert_eq!(schema.validate(Data::Missing).unwrap(), Data::Missing);
/// assert!(schema.validate("").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    kind: SchemaKind,
    config: SchemaConfig,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self::with_config(kind, SchemaConfig::default())
    }

    pub fn with_config(kind: SchemaKind, config: SchemaConfig) -> Self {
        Self { kind, config }
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// The canonical step order for `steps`.
    pub fn assemble<I>(&self, steps: I) -> Result<Vec<Step>, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        let mut steps: Vec<Step> = steps.into_iter().map(IntoStep::into_step).collect();
        if self.kind == SchemaKind::Primitive && steps.iter().any(Step::is_qualified) {
            return Err(ConfigError::QualifiedPrimitive);
        }

        let required = match take_family(&mut steps, Clause::Required) {
            Some(step) => step,
            None => self.inject(&REQUIRED, self.config.required)?,
        };
        dedupe_family(&mut steps, Clause::Empty);
        dedupe_family(&mut steps, Clause::Null);

        let mut assembled = Vec::with_capacity(steps.len() + 4);
        assembled.push(required);
        assembled.push(self.kind.type_check().forbid_qualifiers());
        let has_empty = has_family(&steps, Clause::Empty);
        let has_null = has_family(&steps, Clause::Null);
        assembled.extend(steps);
        if !has_empty {
            assembled.push(self.inject(&REJECT_EMPTY, self.config.reject_empty)?);
        }
        if !has_null {
            assembled.push(self.inject(&ALLOW_NULL, self.config.allow_null)?);
        }
        Ok(assembled)
    }

    pub fn build<I>(&self, steps: I) -> Result<Context, ConfigError>
    where
        I: IntoIterator,
        I::Item: IntoStep,
    {
        Context::new(self.kind.context_kind(), self.assemble(steps)?)
    }

    fn inject(
        &self,
        class: &'static crate::processors::FlagClass,
        flag: bool,
    ) -> Result<Step, ConfigError> {
        let processor = Flag::of(class).with_flag(flag)?;
        tracing::debug!(
            schema = ?self.kind,
            clause = class.name,
            flag,
            "injecting undeclared clause"
        );
        Ok(Step::new(processor))
    }
}

fn has_family(steps: &[Step], clause: Clause) -> bool {
    steps.iter().any(|s| s.clause() == Some(clause))
}

/// Remove every step of `clause`'s family, returning the last one.
fn take_family(steps: &mut Vec<Step>, clause: Clause) -> Option<Step> {
    let mut last = None;
    let mut kept = Vec::with_capacity(steps.len());
    for step in steps.drain(..) {
        if step.clause() == Some(clause) {
            last = Some(step);
        } else {
            kept.push(step);
        }
    }
    *steps = kept;
    last
}

/// Keep only the last step of `clause`'s family, in place.
fn dedupe_family(steps: &mut Vec<Step>, clause: Clause) {
    if let Some(last) = steps.iter().rposition(|s| s.clause() == Some(clause)) {
        let mut index = 0;
        steps.retain(|s| {
            let keep = s.clause() != Some(clause) || index == last;
            index += 1;
            keep
        });
    }
}

pub fn prim<I>(steps: I) -> Result<Context, ConfigError>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    Schema::new(SchemaKind::Primitive).build(steps)
}

pub fn arr<I>(steps: I) -> Result<Context, ConfigError>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    Schema::new(SchemaKind::Array).build(steps)
}

pub fn obj<I>(steps: I) -> Result<Context, ConfigError>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    Schema::new(SchemaKind::Object).build(steps)
}

/// Element-dispatch array context; no clauses are injected.
pub fn items<I>(steps: I) -> Result<Context, ConfigError>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    Context::items(steps)
}

/// Element-dispatch object context; no clauses are injected.
pub fn members<I>(steps: I) -> Result<Context, ConfigError>
where
    I: IntoIterator,
    I::Item: IntoStep,
{
    Context::members(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Data, State};
    use crate::errors::Error;
    use crate::processors::{allownull, func, optional, rejectnull, required, maxlength};

    fn labels(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(Step::label).collect()
    }

    fn noop() -> Step {
        func(|data: Data, _state: &mut State<'_>| Ok(data)).into_step()
    }

    #[test]
    fn empty_declaration_gets_every_clause() {
        let steps = Schema::new(SchemaKind::Primitive)
            .assemble(Vec::<Step>::new())
            .unwrap();
        assert_eq!(
            labels(&steps),
            ["required", "primitive", "rejectempty", "allownull"]
        );
    }

    #[test]
    fn declared_required_moves_to_front() {
        let steps = Schema::new(SchemaKind::Array)
            .assemble(vec![noop(), optional().into_step(), maxlength(3).into_step()])
            .unwrap();
        assert_eq!(
            labels(&steps),
            ["optional", "array", "function", "maxlength", "rejectempty", "allownull"]
        );
    }

    #[test]
    fn declared_families_are_not_duplicated() {
        let steps = Schema::new(SchemaKind::Object)
            .assemble(vec![rejectnull().into_step(), noop(), allownull().into_step()])
            .unwrap();
        assert_eq!(
            labels(&steps),
            ["required", "object", "function", "allownull", "rejectempty"]
        );
        assert_eq!(
            steps.iter().filter(|s| s.clause() == Some(Clause::Null)).count(),
            1
        );
    }

    #[test]
    fn last_required_declaration_wins() {
        let steps = Schema::new(SchemaKind::Primitive)
            .assemble(vec![required().into_step(), optional().into_step()])
            .unwrap();
        assert_eq!(labels(&steps)[0], "optional");
        assert_eq!(
            steps.iter().filter(|s| s.clause() == Some(Clause::Required)).count(),
            1
        );
    }

    #[test]
    fn type_check_is_never_qualifiable() {
        let steps = Schema::new(SchemaKind::Array)
            .assemble(Vec::<Step>::new())
            .unwrap();
        assert!(steps[1].is_forbidden());
    }

    #[test]
    fn primitives_reject_qualified_steps() {
        let error = prim(vec![maxlength(2).apply_to(0usize)]).unwrap_err();
        assert_eq!(error, ConfigError::QualifiedPrimitive);
    }

    #[test]
    fn config_sets_injected_polarity() {
        let config = SchemaConfig {
            required: false,
            reject_empty: false,
            allow_null: false,
        };
        let steps = Schema::with_config(SchemaKind::Primitive, config)
            .assemble(Vec::<Step>::new())
            .unwrap();
        assert_eq!(
            labels(&steps),
            ["optional", "primitive", "allowempty", "rejectnull"]
        );
    }

    #[test]
    fn default_primitive_behaviour() {
        let schema = prim(Vec::<Step>::new()).unwrap();
        assert_eq!(schema.validate("x").unwrap(), Data::from("x"));
        assert_eq!(schema.validate(Data::Null).unwrap(), Data::Null);
        assert!(schema.validate(Data::Missing).is_err());
        assert!(schema.validate("").is_err());

        let Err(Error::Invalid(errors)) = schema.validate(Data::from(vec![1])) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "wrong data type, expected primitive");
    }
}
