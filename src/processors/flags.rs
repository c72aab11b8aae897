//! Boolean flag processors.
//!
//! Each flag family is a pair of mutually inverse classes, exactly one of
//! which is *active* (carries the check). Instantiating the inactive class
//! yields the active one with the flag negated, so `optional()` behaves
//! like `required().with_flag(false)` and `!required()` is `optional()`.

use super::Processor;
use crate::core::{Data, State};
use crate::errors::{ConfigError, Outcome, ValidationError};
use std::fmt;
use std::ops::Not;
use std::sync::OnceLock;

/// Mandatory-clause families recognised by schema assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Required,
    Null,
    Empty,
}

impl Clause {
    pub fn name(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Null => "null",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check run by an active flag processor.
pub type FlagCheck = fn(&FlagProcessor, Data) -> Outcome;

/// One side of a flag family.
pub struct FlagClass {
    pub name: &'static str,
    pub clause: Option<Clause>,
    default_flag: bool,
    check: Option<FlagCheck>,
    inverse: &'static FlagClass,
}

impl FlagClass {
    /// The side of a pair that carries the check.
    pub const fn active(
        name: &'static str,
        clause: Option<Clause>,
        check: FlagCheck,
        inverse: &'static FlagClass,
    ) -> Self {
        Self {
            name,
            clause,
            default_flag: true,
            check: Some(check),
            inverse,
        }
    }

    /// The mirror side; constructs its active inverse with the flag negated.
    pub const fn inactive(
        name: &'static str,
        clause: Option<Clause>,
        inverse: &'static FlagClass,
    ) -> Self {
        Self {
            name,
            clause,
            default_flag: true,
            check: None,
            inverse,
        }
    }

    pub fn is_active(&self) -> bool {
        self.check.is_some()
    }

    pub fn inverse(&self) -> &'static FlagClass {
        self.inverse
    }
}

impl fmt::Debug for FlagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagClass")
            .field("name", &self.name)
            .field("clause", &self.clause)
            .field("active", &self.is_active())
            .finish()
    }
}

pub static REQUIRED: FlagClass =
    FlagClass::active("required", Some(Clause::Required), check_required, &OPTIONAL);
pub static OPTIONAL: FlagClass = FlagClass::inactive("optional", Some(Clause::Required), &REQUIRED);

pub static REJECT_NULL: FlagClass =
    FlagClass::active("rejectnull", Some(Clause::Null), check_null, &ALLOW_NULL);
pub static ALLOW_NULL: FlagClass =
    FlagClass::inactive("allownull", Some(Clause::Null), &REJECT_NULL);

pub static REJECT_EMPTY: FlagClass =
    FlagClass::active("rejectempty", Some(Clause::Empty), check_empty, &ALLOW_EMPTY);
pub static ALLOW_EMPTY: FlagClass =
    FlagClass::inactive("allowempty", Some(Clause::Empty), &REJECT_EMPTY);

fn check_required(processor: &FlagProcessor, data: Data) -> Outcome {
    if processor.flag && data.is_missing() {
        return Err(ValidationError::interrupting("data is required").into());
    }
    Ok(data)
}

fn check_null(processor: &FlagProcessor, data: Data) -> Outcome {
    if processor.flag && data.is_null() {
        return Err(ValidationError::new("data must not be null").into());
    }
    Ok(data)
}

fn check_empty(processor: &FlagProcessor, data: Data) -> Outcome {
    if processor.flag && data.is_empty_value() {
        return Err(ValidationError::new("data must not be empty").into());
    }
    Ok(data)
}

/// Handle on a flag class.
#[derive(Clone, Copy)]
pub struct Flag(&'static FlagClass);

impl Flag {
    pub const fn of(class: &'static FlagClass) -> Self {
        Self(class)
    }

    pub fn class(self) -> &'static FlagClass {
        self.0
    }

    pub fn name(self) -> &'static str {
        self.0.name
    }

    pub fn clause(self) -> Option<Clause> {
        self.0.clause
    }

    /// Build a processor with the class's default flag.
    pub fn instantiate(self) -> Result<FlagProcessor, ConfigError> {
        self.with_flag(self.0.default_flag)
    }

    /// Build a processor with an explicit flag. An inactive class resolves
    /// to its active inverse with `!flag`.
    pub fn with_flag(self, flag: bool) -> Result<FlagProcessor, ConfigError> {
        let class = self.0;
        if class.is_active() {
            Ok(FlagProcessor::new(self, flag))
        } else if class.inverse.is_active() {
            Ok(FlagProcessor::new(Flag(class.inverse), !flag))
        } else {
            Err(ConfigError::InactivePair {
                first: class.name,
                second: class.inverse.name,
            })
        }
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Flag {}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flag({})", self.0.name)
    }
}

impl Not for Flag {
    type Output = Flag;

    fn not(self) -> Flag {
        Flag(self.0.inverse)
    }
}

/// An instantiated flag: an active class plus its resolved boolean.
pub struct FlagProcessor {
    class: Flag,
    flag: bool,
    mirror: OnceLock<Box<FlagProcessor>>,
}

impl FlagProcessor {
    fn new(class: Flag, flag: bool) -> Self {
        Self {
            class,
            flag,
            mirror: OnceLock::new(),
        }
    }

    pub fn flag(&self) -> bool {
        self.flag
    }

    /// The active class this processor was resolved to.
    pub fn class(&self) -> Flag {
        self.class
    }

    /// The class this processor behaves as: the active class when the flag
    /// is set, its inverse otherwise.
    pub fn effective(&self) -> Flag {
        if self.flag {
            self.class
        } else {
            !self.class
        }
    }

    pub fn is(&self, flag: Flag) -> bool {
        self.effective() == flag
    }

    /// The same family with the opposite flag, built on first use.
    pub fn mirror(&self) -> &FlagProcessor {
        self.mirror
            .get_or_init(|| Box::new(FlagProcessor::new(self.class, !self.flag)))
    }
}

impl Clone for FlagProcessor {
    fn clone(&self) -> Self {
        Self::new(self.class, self.flag)
    }
}

impl fmt::Debug for FlagProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagProcessor")
            .field("class", &self.class.name())
            .field("flag", &self.flag)
            .finish()
    }
}

impl Processor for FlagProcessor {
    fn run(&self, data: Data, _state: &mut State<'_>) -> Outcome {
        match self.class.0.check {
            Some(check) => check(self, data),
            None => Ok(data),
        }
    }

    fn clause(&self) -> Option<Clause> {
        self.class.clause()
    }

    fn name(&self) -> String {
        self.effective().name().to_string()
    }
}

pub fn required() -> Flag {
    Flag(&REQUIRED)
}

pub fn optional() -> Flag {
    Flag(&OPTIONAL)
}

pub fn rejectnull() -> Flag {
    Flag(&REJECT_NULL)
}

pub fn allownull() -> Flag {
    Flag(&ALLOW_NULL)
}

pub fn rejectempty() -> Flag {
    Flag(&REJECT_EMPTY)
}

pub fn allowempty() -> Flag {
    Flag(&ALLOW_EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(processor: &FlagProcessor, data: Data) -> Outcome {
        processor.run(data, &mut State::detached())
    }

    #[test]
    fn negation_swaps_classes() {
        assert_eq!(!required(), optional());
        assert_eq!(!optional(), required());
        assert_eq!(!!allownull(), allownull());
        assert_ne!(required(), rejectnull());
    }

    #[test]
    fn inactive_with_flag_equals_active_with_negation() {
        let optional = optional().with_flag(false).unwrap();
        let required = required().instantiate().unwrap();
        assert_eq!(optional.class(), required.class());
        assert_eq!(optional.flag(), required.flag());
        assert!(optional.is(super::required()));
    }

    #[test]
    fn required_rejects_missing_only_when_set() {
        let required = required().instantiate().unwrap();
        let error = run(&required, Data::Missing).unwrap_err();
        assert_eq!(error.validation().unwrap().message, "data is required");
        assert_eq!(run(&required, Data::Null).unwrap(), Data::Null);

        let optional = optional().instantiate().unwrap();
        assert_eq!(run(&optional, Data::Missing).unwrap(), Data::Missing);
    }

    #[test]
    fn null_flags() {
        let reject = rejectnull().instantiate().unwrap();
        let error = run(&reject, Data::Null).unwrap_err();
        assert_eq!(error.validation().unwrap().message, "data must not be null");

        let allow = allownull().instantiate().unwrap();
        assert_eq!(run(&allow, Data::Null).unwrap(), Data::Null);
        assert!(allow.is(allownull()));
    }

    #[test]
    fn empty_flags_leave_zero_and_false_alone() {
        let reject = rejectempty().instantiate().unwrap();
        for empty in [Data::from(""), Data::List(vec![]), Data::tuple(Vec::<i64>::new())] {
            let error = run(&reject, empty).unwrap_err();
            assert_eq!(error.validation().unwrap().message, "data must not be empty");
        }
        assert_eq!(run(&reject, Data::Int(0)).unwrap(), Data::Int(0));
        assert_eq!(run(&reject, Data::Bool(false)).unwrap(), Data::Bool(false));
    }

    #[test]
    fn mirror_holds_opposite_flag() {
        let required = required().instantiate().unwrap();
        let mirror = required.mirror();
        assert!(!mirror.flag());
        assert!(mirror.is(optional()));
        assert!(mirror.mirror().is(super::required()));
    }

    #[test]
    fn clause_is_shared_by_both_sides() {
        assert_eq!(required().clause(), Some(Clause::Required));
        assert_eq!(optional().clause(), Some(Clause::Required));
        assert_eq!(allowempty().clause(), Some(Clause::Empty));
    }

    static LEFT: FlagClass = FlagClass::inactive("left", None, &RIGHT);
    static RIGHT: FlagClass = FlagClass::inactive("right", None, &LEFT);

    #[test]
    fn two_inactive_classes_cannot_be_built() {
        let error = Flag::of(&LEFT).instantiate().unwrap_err();
        assert_eq!(
            error,
            ConfigError::InactivePair {
                first: "left",
                second: "right"
            }
        );
    }
}
