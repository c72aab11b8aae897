//! A small library of ready-made leaf processors.

use super::flags::{Flag, FlagClass, FlagProcessor};
use super::Processor;
use crate::core::{Data, Position, State};
use crate::errors::{ConfigError, ErrorDetail, Outcome, ValidationError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub static IS_STR: FlagClass = FlagClass::active("is_str", None, check_str, &NOT_STR);
pub static NOT_STR: FlagClass = FlagClass::inactive("not_str", None, &IS_STR);

pub static IS_INT: FlagClass = FlagClass::active("is_int", None, check_int, &NOT_INT);
pub static NOT_INT: FlagClass = FlagClass::inactive("not_int", None, &IS_INT);

fn check_str(processor: &FlagProcessor, data: Data) -> Outcome {
    if data.is_missing() || data.is_null() {
        return Ok(data);
    }
    let is_str = matches!(data, Data::Str(_));
    match (processor.flag(), is_str) {
        (true, false) => Err(ValidationError::wrong_type("string", &data).into()),
        (false, true) => Err(ValidationError::new("data should not be a string").into()),
        _ => Ok(data),
    }
}

fn check_int(processor: &FlagProcessor, data: Data) -> Outcome {
    if data.is_missing() || data.is_null() {
        return Ok(data);
    }
    let is_int = matches!(data, Data::Int(_));
    match (processor.flag(), is_int) {
        (true, false) => Err(ValidationError::wrong_type("int", &data).into()),
        (false, true) => Err(ValidationError::new("data should not be an int").into()),
        _ => Ok(data),
    }
}

/// Rejects anything but strings. `!is_str()` rejects strings instead.
pub fn is_str() -> Flag {
    Flag::of(&IS_STR)
}

pub fn not_str() -> Flag {
    Flag::of(&NOT_STR)
}

/// Rejects anything but integers; booleans and floats are not integers.
pub fn is_int() -> Flag {
    Flag::of(&IS_INT)
}

pub fn not_int() -> Flag {
    Flag::of(&NOT_INT)
}

/// Truncates sequences, strings and bytes to at most `max` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    pub max: usize,
}

impl Processor for MaxLength {
    fn run(&self, data: Data, _state: &mut State<'_>) -> Outcome {
        let max = self.max;
        let truncated = match data {
            Data::Missing | Data::Null => data,
            Data::List(mut v) => {
                v.truncate(max);
                Data::List(v)
            }
            Data::Tuple(mut v) => {
                v.truncate(max);
                Data::Tuple(v)
            }
            Data::Set(mut v) => {
                v.truncate(max);
                Data::Set(v)
            }
            Data::Bytes(mut b) => {
                b.truncate(max);
                Data::Bytes(b)
            }
            Data::Str(s) => match s.char_indices().nth(max) {
                Some((end, _)) => Data::Str(s[..end].to_string()),
                None => Data::Str(s),
            },
            other => return Err(ValidationError::wrong_type("sized value", &other).into()),
        };
        Ok(truncated)
    }

    fn name(&self) -> String {
        "maxlength".to_string()
    }
}

pub fn maxlength(max: usize) -> MaxLength {
    MaxLength { max }
}

/// What to do with object members no qualified entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    #[default]
    Remove,
    Raise,
    Ignore,
}

impl FromStr for UnmatchedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remove" => Ok(Self::Remove),
            "raise" => Ok(Self::Raise),
            "ignore" => Ok(Self::Ignore),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remove => "remove",
            Self::Raise => "raise",
            Self::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

/// Handles members of an object that the schema never declared.
///
/// Must run inside an object context, after the qualified entries it
/// reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedProperties {
    pub policy: UnmatchedPolicy,
}

impl Processor for UnmatchedProperties {
    fn run(&self, data: Data, state: &mut State<'_>) -> Outcome {
        let matches = state.member_matches().ok_or_else(|| ConfigError::WrongContext {
            name: self.name(),
        })?;
        let mut members = match data {
            Data::Map(members) => members,
            other => return Ok(other),
        };
        let unmatched: Vec<String> = members
            .keys()
            .filter(|k| !matches.is_matched(k))
            .cloned()
            .collect();
        match self.policy {
            UnmatchedPolicy::Ignore => {}
            UnmatchedPolicy::Remove => {
                for key in &unmatched {
                    members.remove(key);
                }
                if !unmatched.is_empty() {
                    tracing::debug!(removed = ?unmatched, "dropped undeclared members");
                }
            }
            UnmatchedPolicy::Raise => {
                if let Some(first) = unmatched.first() {
                    return Err(ValidationError::new("key not in schema")
                        .with_detail(ErrorDetail::Note {
                            text: format!("undeclared members: {}", unmatched.join(", ")),
                        })
                        .at(Position::Key(first.clone()))
                        .into());
                }
            }
        }
        Ok(Data::Map(members))
    }

    fn name(&self) -> String {
        "unmatched_properties".to_string()
    }
}

pub fn unmatched_properties(policy: UnmatchedPolicy) -> UnmatchedProperties {
    UnmatchedProperties { policy }
}
