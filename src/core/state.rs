//! Transient per-run state threaded through processors.
//!
//! A `State` lives for exactly one runner-stack run. Nested contexts build
//! their own, so sibling stacks never see each other's bookkeeping.

use super::data::Data;
use crate::context::{Context, ContextKind};
use crate::errors::ConfigError;
use crate::qualifiers::QualifierKind;
use std::collections::BTreeSet;

/// Which array positions the qualified entries of a stack touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMatches {
    pub by_index: BTreeSet<usize>,
    pub by_call: BTreeSet<usize>,
    pub not_matched: BTreeSet<usize>,
}

/// Which object keys the qualified entries of a stack touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberMatches {
    pub by_key: BTreeSet<String>,
    pub by_call: BTreeSet<String>,
    pub not_matched: BTreeSet<String>,
}

impl MemberMatches {
    pub fn is_matched(&self, key: &str) -> bool {
        self.by_key.contains(key) || self.by_call.contains(key)
    }

    /// Keys of `data` that no qualified entry matched.
    pub fn unmatched<'d>(&self, data: &'d Data) -> Vec<&'d str> {
        data.as_map()
            .map(|members| {
                members
                    .keys()
                    .map(String::as_str)
                    .filter(|k| !self.is_matched(k))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matches {
    Items(ItemMatches),
    Members(MemberMatches),
}

impl Matches {
    pub fn for_kind(kind: QualifierKind) -> Self {
        match kind {
            QualifierKind::Items => Self::Items(ItemMatches::default()),
            QualifierKind::Members => Self::Members(MemberMatches::default()),
        }
    }
}

/// Per-run record handed to every processor.
///
/// Carries the match bookkeeping written by qualifier stacks and a
/// back-reference to the context whose stack is running (if any).
#[derive(Debug, Default)]
pub struct State<'c> {
    context: Option<&'c Context>,
    matches: Option<Matches>,
}

impl<'c> State<'c> {
    /// Fresh state for a stack owned by `context`.
    pub fn new(context: Option<&'c Context>) -> Self {
        let matches = context
            .and_then(|c| c.kind().qualifier_kind())
            .map(Matches::for_kind);
        Self { context, matches }
    }

    /// State for a stack bound to a context kind but run without a context.
    pub fn for_kind(kind: Option<ContextKind>) -> Self {
        Self {
            context: None,
            matches: kind
                .and_then(ContextKind::qualifier_kind)
                .map(Matches::for_kind),
        }
    }

    /// State for a stack that is not owned by any context.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&'c Context> {
        self.context
    }

    pub fn context_kind(&self) -> Option<ContextKind> {
        self.context.map(Context::kind)
    }

    pub fn matches(&self) -> Option<&Matches> {
        self.matches.as_ref()
    }

    pub fn member_matches(&self) -> Option<&MemberMatches> {
        match &self.matches {
            Some(Matches::Members(m)) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn item_matches_mut(&mut self) -> Result<&mut ItemMatches, ConfigError> {
        match self
            .matches
            .get_or_insert_with(|| Matches::for_kind(QualifierKind::Items))
        {
            Matches::Items(m) => Ok(m),
            Matches::Members(_) => Err(ConfigError::UnstableState {
                expected: "item",
            }),
        }
    }

    pub(crate) fn member_matches_mut(&mut self) -> Result<&mut MemberMatches, ConfigError> {
        match self
            .matches
            .get_or_insert_with(|| Matches::for_kind(QualifierKind::Members))
        {
            Matches::Members(m) => Ok(m),
            Matches::Items(_) => Err(ConfigError::UnstableState {
                expected: "member",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detached_state_initializes_matches_lazily() {
        let mut state = State::detached();
        assert!(state.matches().is_none());
        state.item_matches_mut().unwrap().by_index.insert(3);
        assert_eq!(
            state.matches(),
            Some(&Matches::Items(ItemMatches {
                by_index: [3].into_iter().collect(),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn mixing_bookkeeping_variants_is_unstable() {
        let mut state = State::detached();
        state.item_matches_mut().unwrap();
        assert_eq!(
            state.member_matches_mut().unwrap_err(),
            ConfigError::UnstableState { expected: "member" }
        );
    }

    #[test]
    fn unmatched_lists_keys_no_entry_touched() {
        let mut matches = MemberMatches::default();
        matches.by_key.insert("a".into());
        matches.by_call.insert("b".into());
        let data = Data::from(json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(matches.unmatched(&data), vec!["c"]);
    }
}
