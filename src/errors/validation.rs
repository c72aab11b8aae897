//! Validation errors: what went wrong with the data, and where.

use crate::core::{render_path, Data, DataKind, Position};
use serde::Serialize;
use std::fmt;
use std::ops::Index;
use stillwater::Semigroup;
use thiserror::Error;

/// Structured detail attached to a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorDetail {
    /// The value had the wrong runtime type.
    WrongType { expected: String, found: DataKind },
    /// A nested context failed; its full stack is kept.
    Nested { stack: ValidationErrorStack },
    Note { text: String },
}

/// A single validation failure.
///
/// `interrupt` stops the enclosing runner stack after this error is
/// recorded. `data` is a snapshot of the value as it stood when the failing
/// processor ran; the runner stack fills it in when the error surfaces.
/// `path` locates the failure relative to the data the stack was run on.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub detail: Option<ErrorDetail>,
    pub interrupt: bool,
    pub data: Option<Data>,
    pub path: Vec<Position>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            interrupt: false,
            data: None,
            path: Vec::new(),
        }
    }

    /// An error that halts the stack it is raised in.
    pub fn interrupting(message: impl Into<String>) -> Self {
        Self::new(message).interrupt(true)
    }

    /// Wrong-type error naming what was expected and what was found.
    pub fn wrong_type(expected: impl Into<String>, found: &Data) -> Self {
        let expected = expected.into();
        Self::new(format!("wrong data type, expected {expected}")).with_detail(
            ErrorDetail::WrongType {
                expected,
                found: found.kind(),
            },
        )
    }

    /// Wrap the failed stack of a nested context. An interruption inside
    /// the nested stack does not interrupt the enclosing one.
    pub fn nested(stack: ValidationErrorStack) -> Self {
        let message = match stack.len() {
            1 => format!("nested validation failed: {}", stack[0].message),
            n => format!("nested validation failed with {n} errors"),
        };
        Self::new(message).with_detail(ErrorDetail::Nested { stack })
    }

    pub fn interrupt(mut self, interrupt: bool) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Prefix the error path with the position it was raised under.
    pub fn at(mut self, position: Position) -> Self {
        self.path.insert(0, position);
        self
    }

    pub fn nested_stack(&self) -> Option<&ValidationErrorStack> {
        match &self.detail {
            Some(ErrorDetail::Nested { stack }) => Some(stack),
            _ => None,
        }
    }

    pub fn found_kind(&self) -> Option<DataKind> {
        match &self.detail {
            Some(ErrorDetail::WrongType { found, .. }) => Some(*found),
            _ => None,
        }
    }

    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }
}

/// Ordered collection of validation errors raised by one runner-stack run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrorStack {
    errors: Vec<ValidationError>,
    /// Data as it stood when the stack stopped.
    pub data: Option<Data>,
}

impl ValidationErrorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Move every error of `other` onto the end of this stack.
    pub fn append(&mut self, other: &mut ValidationErrorStack) {
        self.errors.append(&mut other.errors);
    }

    pub fn pop(&mut self) -> Option<ValidationError> {
        self.errors.pop()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ValidationError> {
        self.errors.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Leaf errors with nested stacks expanded and paths made absolute.
    pub fn flatten(&self) -> Vec<ValidationError> {
        let mut leaves = Vec::new();
        collect_leaves(&self.errors, &[], &mut leaves);
        leaves
    }
}

fn collect_leaves(errors: &[ValidationError], prefix: &[Position], out: &mut Vec<ValidationError>) {
    for error in errors {
        let mut path = prefix.to_vec();
        path.extend(error.path.iter().cloned());
        match error.nested_stack() {
            Some(stack) => collect_leaves(&stack.errors, &path, out),
            None => {
                let mut leaf = error.clone();
                leaf.path = path;
                out.push(leaf);
            }
        }
    }
}

impl Index<usize> for ValidationErrorStack {
    type Output = ValidationError;

    fn index(&self, index: usize) -> &Self::Output {
        &self.errors[index]
    }
}

impl<'a> IntoIterator for &'a ValidationErrorStack {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for ValidationErrorStack {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ValidationError> for ValidationErrorStack {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
            data: None,
        }
    }
}

impl fmt::Display for ValidationErrorStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leaves = self.flatten();
        write!(f, "{} validation error(s)", leaves.len())?;
        for leaf in &leaves {
            write!(f, "; {}: {}", leaf.path_string(), leaf.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrorStack {}

impl Semigroup for ValidationErrorStack {
    /// Errors of `other` follow those of `self`; the later snapshot wins.
    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        if other.data.is_some() {
            self.data = other.data;
        }
        self
    }
}
