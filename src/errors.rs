//! Error types for html-patch

use thiserror::Error;

/// A fault that stops a whole `apply` call before any mutation happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The instruction list is structurally malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("operations must be an array, got {0}")]
    NotASequence(&'static str),

    /// `index` is 1-based.
    #[error("operation {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

impl ValidationError {
    pub(crate) fn at(index: usize, reason: impl Into<String>) -> Self {
        Self::Invalid {
            index,
            reason: reason.into(),
        }
    }

    /// 1-based position of the offending operation, if the fault belongs to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NotASequence(_) => None,
            Self::Invalid { index, .. } => Some(*index),
        }
    }
}

/// The document text could not be turned into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("document contains no markup")]
    NoMarkup,

    #[error("document is malformed: {}", .0.join("; "))]
    Malformed(Vec<String>),
}

/// A selector string that cannot be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector `{selector}`: {message}")]
pub struct SelectorError {
    pub selector: String,
    /// Column offset (0-based) where parsing stopped.
    pub position: usize,
    pub message: String,
}

/// A handler met existing node state it cannot interpret.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("malformed inline style declaration `{declaration}` on <{tag}>")]
    MalformedStyle { tag: String, declaration: String },

    #[error("unterminated {what} in inline style on <{tag}>")]
    UnterminatedStyle { tag: String, what: &'static str },
}

/// The planner reply could not be turned into an operation list.
#[derive(Error, Debug)]
pub enum PlannerResponseError {
    #[error("planner reply is empty")]
    Empty,

    #[error("planner reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("planner reply must be a JSON array of operations")]
    NotAnArray,

    #[error("planner returned no operations; the instruction needs full regeneration")]
    FallbackNeeded,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
