//! Error types for decoding, editing, and writing records.

use rcforge_core::ParseError;
use rcforge_registry::ValidationError;
use thiserror::Error;

use crate::path::AttrPath;

/// Errors raised by [`Record`](crate::Record) operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The text is not a well-formed unit
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The unit has no main structure
    #[error("no top-level container element found")]
    NoBody,

    /// An attribute path string could not be parsed
    #[error("invalid attribute path '{text}': {reason}")]
    BadPath {
        /// The path as given.
        text: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// No attribute exists at the path
    #[error("no attribute at {path}")]
    NotFound {
        /// The requested path.
        path: AttrPath,
    },

    /// The attribute has no schema and cannot be edited
    #[error("{path} is not described by the schema and cannot be edited")]
    Unmapped {
        /// The attribute path.
        path: AttrPath,
    },

    /// The value was refused
    #[error("cannot set {path}: {source}")]
    Invalid {
        /// The attribute path.
        path: AttrPath,
        /// The violated constraint.
        #[source]
        source: ValidationError,
    },

    /// Two records do not have the same structure
    #[error("records differ in structure: {detail}")]
    Incompatible {
        /// Where they differ.
        detail: String,
    },
}

impl ModelError {
    /// Create a validation error for `path`.
    pub fn invalid(path: &AttrPath, source: ValidationError) -> Self {
        ModelError::Invalid {
            path: path.clone(),
            source,
        }
    }

    /// The violated constraint, when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ModelError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while producing output text.
#[derive(Debug, Error)]
pub enum WriteError {
    /// An unmodified record did not reproduce its source text
    #[error(
        "unmodified record does not reproduce its source (first difference at byte {offset})"
    )]
    FidelityViolation {
        /// Byte offset of the first differing byte.
        offset: usize,
    },

    /// The unit has no trailing save counter
    #[error("no save counter found after the main structure")]
    NoCounter,

    /// The save counter is not a decimal number
    #[error("save counter {text:?} is not a decimal number")]
    BadCounter {
        /// The counter text as read.
        text: String,
    },

    /// A field could not be written back to its node
    #[error("cannot write {path}: its node is not a scalar")]
    NotScalar {
        /// The attribute path.
        path: AttrPath,
    },
}
