//! Error types for StrataMap
//!
//! This module defines every error the mapper, the path codec and the store
//! contract can surface. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.
//!
//! None of these errors is retried internally: each public operation returns
//! either success or exactly one of the variants below.

use crate::shape::ScalarKind;
use thiserror::Error;

/// Result type alias for StrataMap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for StrataMap
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty path, or an encoded path that cannot be decoded
    #[error("Path error: {0}")]
    Path(String),

    /// A path is used both as a directory and as a leaf, or a node has the
    /// wrong kind for the value being decoded
    #[error("Conflict at '{path}': {reason}")]
    Conflict {
        /// Logical path of the conflicting node
        path: String,
        /// What collided
        reason: String,
    },

    /// Insert collided with an existing row at the same path
    #[error("Duplicate path: {0}")]
    DuplicatePath(String),

    /// An update-by-path matched more than one row
    #[error("Update of '{path}' matched {count} rows")]
    MultiMatch {
        /// Path that was updated
        path: String,
        /// Number of rows the update matched
        count: usize,
    },

    /// Partial save/load on a field that was never bound
    #[error("Field not mapped: {0}")]
    UnmappedField(String),

    /// A required node is absent from the loaded snapshot
    #[error("Expected path '{0}' not found")]
    MissingField(String),

    /// The record contains a shape the walker cannot (de)serialize
    #[error("Unsupported shape at '{path}': {reason}")]
    UnsupportedShape {
        /// Path of the offending field
        path: String,
        /// Description of the shape
        reason: String,
    },

    /// A stored token does not parse as the target scalar kind
    #[error("Invalid {kind} value '{raw}' at '{path}'")]
    InvalidScalar {
        /// Path of the field being decoded
        path: String,
        /// Target scalar kind
        kind: ScalarKind,
        /// Raw stored token
        raw: String,
    },

    /// Unknown condition operator
    #[error("Invalid condition operator: {0}")]
    InvalidCondition(String),

    /// Opaque failure surfaced from the store collaborator
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Configuration file unreadable or invalid
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `Path` error
    pub fn path(msg: impl Into<String>) -> Self {
        Error::Path(msg.into())
    }

    /// Build a `Conflict` error
    pub fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Conflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build an `UnsupportedShape` error
    pub fn unsupported(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Transaction` error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Error::Transaction(msg.into())
    }

    /// True when the error means the store and the record shape have diverged.
    ///
    /// Callers must not continue with a partially filled record after a fatal
    /// error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_) | Error::Conflict { .. } | Error::MultiMatch { .. }
        )
    }
}
