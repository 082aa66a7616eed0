//! Error types for Tessera operations.
//!
//! Errors are categorized into two main types:
//!
//! - **`Error`**: Unit-level errors that halt extraction of a compilation unit
//! - **`ExtractionError`**: Entity-level errors that are collected but don't halt the unit
//!
//! ## Error Philosophy
//!
//! Tessera follows a "best effort" approach per compilation unit:
//! - A single malformed declaration shouldn't prevent records for its siblings
//! - Entity errors are collected and reported alongside the records, not thrown
//! - Only a missing unit (or unreadable hand-off input) terminates early
//!
//! Unresolved bindings are not errors at all: they degrade to placeholder
//! qualified names (see `builder`).

use std::path::PathBuf;
use thiserror::Error;

use crate::unit::NodeId;

/// Result type for Tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Tessera operations.
///
/// These errors represent failures that prevent a whole compilation unit
/// from being processed.
#[derive(Debug, Error)]
pub enum Error {
    /// The front-end produced no compilation unit
    #[error("no compilation unit to extract from")]
    NoCompilationUnit,

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Front-end hand-off could not be decoded
    #[error("malformed compilation unit {}: {source}", path.display())]
    Json {
        /// File the unit was read from
        path: PathBuf,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// Record serialization failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Identity key inputs that cannot form a canonical string
    #[error("invalid identity input: {0}")]
    Identity(#[from] crate::identity::IdentityError),
}

/// Error encountered while extracting a single entity.
///
/// These errors are collected during extraction but don't halt the unit.
/// The builder continues with sibling declarations and reports all errors
/// in the `UnitExtraction`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtractionError {
    /// What could not be turned into a record
    pub subject: Subject,
    /// Category of the error
    pub kind: ExtractionErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.subject, self.message, self.kind)
    }
}

/// The input item an `ExtractionError` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// A syntax node
    Node(NodeId),
    /// A reported problem, by index in `CompilationUnit::problems`
    Problem(usize),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node {id}"),
            Self::Problem(index) => write!(f, "problem {index}"),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Categorization of entity-level extraction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    /// An offset used for position mapping lies outside the unit's text
    OutOfRangePosition,

    /// Empty or malformed component passed into canonical-string construction
    InvalidIdentityInput,
}

impl std::fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRangePosition => write!(f, "out of range position"),
            Self::InvalidIdentityInput => write!(f, "invalid identity input"),
        }
    }
}

impl ExtractionError {
    /// Create a new extraction error.
    #[must_use]
    pub fn new(subject: Subject, kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            subject,
            kind,
            message: message.into(),
        }
    }

    /// Wrap a position mapping failure.
    #[must_use]
    pub fn position(subject: Subject, error: &crate::position::PositionError) -> Self {
        Self::new(
            subject,
            ExtractionErrorKind::OutOfRangePosition,
            error.to_string(),
        )
    }

    /// Wrap an identity construction failure for a node.
    #[must_use]
    pub fn identity(node: NodeId, error: &crate::identity::IdentityError) -> Self {
        Self::new(
            Subject::Node(node),
            ExtractionErrorKind::InvalidIdentityInput,
            error.to_string(),
        )
    }
}
