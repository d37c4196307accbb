//! Driver error types.
//!
//! Every lookup failure is one of two kinds: the identifier has no record,
//! or the backend could not produce an answer. Callers branch on
//! [`DriverError::kind`], never on message text.

use std::time::Duration;
use thiserror::Error;

/// Boxed error carried as the cause of a resolution failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The abstract failure kind callers make decisions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No record matches the identifier.
    NotFound,

    /// The backend failed to produce an answer.
    Resolution,
}

/// Errors returned by [`Driver::resolve`](super::Driver::resolve).
#[derive(Debug, Error)]
pub enum DriverError {
    /// No record matches the identifier.
    #[error("resource not found: {identifier}")]
    NotFound { identifier: String },

    /// The backend, template, or decoder failed.
    #[error("could not resolve {identifier}: {source}")]
    Resolution {
        identifier: String,
        #[source]
        source: BoxError,
    },
}

impl DriverError {
    /// Create a "not found" error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a resolution error wrapping the underlying cause.
    pub fn resolution(identifier: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Resolution {
            identifier: identifier.into(),
            source: source.into(),
        }
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Resolution { .. } => ErrorKind::Resolution,
        }
    }

    /// Whether this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The identifier the failed lookup was for.
    pub fn identifier(&self) -> &str {
        match self {
            Self::NotFound { identifier } | Self::Resolution { identifier, .. } => identifier,
        }
    }
}

/// Failures reported by directory and SQL backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// More than one record matched a lookup that must be unique.
    #[error("expected exactly one matching record, found {found}")]
    Ambiguous { found: usize },

    /// The backend did not answer in time.
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    /// The directory service reported an error.
    #[error("directory error: {0}")]
    Directory(String),

    /// The relational store reported an error.
    #[error("store error: {0}")]
    Store(#[source] BoxError),
}

impl BackendError {
    /// Create a directory error.
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Create a store error.
    pub fn store(source: impl Into<BoxError>) -> Self {
        Self::Store(source.into())
    }
}
