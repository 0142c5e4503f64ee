//! Error types for the Grove tree viewer.

use crate::types::{ObjectId, ObjectKind};
use thiserror::Error;

/// Object store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Invalid revision name: {0}")]
    InvalidRevision(String),

    #[error("Invalid commit reference: {0}")]
    InvalidCommit(String),

    #[error("Object {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("Corrupt object store: {0}")]
    Corrupt(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// External filter errors
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Failed to start filter '{filter}': {source}")]
    Spawn {
        filter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error talking to filter '{filter}': {source}")]
    Io {
        filter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Filter '{filter}' exited with status {status}")]
    Exit { filter: String, status: i32 },
}

/// Errors that abort one rendering pass
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error("Filter failed: {0}")]
    Filter(#[from] FilterError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl ViewError {
    /// HTTP-equivalent status code for the error page.
    pub fn status(&self) -> u16 {
        match self {
            ViewError::NotFound(_) => 404,
            ViewError::Internal(_)
            | ViewError::Filter(_)
            | ViewError::Store(_)
            | ViewError::Output(_) => 500,
        }
    }

    /// Reason phrase matching `status()`.
    pub fn reason(&self) -> &'static str {
        match self.status() {
            404 => "Not found",
            _ => "Internal server error",
        }
    }
}

/// Process-level errors (configuration, logging, CLI plumbing)
#[derive(Debug, Error)]
pub enum GroveError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error("{0}")]
    View(#[from] ViewError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for GroveError {
    fn from(err: config::ConfigError) -> Self {
        GroveError::ConfigError(err.to_string())
    }
}
