//! Error types for coordination-store access.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for curator operations.
pub type CuratorResult<T> = Result<T, CuratorError>;

/// Errors surfaced by the coordination store.
///
/// All of these are infrastructure failures, not validation errors: the
/// caller may safely re-invoke the whole operation, but this layer never
/// retries on its own.
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("timed out after {waited:?} waiting for lock {path}")]
    LockTimeout { path: String, waited: Duration },

    #[error("failed to serialize record at {path}: {reason}")]
    Serialize { path: String, reason: String },

    #[error("failed to deserialize record at {path}: {reason}")]
    Deserialize { path: String, reason: String },

    #[error("coordination store failure: {0}")]
    Backend(#[source] anyhow::Error),
}
