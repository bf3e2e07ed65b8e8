//! Error types for snapshot management.

use thiserror::Error;

use hostgrid_curator::CuratorError;

use crate::state::{SnapshotId, SnapshotState};

/// Result type alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors from snapshot operations.
///
/// Transition, timestamp, and key-material problems are validation
/// errors; `Curator` wraps transient store failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("illegal snapshot state transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: SnapshotState,
        to: SnapshotState,
    },

    #[error("transition at {at} predates the latest history entry at {latest}")]
    NonMonotonic { at: u64, latest: u64 },

    #[error("snapshot {id} not found for host {hostname}")]
    NotFound { hostname: String, id: SnapshotId },

    #[error("no sealing key material recorded for version {0}")]
    MissingKeyMaterial(u32),

    #[error("seal operation failed: {0}")]
    Seal(String),

    #[error(transparent)]
    Curator(#[from] CuratorError),
}
