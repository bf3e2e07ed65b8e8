//! Error types for archive URI management.

use hostgrid_types::CloudAccount;
use thiserror::Error;

use hostgrid_curator::CuratorError;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors from archive URI operations.
///
/// `InvalidUri`, `InvalidTenant`, and `InvalidAccount` are validation
/// errors carrying the offending value; `Curator` wraps transient store
/// failures so callers can tell the two classes apart.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid archive URI '{0}', expected scheme://segment(/segment)*/")]
    InvalidUri(String),

    #[error("invalid tenant name '{0}'")]
    InvalidTenant(String),

    #[error("cloud account '{0}' is not an enclave account with its own archive destination")]
    InvalidAccount(CloudAccount),

    #[error(transparent)]
    Curator(#[from] CuratorError),
}
