//! Error types for provisioning.

use hostgrid_registry::RegistryError;
use thiserror::Error;

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors from capacity provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Single-host allocation by alias only makes sense in non-hosted
    /// single-node setups; hosted mode fails fast instead of attempting
    /// a partial allocation.
    #[error("allocating a single host by alias '{0}' is not supported in hosted mode")]
    AliasNotSupported(String),

    /// A returned host is already owned by a different application.
    #[error(transparent)]
    Conflict(#[from] RegistryError),

    /// The fallback allocator could not satisfy the capacity request.
    #[error("out of capacity: {0}")]
    OutOfCapacity(String),
}
