//! Error types for the host registry.

use hostgrid_types::ApplicationId;
use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from host registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The only domain error: the host belongs to someone else. Always
    /// recoverable — pick different hosts or wait for the holder to
    /// release them.
    #[error("host {hostname} is owned by {held_by}, cannot claim for {requested_by}")]
    HostConflict {
        hostname: String,
        held_by: ApplicationId,
        requested_by: ApplicationId,
    },
}
