//! hostgrid-archive — where a node's operational artifacts get archived.
//!
//! Operators set one object-storage destination per tenant, or per cloud
//! account for enclave accounts. The manager caches the stored mapping
//! with a bounded TTL and derives a deterministic per-node path under the
//! configured destination.
//!
//! Writes go through the coordination store's per-tenant lock and re-read
//! the backing record first, so concurrent operators on different
//! control-plane replicas cannot overwrite each other.

pub mod error;
pub mod manager;
pub mod uri;
pub mod uris;

pub use error::{ArchiveError, ArchiveResult};
pub use manager::{ArchiveTarget, ArchiveUriManager};
pub use uri::ArchiveUri;
pub use uris::ArchiveUris;
