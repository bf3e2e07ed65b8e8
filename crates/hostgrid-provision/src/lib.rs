//! hostgrid-provision — maps capacity requests to concrete hosts.
//!
//! The hosted provisioner first satisfies a request from the static
//! pre-allocation (hosts already bound to the requested cluster by a
//! previous deployment) and only then consults the injected fallback
//! allocator, which does the actual resource matching against the live
//! inventory. Every returned host set is pre-flight verified against the
//! host registry before it reaches the caller.

pub mod error;
pub mod hosted;
pub mod provisioner;

pub use error::{ProvisionError, ProvisionResult};
pub use hosted::HostedProvisioner;
pub use provisioner::Provisioner;
