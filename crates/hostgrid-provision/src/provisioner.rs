//! The fallback capacity allocator contract.

use hostgrid_types::{ApplicationId, Capacity, ClusterSpec, HostSpec};

use crate::error::ProvisionResult;

/// Allocates concrete hosts for a capacity request.
///
/// Consumed by the hosted provisioner as its fallback: implementations
/// perform the actual resource matching and bin-packing against the live
/// node inventory.
pub trait Provisioner: Send + Sync {
    /// Hosts satisfying `capacity` for `cluster` of `application`.
    fn prepare(
        &self,
        application: &ApplicationId,
        cluster: &ClusterSpec,
        capacity: &Capacity,
    ) -> ProvisionResult<Vec<HostSpec>>;

    /// Allocate one host by alias. Only supported by non-hosted
    /// single-node implementations.
    fn allocate_host(&self, alias: &str) -> ProvisionResult<HostSpec>;
}
