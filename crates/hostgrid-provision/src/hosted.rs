//! The hosted-mode provisioner.

use std::sync::Arc;

use tracing::{debug, info};

use hostgrid_registry::HostValidator;
use hostgrid_types::{ApplicationId, Capacity, ClusterSpec, HostSpec};

use crate::error::{ProvisionError, ProvisionResult};
use crate::provisioner::Provisioner;

/// Provisioner for hosted multi-tenant zones.
///
/// Composes a static pre-allocation (host-to-cluster bindings persisted
/// by a previous deployment) with a fallback allocator. Matching against
/// the pre-allocation distinguishes "a specific group of a cluster"
/// (exact group equality) from "all groups" (the satisfies relation);
/// see [`ClusterSpec::satisfies`].
pub struct HostedProvisioner<P> {
    preallocation: Vec<HostSpec>,
    fallback: P,
    validator: Arc<dyn HostValidator>,
}

impl<P: Provisioner> HostedProvisioner<P> {
    pub fn new(preallocation: Vec<HostSpec>, fallback: P, validator: Arc<dyn HostValidator>) -> Self {
        Self {
            preallocation,
            fallback,
            validator,
        }
    }

    fn preallocated(&self, cluster: &ClusterSpec) -> Vec<HostSpec> {
        let mut matched: Vec<HostSpec> = self
            .preallocation
            .iter()
            .filter(|host| {
                host.membership
                    .as_ref()
                    .is_some_and(|membership| membership.cluster.satisfies(cluster))
            })
            .cloned()
            .collect();
        matched.sort_by_key(|host| host.membership.as_ref().map(|membership| membership.index));
        matched
    }

    fn verified(
        &self,
        application: &ApplicationId,
        hosts: Vec<HostSpec>,
    ) -> ProvisionResult<Vec<HostSpec>> {
        let hostnames: Vec<String> = hosts.iter().map(|host| host.hostname.clone()).collect();
        self.validator.verify_hosts(application, &hostnames)?;
        Ok(hosts)
    }
}

impl<P: Provisioner> Provisioner for HostedProvisioner<P> {
    fn prepare(
        &self,
        application: &ApplicationId,
        cluster: &ClusterSpec,
        capacity: &Capacity,
    ) -> ProvisionResult<Vec<HostSpec>> {
        let preallocated = self.preallocated(cluster);
        if !preallocated.is_empty() {
            info!(
                %application,
                cluster = %cluster.id,
                hosts = preallocated.len(),
                "request satisfied from static pre-allocation"
            );
            return self.verified(application, preallocated);
        }

        debug!(
            %application,
            cluster = %cluster.id,
            nodes = capacity.node_count,
            "no pre-allocation match, delegating to fallback allocator"
        );
        let hosts = self.fallback.prepare(application, cluster, capacity)?;
        self.verified(application, hosts)
    }

    fn allocate_host(&self, alias: &str) -> ProvisionResult<HostSpec> {
        Err(ProvisionError::AliasNotSupported(alias.to_string()))
    }
}
