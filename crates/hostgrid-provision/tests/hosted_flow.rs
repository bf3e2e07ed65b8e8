//! End-to-end hosted provisioning flow.
//!
//! Exercises the path a deploy takes through the control plane:
//!   - capacity request → static pre-allocation or fallback allocator
//!   - pre-flight host verification against the host registry
//!   - committing the allocation via `HostRegistry::update`
//!   - resolving the archive destination for an allocated node
//!
//! Test stack:
//! ```text
//! HostedProvisioner ── pre-allocation / StubAllocator
//!   ↓ HostValidator
//! HostRegistry (in-process ownership gatekeeper)
//!   ↓
//! ArchiveUriManager ── MemoryCurator (coordination namespace)
//! ```

use std::sync::Arc;

use hostgrid_archive::{ArchiveTarget, ArchiveUriManager};
use hostgrid_curator::MemoryCurator;
use hostgrid_provision::{HostedProvisioner, ProvisionError, ProvisionResult, Provisioner};
use hostgrid_registry::HostRegistry;
use hostgrid_types::{
    AccountClassifier, Allocation, ApplicationId, Capacity, CloudAccount, ClusterKind,
    ClusterMembership, ClusterSpec, HostSpec, Node, NodeState,
};

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct NoEnclaves;

impl AccountClassifier for NoEnclaves {
    fn is_enclave(&self, _account: &CloudAccount) -> bool {
        false
    }
}

/// Fallback allocator handing out a fixed inventory slice.
struct StubAllocator;

impl Provisioner for StubAllocator {
    fn prepare(
        &self,
        _application: &ApplicationId,
        cluster: &ClusterSpec,
        capacity: &Capacity,
    ) -> ProvisionResult<Vec<HostSpec>> {
        Ok((0..capacity.node_count)
            .map(|i| HostSpec {
                hostname: format!("pool{i}.zone1.example.com"),
                flavor: capacity.flavor.clone().unwrap_or_else(|| "default".to_string()),
                membership: Some(ClusterMembership {
                    cluster: cluster.clone(),
                    index: i,
                }),
            })
            .collect())
    }

    fn allocate_host(&self, alias: &str) -> ProvisionResult<HostSpec> {
        Err(ProvisionError::AliasNotSupported(alias.to_string()))
    }
}

fn preallocated(cluster_id: &str, group: u32, count: u32) -> Vec<HostSpec> {
    (0..count)
        .map(|i| HostSpec {
            hostname: format!("static{i}.zone1.example.com"),
            flavor: "d-8-16-100".to_string(),
            membership: Some(ClusterMembership {
                cluster: ClusterSpec::new(ClusterKind::Content, cluster_id).with_group(group),
                index: i,
            }),
        })
        .collect()
}

#[test]
fn preallocation_then_fallback_then_commit() {
    init_logs();
    let registry = Arc::new(HostRegistry::new());
    let provisioner = HostedProvisioner::new(
        preallocated("c1", 0, 3),
        StubAllocator,
        Arc::clone(&registry) as Arc<dyn hostgrid_registry::HostValidator>,
    );
    let owner = ApplicationId::new("acme", "shop", "default");

    // No group requested: the three group-0 hosts satisfy the request
    // without touching the fallback.
    let no_group = ClusterSpec::new(ClusterKind::Content, "c1");
    let hosts = provisioner.prepare(&owner, &no_group, &Capacity::of(3)).unwrap();
    assert_eq!(hosts.len(), 3);
    assert!(hosts.iter().all(|h| h.hostname.starts_with("static")));

    // Commit the allocation; a second identical deploy is a no-op.
    let hostnames: Vec<String> = hosts.iter().map(|h| h.hostname.clone()).collect();
    assert!(!registry.update(&owner, &hostnames).unwrap().is_noop());
    assert!(registry.update(&owner, &hostnames).unwrap().is_noop());

    // Group 1 is not pre-allocated, so the fallback provides it.
    let group_one = ClusterSpec::new(ClusterKind::Content, "c1").with_group(1);
    let extra = provisioner.prepare(&owner, &group_one, &Capacity::of(2)).unwrap();
    assert!(extra.iter().all(|h| h.hostname.starts_with("pool")));

    // Another tenant cannot deploy onto the committed hosts.
    let rival = ApplicationId::new("umbrella", "labs", "default");
    let rival_provisioner = HostedProvisioner::new(
        preallocated("c1", 0, 3),
        StubAllocator,
        Arc::clone(&registry) as Arc<dyn hostgrid_registry::HostValidator>,
    );
    let err = rival_provisioner
        .prepare(&rival, &no_group, &Capacity::of(3))
        .unwrap_err();
    assert!(matches!(err, ProvisionError::Conflict(_)));

    // Tenant deletion releases everything it held.
    registry.remove_tenant("acme");
    rival_provisioner
        .prepare(&rival, &no_group, &Capacity::of(3))
        .unwrap();
}

#[test]
fn allocated_node_resolves_its_archive_destination() {
    init_logs();
    let curator = Arc::new(MemoryCurator::new());
    let archive = ArchiveUriManager::new(
        Arc::clone(&curator) as Arc<dyn hostgrid_curator::Curator>,
        Arc::new(NoEnclaves),
    );
    archive
        .set_archive_uri(
            &ArchiveTarget::Tenant("acme".to_string()),
            Some("s3://archive/zone1"),
        )
        .unwrap();

    let registry = Arc::new(HostRegistry::new());
    let provisioner = HostedProvisioner::new(
        preallocated("c1", 0, 1),
        StubAllocator,
        Arc::clone(&registry) as Arc<dyn hostgrid_registry::HostValidator>,
    );
    let owner = ApplicationId::new("acme", "shop", "default");
    let cluster = ClusterSpec::new(ClusterKind::Content, "c1");
    let host = provisioner
        .prepare(&owner, &cluster, &Capacity::of(1))
        .unwrap()
        .remove(0);

    // Register the host and drive the node into service.
    registry.update(&owner, &[host.hostname.clone()]).unwrap();
    let node = Node::new(&host.hostname, &host.flavor)
        .with_state(NodeState::Ready)
        .unwrap()
        .allocate(Allocation {
            owner: owner.clone(),
            membership: host.membership.clone().unwrap(),
            account: CloudAccount::unspecified(),
        })
        .unwrap()
        .with_state(NodeState::Active)
        .unwrap();

    let destination = archive.archive_uri_for(&node).unwrap().unwrap();
    assert_eq!(
        destination.as_str(),
        "s3://archive/zone1/acme/shop/default/c1/static0/"
    );
}
