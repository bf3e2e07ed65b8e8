//! The immutable archive destination mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hostgrid_types::{AccountClassifier, CloudAccount, Node};

use crate::uri::ArchiveUri;

/// Snapshot of every configured archive destination.
///
/// Two maps: tenant name → URI for tenants on shared infrastructure,
/// cloud account → URI for enclave accounts. Instances are immutable;
/// the manager swaps in whole new snapshots on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveUris {
    tenant_uris: BTreeMap<String, ArchiveUri>,
    account_uris: BTreeMap<CloudAccount, ArchiveUri>,
}

impl ArchiveUris {
    pub fn new(
        tenant_uris: BTreeMap<String, ArchiveUri>,
        account_uris: BTreeMap<CloudAccount, ArchiveUri>,
    ) -> Self {
        Self {
            tenant_uris,
            account_uris,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tenant_count(&self) -> usize {
        self.tenant_uris.len()
    }

    pub fn account_count(&self) -> usize {
        self.account_uris.len()
    }

    pub fn tenant_uri(&self, tenant: &str) -> Option<&ArchiveUri> {
        self.tenant_uris.get(tenant)
    }

    pub fn account_uri(&self, account: &CloudAccount) -> Option<&ArchiveUri> {
        self.account_uris.get(account)
    }

    /// The archive destination for one node's artifacts.
    ///
    /// `None` for unallocated nodes and for tenants/accounts with no
    /// destination configured. Enclave accounts use the account URI, all
    /// other allocations the owning tenant's URI. Pure function of this
    /// snapshot plus node identity — no I/O.
    pub fn archive_uri_for(
        &self,
        node: &Node,
        classifier: &dyn AccountClassifier,
    ) -> Option<ArchiveUri> {
        let allocation = node.allocation.as_ref()?;
        let owner = &allocation.owner;
        let base = if classifier.is_enclave(&allocation.account) {
            self.account_uri(&allocation.account)?
        } else {
            self.tenant_uri(owner.tenant())?
        };

        // Older stored URIs already end in the tenant name as their final
        // path segment; strip it so the tenant segment appears exactly
        // once. The match must sit on a segment boundary: `zacme/` is not
        // the tenant `acme`, and in `scheme://acme/` the matched slash
        // belongs to the authority, not the path.
        let mut destination = base.as_str().to_string();
        let legacy_suffix = format!("/{}/", owner.tenant());
        if destination.ends_with(&legacy_suffix) {
            let cut = destination.len() + 1 - legacy_suffix.len();
            if !destination[..cut - 1].ends_with('/') {
                destination.truncate(cut);
            }
        }

        destination.push_str(&format!(
            "{}/{}/{}/",
            owner.path(),
            allocation.membership.cluster.id,
            node.short_hostname(),
        ));
        Some(ArchiveUri::already_normalized(destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostgrid_types::{Allocation, ApplicationId, ClusterKind, ClusterMembership, ClusterSpec};

    struct Enclaves(Vec<CloudAccount>);

    impl AccountClassifier for Enclaves {
        fn is_enclave(&self, account: &CloudAccount) -> bool {
            self.0.contains(account)
        }
    }

    fn allocated_node(tenant: &str, account: CloudAccount) -> Node {
        let mut node = Node::new("host1.prod.example.com", "d-8-16-100");
        node.allocation = Some(Allocation {
            owner: ApplicationId::new(tenant, "shop", "default"),
            membership: ClusterMembership {
                cluster: ClusterSpec::new(ClusterKind::Content, "c1").with_group(0),
                index: 2,
            },
            account,
        });
        node
    }

    fn uris_with(tenant: &str, uri: &str) -> ArchiveUris {
        let mut tenants = BTreeMap::new();
        tenants.insert(tenant.to_string(), ArchiveUri::parse(uri).unwrap());
        ArchiveUris::new(tenants, BTreeMap::new())
    }

    #[test]
    fn unallocated_node_has_no_destination() {
        let uris = uris_with("acme", "s3://archive");
        let node = Node::new("host1.example.com", "d-8-16-100");
        let none = uris.archive_uri_for(&node, &Enclaves(vec![]));
        assert!(none.is_none());
    }

    #[test]
    fn tenant_uri_with_per_node_path() {
        let uris = uris_with("acme", "s3://archive/zone1");
        let node = allocated_node("acme", CloudAccount::unspecified());

        let destination = uris.archive_uri_for(&node, &Enclaves(vec![])).unwrap();
        assert_eq!(
            destination.as_str(),
            "s3://archive/zone1/acme/shop/default/c1/host1/"
        );
    }

    #[test]
    fn legacy_tenant_suffix_is_stripped() {
        let uris = uris_with("acme", "s3://archive/zone1/acme");
        let node = allocated_node("acme", CloudAccount::unspecified());

        let destination = uris.archive_uri_for(&node, &Enclaves(vec![])).unwrap();
        assert_eq!(
            destination.as_str(),
            "s3://archive/zone1/acme/shop/default/c1/host1/"
        );
    }

    #[test]
    fn tenant_suffix_only_matches_a_whole_segment() {
        // `zacme` merely ends in the tenant name; nothing is stripped.
        let uris = uris_with("acme", "s3://bucket/zacme");
        let node = allocated_node("acme", CloudAccount::unspecified());

        let destination = uris.archive_uri_for(&node, &Enclaves(vec![])).unwrap();
        assert_eq!(
            destination.as_str(),
            "s3://bucket/zacme/acme/shop/default/c1/host1/"
        );
    }

    #[test]
    fn bucket_named_after_the_tenant_is_kept() {
        // The first segment is the bucket, not a legacy tenant suffix.
        let uris = uris_with("acme", "s3://acme");
        let node = allocated_node("acme", CloudAccount::unspecified());

        let destination = uris.archive_uri_for(&node, &Enclaves(vec![])).unwrap();
        assert_eq!(
            destination.as_str(),
            "s3://acme/acme/shop/default/c1/host1/"
        );
    }

    #[test]
    fn enclave_account_uses_account_uri() {
        let account = CloudAccount::from_id("123456789012");
        let mut accounts = BTreeMap::new();
        accounts.insert(account.clone(), ArchiveUri::parse("s3://enclave-archive").unwrap());
        let uris = ArchiveUris::new(BTreeMap::new(), accounts);

        let node = allocated_node("acme", account.clone());
        let destination = uris
            .archive_uri_for(&node, &Enclaves(vec![account]))
            .unwrap();
        assert_eq!(
            destination.as_str(),
            "s3://enclave-archive/acme/shop/default/c1/host1/"
        );
    }

    #[test]
    fn enclave_account_without_uri_is_none() {
        // Tenant URI configured, but the enclave account has none: the
        // tenant URI must not be used as a fallback.
        let uris = uris_with("acme", "s3://archive");
        let account = CloudAccount::from_id("123456789012");
        let node = allocated_node("acme", account.clone());

        assert!(uris.archive_uri_for(&node, &Enclaves(vec![account])).is_none());
    }
}
