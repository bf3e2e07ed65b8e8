//! Cluster identity, capacity requests, and host specs.

use serde::{Deserialize, Serialize};

/// The role a cluster plays within an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    Container,
    Content,
    Combined,
}

/// Identifies a logical cluster of an application, optionally narrowed to
/// a single group within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub kind: ClusterKind,
    pub id: String,
    /// A specific group of the cluster. `None` means "all groups".
    pub group: Option<u32>,
}

impl ClusterSpec {
    pub fn new(kind: ClusterKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    /// Whether a host carrying `self` as its membership satisfies a
    /// `requested` cluster spec.
    ///
    /// When the request names a specific group the groups must be exactly
    /// equal; a request without a group accepts any group of the same
    /// cluster. Conflating the two would hand out nodes from the wrong
    /// group.
    pub fn satisfies(&self, requested: &ClusterSpec) -> bool {
        if self.kind != requested.kind || self.id != requested.id {
            return false;
        }
        match requested.group {
            Some(group) => self.group == Some(group),
            None => true,
        }
    }
}

/// Where a host sits inside a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMembership {
    pub cluster: ClusterSpec,
    /// Index of the node within its cluster (stable across redeploys).
    pub index: u32,
}

/// A capacity request: how many nodes of which shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub node_count: u32,
    /// Resource flavor, `None` for the zone default.
    pub flavor: Option<String>,
    /// Number of groups to spread the nodes over, if grouped.
    pub groups: Option<u32>,
}

impl Capacity {
    pub fn of(node_count: u32) -> Self {
        Self {
            node_count,
            flavor: None,
            groups: None,
        }
    }

    pub fn with_flavor(mut self, flavor: &str) -> Self {
        self.flavor = Some(flavor.to_string());
        self
    }
}

/// A concrete host allocation returned by provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    pub hostname: String,
    pub flavor: String,
    /// Cluster membership, absent for hosts not yet assigned to a cluster.
    pub membership: Option<ClusterMembership>,
}
