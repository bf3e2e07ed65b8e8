//! hostgrid-types — shared domain model for the HostGrid control plane.
//!
//! These types are the vocabulary of every other crate: tenant application
//! identities, node lifecycle state, cluster/capacity shapes, and cloud
//! account classification. They are plain values — all I/O and locking
//! lives in the component crates that use them.

pub mod application;
pub mod cloud;
pub mod cluster;
pub mod history;
pub mod node;

pub use application::ApplicationId;
pub use cloud::{AccountClassifier, CloudAccount};
pub use cluster::{Capacity, ClusterKind, ClusterMembership, ClusterSpec, HostSpec};
pub use history::{HistoryError, SupportAccess, SupportAccessChange, SupportAccessStatus};
pub use node::{Allocation, IllegalNodeTransition, Node, NodeState};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
