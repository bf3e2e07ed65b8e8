//! Node inventory record and its lifecycle state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ApplicationId;
use crate::cloud::CloudAccount;
use crate::cluster::ClusterMembership;

/// Host-level lifecycle state of a node in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Registered and being readied by the platform.
    Provisioned,
    /// Clean and available for allocation.
    Ready,
    /// Allocated to an application, not yet serving.
    Reserved,
    /// Allocated and serving.
    Active,
    /// Allocated but taken out of service (retired or suspended).
    Inactive,
    /// Deallocated, awaiting cleanup before it can be ready again.
    Dirty,
    /// Suspected or confirmed broken.
    Failed,
    /// Withheld from allocation by an operator.
    Parked,
}

impl NodeState {
    /// States this state may legally transition to.
    ///
    /// Allocation moves ready→reserved→active; retirement moves
    /// active↔inactive; deallocation lands in dirty, which recycles to
    /// ready. Failed and parked are operator/ops escape hatches.
    pub fn allowed_transitions(self) -> &'static [NodeState] {
        use NodeState::*;
        match self {
            Provisioned => &[Ready, Failed, Parked],
            Ready => &[Reserved, Failed, Parked],
            Reserved => &[Active, Dirty],
            Active => &[Inactive, Failed],
            Inactive => &[Active, Dirty, Failed],
            Dirty => &[Ready, Failed],
            Failed => &[Dirty, Parked],
            Parked => &[Dirty, Ready],
        }
    }

    /// Whether moving to `to` is legal. Re-applying the current state is
    /// always allowed (idempotent writes).
    pub fn allows(self, to: NodeState) -> bool {
        self == to || self.allowed_transitions().contains(&to)
    }
}

/// A rejected node state transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal node state transition {from:?} -> {to:?}")]
pub struct IllegalNodeTransition {
    pub from: NodeState,
    pub to: NodeState,
}

/// Ownership of a node by a tenant application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub owner: ApplicationId,
    pub membership: ClusterMembership,
    pub account: CloudAccount,
}

/// A physical or virtual host in the inventory.
///
/// Nodes are created when a host is registered, mutated only through the
/// provisioner and host registry, and removed on decommission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub hostname: String,
    pub flavor: String,
    pub state: NodeState,
    pub allocation: Option<Allocation>,
}

impl Node {
    pub fn new(hostname: &str, flavor: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            flavor: flavor.to_string(),
            state: NodeState::Provisioned,
            allocation: None,
        }
    }

    /// Pure transition: returns a copy in the new state, or rejects the
    /// move if the lifecycle graph does not allow it.
    pub fn with_state(&self, to: NodeState) -> Result<Node, IllegalNodeTransition> {
        if !self.state.allows(to) {
            return Err(IllegalNodeTransition {
                from: self.state,
                to,
            });
        }
        let mut node = self.clone();
        node.state = to;
        Ok(node)
    }

    /// Copy with an allocation attached (reserved for an application).
    pub fn allocate(&self, allocation: Allocation) -> Result<Node, IllegalNodeTransition> {
        let mut node = self.with_state(NodeState::Reserved)?;
        node.allocation = Some(allocation);
        Ok(node)
    }

    /// The hostname up to the first dot.
    pub fn short_hostname(&self) -> &str {
        self.hostname.split('.').next().unwrap_or(&self.hostname)
    }
}
