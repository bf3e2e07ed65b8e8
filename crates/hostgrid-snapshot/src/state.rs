//! Snapshot records and their state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostgrid_types::CloudAccount;

use crate::error::{SnapshotError, SnapshotResult};
use crate::sealing::SealedSnapshotKey;

/// Unique snapshot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    Creating,
    Created,
    Restoring,
    Restored,
}

impl SnapshotState {
    /// Strict allow-list: no skipped steps, no backward moves except the
    /// explicit restored → restoring re-restore.
    pub fn allows(self, to: SnapshotState) -> bool {
        use SnapshotState::*;
        matches!(
            (self, to),
            (Creating, Created) | (Created, Restoring) | (Restoring, Restored) | (Restored, Restoring)
        )
    }
}

/// One history entry: the state entered and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHistoryRecord {
    pub state: SnapshotState,
    pub at: u64,
}

/// A per-node encrypted backup.
///
/// The history is prepend-only and authoritative: the current state is
/// its head, never stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    id: SnapshotId,
    hostname: String,
    /// Most recent first; never empty.
    history: Vec<SnapshotHistoryRecord>,
    cluster: String,
    node_index: u32,
    account: CloudAccount,
    key: SealedSnapshotKey,
}

impl Snapshot {
    /// A new snapshot in state `Creating`.
    pub fn create(
        id: SnapshotId,
        hostname: &str,
        cluster: &str,
        node_index: u32,
        account: CloudAccount,
        key: SealedSnapshotKey,
        now: u64,
    ) -> Self {
        Self {
            id,
            hostname: hostname.to_string(),
            history: vec![SnapshotHistoryRecord {
                state: SnapshotState::Creating,
                at: now,
            }],
            cluster: cluster.to_string(),
            node_index,
            account,
            key,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn node_index(&self) -> u32 {
        self.node_index
    }

    pub fn account(&self) -> &CloudAccount {
        &self.account
    }

    pub fn key(&self) -> &SealedSnapshotKey {
        &self.key
    }

    pub fn history(&self) -> &[SnapshotHistoryRecord] {
        &self.history
    }

    /// Current state: the head of the history.
    pub fn state(&self) -> SnapshotState {
        self.history
            .first()
            .map(|record| record.state)
            .unwrap_or(SnapshotState::Creating)
    }

    /// Pure transition: a copy with `to` prepended to the history, or an
    /// error if the allow-list rejects the move or `now` runs backward.
    /// The caller persists the result.
    pub fn with(&self, to: SnapshotState, now: u64) -> SnapshotResult<Snapshot> {
        let from = self.state();
        if !from.allows(to) {
            return Err(SnapshotError::IllegalTransition { from, to });
        }
        if let Some(latest) = self.history.first() {
            if now < latest.at {
                return Err(SnapshotError::NonMonotonic {
                    at: now,
                    latest: latest.at,
                });
            }
        }
        let mut snapshot = self.clone();
        snapshot
            .history
            .insert(0, SnapshotHistoryRecord { state: to, at: now });
        Ok(snapshot)
    }
}
