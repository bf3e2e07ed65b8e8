//! The snapshot manager — persistence and key operations per node.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand_core::{OsRng, RngCore};
use tracing::{debug, info};
use x25519_dalek::PublicKey;

use hostgrid_curator::{Curator, paths, read_json, write_json};
use hostgrid_types::CloudAccount;

use crate::error::{SnapshotError, SnapshotResult};
use crate::sealing::SealingKeys;
use crate::state::{Snapshot, SnapshotId, SnapshotState};

/// How long snapshot mutations wait for the per-host lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates, tracks, and re-keys per-node snapshots.
///
/// Mutations for one hostname are serialized through that host's
/// distributed lock; snapshots of different hosts proceed independently.
/// The sealing key ring lives behind its own lock so rotation never
/// blocks reads of other state.
pub struct SnapshotManager {
    curator: Arc<dyn Curator>,
    keys: RwLock<SealingKeys>,
    lock_timeout: Duration,
}

impl SnapshotManager {
    pub fn new(curator: Arc<dyn Curator>, keys: SealingKeys) -> Self {
        Self {
            curator,
            keys: RwLock::new(keys),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Begin a backup of `hostname`: mints a new id, seals a fresh
    /// content key under the current sealing key version, and persists
    /// the snapshot in state `Creating`.
    ///
    /// Never retried blindly — each call mints a new snapshot.
    pub fn create(
        &self,
        hostname: &str,
        cluster: &str,
        node_index: u32,
        account: CloudAccount,
        now: u64,
    ) -> SnapshotResult<Snapshot> {
        let _lock = self
            .curator
            .lock(&paths::snapshot_lock(hostname), self.lock_timeout)?;

        let sealed = {
            let keys = self.keys.read().expect("sealing keys poisoned");
            let mut content_key = [0u8; 32];
            OsRng.fill_bytes(&mut content_key);
            keys.seal(&content_key, keys.current_version())?
        };

        let id = SnapshotId::generate();
        let snapshot = Snapshot::create(id, hostname, cluster, node_index, account, sealed, now);
        write_json(
            self.curator.as_ref(),
            &paths::snapshot(hostname, &id.to_string()),
            &snapshot,
        )?;
        info!(%hostname, %id, "snapshot created");
        Ok(snapshot)
    }

    /// The snapshot, or `NotFound`.
    pub fn require(&self, hostname: &str, id: SnapshotId) -> SnapshotResult<Snapshot> {
        read_json(
            self.curator.as_ref(),
            &paths::snapshot(hostname, &id.to_string()),
        )?
        .ok_or_else(|| SnapshotError::NotFound {
            hostname: hostname.to_string(),
            id,
        })
    }

    /// All snapshots recorded for `hostname`.
    pub fn list(&self, hostname: &str) -> SnapshotResult<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        for path in self.curator.list(&paths::snapshots_of(hostname))? {
            if let Some(snapshot) = read_json(self.curator.as_ref(), &path)? {
                snapshots.push(snapshot);
            }
        }
        Ok(snapshots)
    }

    /// Transition the snapshot to `state` and persist the result.
    pub fn move_to(
        &self,
        hostname: &str,
        id: SnapshotId,
        state: SnapshotState,
        now: u64,
    ) -> SnapshotResult<Snapshot> {
        let _lock = self
            .curator
            .lock(&paths::snapshot_lock(hostname), self.lock_timeout)?;

        let snapshot = self.require(hostname, id)?.with(state, now)?;
        write_json(
            self.curator.as_ref(),
            &paths::snapshot(hostname, &id.to_string()),
            &snapshot,
        )?;
        debug!(%hostname, %id, ?state, "snapshot state advanced");
        Ok(snapshot)
    }

    /// Delete the snapshot record, or `NotFound`.
    pub fn remove(&self, hostname: &str, id: SnapshotId) -> SnapshotResult<()> {
        let _lock = self
            .curator
            .lock(&paths::snapshot_lock(hostname), self.lock_timeout)?;

        if !self
            .curator
            .delete(&paths::snapshot(hostname, &id.to_string()))?
        {
            return Err(SnapshotError::NotFound {
                hostname: hostname.to_string(),
                id,
            });
        }
        info!(%hostname, %id, "snapshot removed");
        Ok(())
    }

    /// Re-seal the snapshot's content key for `receiver`.
    ///
    /// Uses the historical sealing key recorded against the snapshot's
    /// version, so this works across sealing-key rotations. The raw key
    /// never leaves the sealing operation.
    pub fn key_of(
        &self,
        id: SnapshotId,
        hostname: &str,
        receiver: &PublicKey,
    ) -> SnapshotResult<Vec<u8>> {
        let snapshot = self.require(hostname, id)?;
        let keys = self.keys.read().expect("sealing keys poisoned");
        keys.reseal(snapshot.key(), receiver)
    }

    /// Rotate the platform sealing key. Only affects snapshots created
    /// after this call.
    pub fn rotate_sealing_key(&self) -> u32 {
        self.keys.write().expect("sealing keys poisoned").rotate()
    }

    pub fn current_sealing_key_version(&self) -> u32 {
        self.keys
            .read()
            .expect("sealing keys poisoned")
            .current_version()
    }
}
