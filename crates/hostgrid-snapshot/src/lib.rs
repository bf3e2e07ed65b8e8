//! hostgrid-snapshot — encrypted per-node backup lifecycle.
//!
//! A snapshot walks a strict state machine (creating → created →
//! restoring → restored, with restored → restoring for re-restores) and
//! carries its content encryption key sealed to a versioned platform
//! sealing key. Rotating the sealing key only affects new snapshots:
//! every snapshot records the version it was sealed under, and the
//! historical key material keeps it resealable for any recipient.

pub mod error;
pub mod manager;
pub mod sealing;
pub mod state;

pub use error::{SnapshotError, SnapshotResult};
pub use manager::SnapshotManager;
pub use sealing::{SealedSnapshotKey, SealingKeys, open_with};
pub use state::{Snapshot, SnapshotHistoryRecord, SnapshotId, SnapshotState};
