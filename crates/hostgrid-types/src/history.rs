//! Prepend-only change histories.
//!
//! Support access (and records of the same family) is tracked as an
//! ordered, most-recent-first list of changes. The current status is
//! always derived from the newest record, never stored redundantly, so
//! the history cannot disagree with itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejected history mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("change at {at} is older than the latest recorded change at {latest}")]
    NonMonotonic { at: u64, latest: u64 },

    #[error("allow at {at} must expire strictly after it is granted, got {until}")]
    ExpiryNotAfterGrant { at: u64, until: u64 },
}

/// One recorded change to support access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SupportAccessChange {
    Allowed {
        by: String,
        at: u64,
        /// When the grant lapses (epoch ms, exclusive).
        until: u64,
    },
    Disallowed {
        by: String,
        at: u64,
    },
}

impl SupportAccessChange {
    fn at(&self) -> u64 {
        match self {
            SupportAccessChange::Allowed { at, .. } => *at,
            SupportAccessChange::Disallowed { at, .. } => *at,
        }
    }
}

/// Status derived from the history at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportAccessStatus {
    NotAllowed,
    Allowed { until: u64 },
}

/// Support access history for one application, most recent change first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportAccess {
    history: Vec<SupportAccessChange>,
}

impl SupportAccess {
    /// History with no changes: access was never granted.
    pub fn disallowed() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[SupportAccessChange] {
        &self.history
    }

    /// Grant access until `until`. The grant must be dated no earlier than
    /// the latest recorded change and must expire strictly after itself.
    pub fn allow(self, by: &str, at: u64, until: u64) -> Result<Self, HistoryError> {
        if until <= at {
            return Err(HistoryError::ExpiryNotAfterGrant { at, until });
        }
        self.prepend(SupportAccessChange::Allowed {
            by: by.to_string(),
            at,
            until,
        })
    }

    /// Revoke access as of `at`.
    pub fn disallow(self, by: &str, at: u64) -> Result<Self, HistoryError> {
        self.prepend(SupportAccessChange::Disallowed {
            by: by.to_string(),
            at,
        })
    }

    /// The status at `now`, derived from the newest change.
    pub fn status(&self, now: u64) -> SupportAccessStatus {
        match self.history.first() {
            Some(SupportAccessChange::Allowed { until, .. }) if now < *until => {
                SupportAccessStatus::Allowed { until: *until }
            }
            _ => SupportAccessStatus::NotAllowed,
        }
    }

    fn prepend(mut self, change: SupportAccessChange) -> Result<Self, HistoryError> {
        if let Some(latest) = self.history.first() {
            if change.at() < latest.at() {
                return Err(HistoryError::NonMonotonic {
                    at: change.at(),
                    latest: latest.at(),
                });
            }
        }
        self.history.insert(0, change);
        Ok(self)
    }
}
