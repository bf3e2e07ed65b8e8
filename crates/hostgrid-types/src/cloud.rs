//! Cloud account values and enclave classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cloud account identifier, e.g. an AWS account number.
///
/// The empty string is the "unspecified" account: resources run in the
/// platform's own shared account.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloudAccount(String);

impl CloudAccount {
    pub fn from_id(id: &str) -> Self {
        Self(id.to_string())
    }

    /// The account used when a tenant has not brought their own.
    pub fn unspecified() -> Self {
        Self(String::new())
    }

    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CloudAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classifies cloud accounts for the zone this control plane serves.
///
/// Implemented outside the core (the zone registry knows which accounts
/// are enclave-class); consumed by the archive manager to route lookups
/// and validate writes.
pub trait AccountClassifier: Send + Sync {
    /// True if the account's resources are isolated from the platform's
    /// shared infrastructure and need their own archive destination.
    fn is_enclave(&self, account: &CloudAccount) -> bool;
}
