//! Tenant application identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one deployed application instance of a tenant.
///
/// The triple is immutable and doubles as the ownership key in the host
/// registry and as the lock key in the coordination store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId {
    tenant: String,
    application: String,
    instance: String,
}

impl ApplicationId {
    pub fn new(tenant: &str, application: &str, instance: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            application: application.to_string(),
            instance: instance.to_string(),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Path fragment `tenant/application/instance` used in persisted keys
    /// and archive destinations.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.tenant, self.application, self.instance)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.tenant, self.application, self.instance)
    }
}
