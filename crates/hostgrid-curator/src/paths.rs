//! Namespace layout under the coordination store.
//!
//! One record per tenant and per cloud account for archive URIs, one
//! record per snapshot keyed by hostname and snapshot id. Lock paths live
//! under `locks/` and mirror the record they guard.

/// Prefix under which per-tenant archive records live.
pub const ARCHIVE_TENANTS: &str = "archive/tenants/";

/// Prefix under which per-account archive records live.
pub const ARCHIVE_ACCOUNTS: &str = "archive/accounts/";

/// Archive URI record for a tenant.
pub fn archive_tenant(tenant: &str) -> String {
    format!("{ARCHIVE_TENANTS}{tenant}")
}

/// Archive URI record for a cloud account.
pub fn archive_account(account: &str) -> String {
    format!("{ARCHIVE_ACCOUNTS}{account}")
}

/// Lock guarding a tenant's archive record.
pub fn archive_tenant_lock(tenant: &str) -> String {
    format!("locks/archive/{tenant}")
}

/// Global lock guarding the per-account archive records.
pub fn archive_account_lock() -> String {
    "locks/archive".to_string()
}

/// Snapshot record for `id` on `hostname`.
pub fn snapshot(hostname: &str, id: &str) -> String {
    format!("snapshots/{hostname}/{id}")
}

/// Prefix under which all of a host's snapshots live.
pub fn snapshots_of(hostname: &str) -> String {
    format!("snapshots/{hostname}/")
}

/// Lock serializing snapshot mutations for one host.
pub fn snapshot_lock(hostname: &str) -> String {
    format!("locks/snapshots/{hostname}")
}
