//! The archive URI manager — cached reads, locked writes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hostgrid_curator::{Curator, paths, read_json, write_json};
use hostgrid_types::{AccountClassifier, CloudAccount, Node};

use crate::error::{ArchiveError, ArchiveResult};
use crate::uri::ArchiveUri;
use crate::uris::ArchiveUris;

/// How long a fetched [`ArchiveUris`] snapshot stays fresh.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// How long a write waits for the distributed lock before giving up.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// What a `set_archive_uri` call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveTarget {
    Tenant(String),
    Account(CloudAccount),
}

/// Persisted record: one per tenant, one per cloud account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ArchiveUriRecord {
    uri: ArchiveUri,
}

struct CachedUris {
    uris: Arc<ArchiveUris>,
    fetched_at: Instant,
}

/// Resolves and mutates archive destinations.
///
/// Reads are served from a TTL-bounded cache refreshed lazily through the
/// cache mutex, so concurrent callers during a refresh wait for one
/// backing read instead of issuing their own. Writes take the
/// per-tenant (or global per-account) distributed lock, re-read the
/// backing record, and skip the write when nothing changes.
pub struct ArchiveUriManager {
    curator: Arc<dyn Curator>,
    classifier: Arc<dyn AccountClassifier>,
    cache: Mutex<Option<CachedUris>>,
    cache_ttl: Duration,
    lock_timeout: Duration,
}

impl ArchiveUriManager {
    pub fn new(curator: Arc<dyn Curator>, classifier: Arc<dyn AccountClassifier>) -> Self {
        Self {
            curator,
            classifier,
            cache: Mutex::new(None),
            cache_ttl: DEFAULT_CACHE_TTL,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The current archive destination mapping, refreshed from the
    /// coordination store if the cached snapshot has expired.
    pub fn archive_uris(&self) -> ArchiveResult<Arc<ArchiveUris>> {
        let mut cache = self.cache.lock().expect("archive cache poisoned");
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                return Ok(Arc::clone(&cached.uris));
            }
        }
        let uris = Arc::new(self.read_uris()?);
        debug!(
            tenants = uris.tenant_count(),
            accounts = uris.account_count(),
            "archive uris refreshed"
        );
        *cache = Some(CachedUris {
            uris: Arc::clone(&uris),
            fetched_at: Instant::now(),
        });
        Ok(uris)
    }

    /// The archive destination for one node, through the cache.
    pub fn archive_uri_for(&self, node: &Node) -> ArchiveResult<Option<ArchiveUri>> {
        Ok(self
            .archive_uris()?
            .archive_uri_for(node, self.classifier.as_ref()))
    }

    /// Set (`Some`) or clear (`None`) the archive destination for a
    /// tenant or an enclave cloud account.
    pub fn set_archive_uri(&self, target: &ArchiveTarget, uri: Option<&str>) -> ArchiveResult<()> {
        // Validate before any I/O.
        let normalized = uri.map(ArchiveUri::parse).transpose()?;
        let (lock_path, record_path) = match target {
            ArchiveTarget::Tenant(tenant) => {
                if tenant.is_empty() {
                    return Err(ArchiveError::InvalidTenant(tenant.clone()));
                }
                (paths::archive_tenant_lock(tenant), paths::archive_tenant(tenant))
            }
            ArchiveTarget::Account(account) => {
                if account.is_unspecified() || !self.classifier.is_enclave(account) {
                    return Err(ArchiveError::InvalidAccount(account.clone()));
                }
                (
                    paths::archive_account_lock(),
                    paths::archive_account(account.value()),
                )
            }
        };

        let _lock = self.curator.lock(&lock_path, self.lock_timeout)?;
        // Re-read the backing record, not the cache, to avoid clobbering
        // a concurrent change from another replica.
        let current: Option<ArchiveUriRecord> = read_json(self.curator.as_ref(), &record_path)?;
        let current_uri = current.map(|record| record.uri);

        match (&current_uri, &normalized) {
            (current, new) if current == new => {
                debug!(path = %record_path, "archive uri unchanged, skipping write");
            }
            (_, Some(new_uri)) => {
                write_json(
                    self.curator.as_ref(),
                    &record_path,
                    &ArchiveUriRecord {
                        uri: new_uri.clone(),
                    },
                )?;
                info!(path = %record_path, uri = %new_uri, "archive uri set");
            }
            (_, None) => {
                self.curator.delete(&record_path)?;
                info!(path = %record_path, "archive uri removed");
            }
        }

        self.invalidate();
        Ok(())
    }

    /// Drop the cached snapshot; the next read re-fetches.
    pub fn invalidate(&self) {
        *self.cache.lock().expect("archive cache poisoned") = None;
    }

    fn read_uris(&self) -> ArchiveResult<ArchiveUris> {
        let curator = self.curator.as_ref();
        let mut tenant_uris = BTreeMap::new();
        for path in curator.list(paths::ARCHIVE_TENANTS)? {
            let Some(tenant) = path.strip_prefix(paths::ARCHIVE_TENANTS) else {
                continue;
            };
            if let Some(record) = read_json::<ArchiveUriRecord>(curator, &path)? {
                tenant_uris.insert(tenant.to_string(), record.uri);
            }
        }
        let mut account_uris = BTreeMap::new();
        for path in curator.list(paths::ARCHIVE_ACCOUNTS)? {
            let Some(account) = path.strip_prefix(paths::ARCHIVE_ACCOUNTS) else {
                continue;
            };
            if let Some(record) = read_json::<ArchiveUriRecord>(curator, &path)? {
                account_uris.insert(CloudAccount::from_id(account), record.uri);
            }
        }
        Ok(ArchiveUris::new(tenant_uris, account_uris))
    }
}
