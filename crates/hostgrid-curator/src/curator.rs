//! The coordination-store contract and its scoped lock handle.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CuratorError, CuratorResult};

/// Blocking client for the distributed coordination store.
///
/// All operations may perform network I/O and block the calling thread.
/// Locks are scoped: dropping the returned [`CuratorLock`] releases the
/// distributed lock. A lock that cannot be acquired within `timeout`
/// fails with [`CuratorError::LockTimeout`]; the caller retries the whole
/// operation, never just the lock.
pub trait Curator: Send + Sync {
    /// Acquire the exclusive lock at `path`, waiting at most `timeout`.
    fn lock(&self, path: &str, timeout: Duration) -> CuratorResult<CuratorLock>;

    /// Read the record at `path`, `None` if absent.
    fn read(&self, path: &str) -> CuratorResult<Option<Vec<u8>>>;

    /// Create or replace the record at `path`.
    fn write(&self, path: &str, bytes: &[u8]) -> CuratorResult<()>;

    /// Delete the record at `path`. Returns true if it existed.
    fn delete(&self, path: &str) -> CuratorResult<bool>;

    /// Paths of all records under `prefix`, sorted.
    fn list(&self, prefix: &str) -> CuratorResult<Vec<String>>;
}

/// A held distributed lock, released on drop.
pub struct CuratorLock {
    path: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CuratorLock {
    /// Wrap a release action. Store adapters call this from their
    /// [`Curator::lock`] implementation.
    pub fn new(path: &str, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            path: path.to_string(),
            release: Some(Box::new(release)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for CuratorLock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!(path = %self.path, "lock released");
        }
    }
}

impl std::fmt::Debug for CuratorLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuratorLock").field("path", &self.path).finish()
    }
}

/// Read and deserialize the JSON record at `path`.
pub fn read_json<T: DeserializeOwned>(curator: &dyn Curator, path: &str) -> CuratorResult<Option<T>> {
    match curator.read(path)? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes).map_err(|e| CuratorError::Deserialize {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and write it to `path`.
pub fn write_json<T: Serialize>(curator: &dyn Curator, path: &str, value: &T) -> CuratorResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| CuratorError::Serialize {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    curator.write(path, &bytes)
}
