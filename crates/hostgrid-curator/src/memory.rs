//! In-process curator for tests.
//!
//! Implements the full [`Curator`] contract — mutual exclusion, lock
//! timeouts, prefix listing — against process-local memory. Cloning
//! shares the same underlying store, so a test can hand "replicas" the
//! same coordination namespace.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::curator::{Curator, CuratorLock};
use crate::error::{CuratorError, CuratorResult};

/// Memory-backed [`Curator`]. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryCurator {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl MemoryCurator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Curator for MemoryCurator {
    fn lock(&self, path: &str, timeout: Duration) -> CuratorResult<CuratorLock> {
        let deadline = Instant::now() + timeout;
        let mut held = self.inner.held.lock().expect("curator lock table poisoned");
        while held.contains(path) {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Err(CuratorError::LockTimeout {
                    path: path.to_string(),
                    waited: timeout,
                });
            };
            let (guard, wait) = self
                .inner
                .released
                .wait_timeout(held, remaining)
                .expect("curator lock table poisoned");
            held = guard;
            if wait.timed_out() && held.contains(path) {
                return Err(CuratorError::LockTimeout {
                    path: path.to_string(),
                    waited: timeout,
                });
            }
        }
        held.insert(path.to_string());
        drop(held);

        let inner = Arc::clone(&self.inner);
        let owned = path.to_string();
        Ok(CuratorLock::new(path, move || {
            inner
                .held
                .lock()
                .expect("curator lock table poisoned")
                .remove(&owned);
            inner.released.notify_all();
        }))
    }

    fn read(&self, path: &str) -> CuratorResult<Option<Vec<u8>>> {
        let data = self.inner.data.read().expect("curator data poisoned");
        Ok(data.get(path).cloned())
    }

    fn write(&self, path: &str, bytes: &[u8]) -> CuratorResult<()> {
        let mut data = self.inner.data.write().expect("curator data poisoned");
        data.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> CuratorResult<bool> {
        let mut data = self.inner.data.write().expect("curator data poisoned");
        Ok(data.remove(path).is_some())
    }

    fn list(&self, prefix: &str) -> CuratorResult<Vec<String>> {
        let data = self.inner.data.read().expect("curator data poisoned");
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
