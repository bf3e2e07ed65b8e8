//! Hostname → owner map with serialized mutation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use tracing::{debug, info};

use hostgrid_types::ApplicationId;

use crate::error::{RegistryError, RegistryResult};

/// Pre-flight host verification, exposed to config-model builders.
///
/// The one place outside callers may check a host claim before
/// committing to a full deploy.
pub trait HostValidator: Send + Sync {
    /// Fails with [`RegistryError::HostConflict`] if any of `hostnames`
    /// is owned by a different application. Side-effect free.
    fn verify_hosts(&self, owner: &ApplicationId, hostnames: &[String]) -> RegistryResult<()>;
}

/// The set difference applied by one [`HostRegistry::update`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostUpdate {
    /// Hosts newly claimed for the owner, sorted.
    pub claimed: Vec<String>,
    /// Hosts released because they left the owner's set, sorted.
    pub released: Vec<String>,
}

impl HostUpdate {
    pub fn is_noop(&self) -> bool {
        self.claimed.is_empty() && self.released.is_empty()
    }
}

/// Hostname ownership registry for one control-plane process.
///
/// Reads go through the map's own `RwLock` and never wait on mutation;
/// the dedicated mutation mutex makes `update`'s verify→diff→release→
/// claim sequence atomic with respect to other updates across all owners.
pub struct HostRegistry {
    hosts: RwLock<HashMap<String, ApplicationId>>,
    mutation: Mutex<()>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self {
            hosts: RwLock::new(HashMap::new()),
            mutation: Mutex::new(()),
        }
    }

    /// Replace `owner`'s host set with `new_hosts`.
    ///
    /// Verifies the new set, releases hosts no longer in it and claims
    /// the ones joining it, as one serialized step. Hosts present in both
    /// the old and new set are untouched, so repeating a call with the
    /// same set is a no-op.
    pub fn update(&self, owner: &ApplicationId, new_hosts: &[String]) -> RegistryResult<HostUpdate> {
        let _serialized = self.mutation.lock().expect("host registry mutation lock poisoned");

        self.verify_hosts(owner, new_hosts)?;

        let requested: HashSet<&str> = new_hosts.iter().map(String::as_str).collect();
        let current: HashSet<String> = {
            let hosts = self.hosts.read().expect("host registry poisoned");
            hosts
                .iter()
                .filter(|(_, held_by)| *held_by == owner)
                .map(|(hostname, _)| hostname.clone())
                .collect()
        };

        let mut released: Vec<String> = current
            .iter()
            .filter(|hostname| !requested.contains(hostname.as_str()))
            .cloned()
            .collect();
        let mut claimed: Vec<String> = requested
            .iter()
            .filter(|hostname| !current.contains(**hostname))
            .map(|hostname| hostname.to_string())
            .collect();
        released.sort();
        claimed.sort();

        let update = HostUpdate { claimed, released };
        if update.is_noop() {
            debug!(%owner, hosts = new_hosts.len(), "host set unchanged");
            return Ok(update);
        }

        {
            let mut hosts = self.hosts.write().expect("host registry poisoned");
            for hostname in &update.released {
                hosts.remove(hostname);
            }
            for hostname in &update.claimed {
                hosts.insert(hostname.clone(), owner.clone());
            }
        }
        info!(
            %owner,
            claimed = update.claimed.len(),
            released = update.released.len(),
            "host set updated"
        );
        Ok(update)
    }

    /// Release every host owned by `owner`. Returns the released
    /// hostnames, sorted.
    pub fn remove_application(&self, owner: &ApplicationId) -> Vec<String> {
        self.remove_where(|held_by| held_by == owner)
    }

    /// Release every host owned by any application of `tenant`. Returns
    /// the released hostnames, sorted.
    pub fn remove_tenant(&self, tenant: &str) -> Vec<String> {
        self.remove_where(|held_by| held_by.tenant() == tenant)
    }

    /// Hosts currently owned by `owner`, sorted.
    pub fn hosts_of(&self, owner: &ApplicationId) -> Vec<String> {
        let hosts = self.hosts.read().expect("host registry poisoned");
        let mut owned: Vec<String> = hosts
            .iter()
            .filter(|(_, held_by)| *held_by == owner)
            .map(|(hostname, _)| hostname.clone())
            .collect();
        owned.sort();
        owned
    }

    /// Snapshot of the whole ownership map.
    pub fn all_hosts(&self) -> HashMap<String, ApplicationId> {
        self.hosts.read().expect("host registry poisoned").clone()
    }

    fn remove_where(&self, mut owned: impl FnMut(&ApplicationId) -> bool) -> Vec<String> {
        let _serialized = self.mutation.lock().expect("host registry mutation lock poisoned");
        let mut hosts = self.hosts.write().expect("host registry poisoned");
        let mut released: Vec<String> = hosts
            .iter()
            .filter(|(_, held_by)| owned(held_by))
            .map(|(hostname, _)| hostname.clone())
            .collect();
        for hostname in &released {
            hosts.remove(hostname);
        }
        released.sort();
        if !released.is_empty() {
            info!(count = released.len(), "hosts released");
        }
        released
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HostValidator for HostRegistry {
    fn verify_hosts(&self, owner: &ApplicationId, hostnames: &[String]) -> RegistryResult<()> {
        let hosts = self.hosts.read().expect("host registry poisoned");
        for hostname in hostnames {
            if let Some(held_by) = hosts.get(hostname) {
                if held_by != owner {
                    return Err(RegistryError::HostConflict {
                        hostname: hostname.clone(),
                        held_by: held_by.clone(),
                        requested_by: owner.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn app(tenant: &str, name: &str) -> ApplicationId {
        ApplicationId::new(tenant, name, "default")
    }

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn update_claims_and_releases() {
        let registry = HostRegistry::new();
        let owner = app("acme", "shop");

        let first = registry.update(&owner, &hosts(&["h1", "h2"])).unwrap();
        assert_eq!(first.claimed, hosts(&["h1", "h2"]));
        assert!(first.released.is_empty());

        let second = registry.update(&owner, &hosts(&["h2", "h3"])).unwrap();
        assert_eq!(second.claimed, hosts(&["h3"]));
        assert_eq!(second.released, hosts(&["h1"]));
        assert_eq!(registry.hosts_of(&owner), hosts(&["h2", "h3"]));
    }

    #[test]
    fn repeated_update_is_a_noop() {
        let registry = HostRegistry::new();
        let owner = app("acme", "shop");

        registry.update(&owner, &hosts(&["h1", "h2"])).unwrap();
        let again = registry.update(&owner, &hosts(&["h1", "h2"])).unwrap();
        assert!(again.is_noop());
    }

    #[test]
    fn conflicting_claim_is_rejected_not_overwritten() {
        let registry = HostRegistry::new();
        let first = app("acme", "shop");
        let second = app("umbrella", "labs");

        registry.update(&first, &hosts(&["h1"])).unwrap();
        let err = registry.update(&second, &hosts(&["h1", "h2"])).unwrap_err();
        assert_eq!(
            err,
            RegistryError::HostConflict {
                hostname: "h1".to_string(),
                held_by: first.clone(),
                requested_by: second.clone(),
            }
        );
        // The failed update must not have claimed anything.
        assert!(registry.hosts_of(&second).is_empty());
        assert_eq!(registry.hosts_of(&first), hosts(&["h1"]));
    }

    #[test]
    fn verify_is_side_effect_free() {
        let registry = HostRegistry::new();
        let owner = app("acme", "shop");

        registry.verify_hosts(&owner, &hosts(&["h1"])).unwrap();
        assert!(registry.all_hosts().is_empty());
    }

    #[test]
    fn remove_application_releases_only_its_hosts() {
        let registry = HostRegistry::new();
        let shop = app("acme", "shop");
        let labs = app("acme", "labs");
        registry.update(&shop, &hosts(&["h1", "h2"])).unwrap();
        registry.update(&labs, &hosts(&["h3"])).unwrap();

        assert_eq!(registry.remove_application(&shop), hosts(&["h1", "h2"]));
        assert_eq!(registry.hosts_of(&labs), hosts(&["h3"]));
    }

    #[test]
    fn remove_tenant_releases_all_its_applications() {
        let registry = HostRegistry::new();
        registry.update(&app("acme", "shop"), &hosts(&["h1"])).unwrap();
        registry.update(&app("acme", "labs"), &hosts(&["h2"])).unwrap();
        registry.update(&app("umbrella", "web"), &hosts(&["h3"])).unwrap();

        assert_eq!(registry.remove_tenant("acme"), hosts(&["h1", "h2"]));
        assert_eq!(registry.all_hosts().len(), 1);
    }

    #[test]
    fn concurrent_updates_never_share_a_host() {
        let registry = Arc::new(HostRegistry::new());
        let pool: Vec<String> = (0..8).map(|i| format!("h{i}")).collect();

        let mut workers = Vec::new();
        for t in 0..4 {
            let registry = Arc::clone(&registry);
            let pool = pool.clone();
            workers.push(thread::spawn(move || {
                let owner = app("tenant", &format!("app{t}"));
                for round in 0..50 {
                    // Each owner repeatedly tries a sliding window of the
                    // shared pool; conflicts are expected and fine.
                    let want: Vec<String> =
                        pool.iter().cycle().skip((t + round) % 8).take(3).cloned().collect();
                    if registry.update(&owner, &want).is_ok() {
                        // Nobody can take these hosts from under us: a
                        // competing update would hit HostConflict. The
                        // snapshot must therefore show us as sole owner.
                        let snapshot = registry.all_hosts();
                        for hostname in &want {
                            assert_eq!(snapshot.get(hostname), Some(&owner));
                        }
                    }
                }
                registry.update(&owner, &[]).unwrap();
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        // Every intermediate state was checked by update itself; at the
        // end all owners have released everything.
        assert!(registry.all_hosts().is_empty());
    }
}
