use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::data::model::Dataset;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Snapshot cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<Dataset>,
    loaded_at: Instant,
}

/// Loaded snapshots keyed by source identifier.
///
/// A snapshot is never mutated: a refresh builds a new `Dataset` and swaps
/// the `Arc`, so readers holding the old one finish against it.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live snapshot for `key`, or run `load` when it is absent or
    /// older than the TTL. On a failed reload the previous snapshot stays
    /// cached (still expired) and the error is returned.
    pub fn get_or_load<F>(&mut self, key: &str, load: F) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce() -> Result<Dataset, LoadError>,
    {
        if let Some(entry) = self.entries.get(key) {
            if entry.loaded_at.elapsed() < self.ttl {
                debug!("snapshot cache hit for {key}");
                return Ok(Arc::clone(&entry.snapshot));
            }
            info!("snapshot for {key} expired, reloading");
        }

        match load() {
            Ok(dataset) => {
                let snapshot = Arc::new(dataset);
                self.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        snapshot: Arc::clone(&snapshot),
                        loaded_at: Instant::now(),
                    },
                );
                Ok(snapshot)
            }
            Err(e) => {
                if self.entries.contains_key(key) {
                    warn!("reload of {key} failed, keeping previous snapshot: {e}");
                }
                Err(e)
            }
        }
    }

    /// The cached snapshot regardless of age, without loading.
    pub fn peek(&self, key: &str) -> Option<Arc<Dataset>> {
        self.entries.get(key).map(|e| Arc::clone(&e.snapshot))
    }

    /// Drop one snapshot; the next read reloads it.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{EntityType, Record};
    use std::cell::Cell;

    fn dataset(name: &str) -> Dataset {
        Dataset::from_records(vec![Record::new(name, EntityType::Other)])
    }

    #[test]
    fn second_read_is_served_from_cache() {
        let mut cache = SnapshotCache::new(Duration::from_secs(3600));
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(dataset("First Co"))
        };
        let a = cache.get_or_load("src", load).unwrap();
        let b = cache
            .get_or_load("src", || {
                loads.set(loads.get() + 1);
                Ok(dataset("Second Co"))
            })
            .unwrap();
        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn expired_snapshot_is_replaced_but_old_reader_keeps_it() {
        let mut cache = SnapshotCache::new(Duration::ZERO);
        let old = cache.get_or_load("src", || Ok(dataset("Old Co"))).unwrap();
        let new = cache.get_or_load("src", || Ok(dataset("New Co"))).unwrap();
        assert_eq!(old.records[0].company_name, "Old Co");
        assert_eq!(new.records[0].company_name, "New Co");
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut cache = SnapshotCache::new(Duration::from_secs(3600));
        cache.get_or_load("src", || Ok(dataset("Old Co"))).unwrap();
        assert!(cache.invalidate("src"));
        assert!(!cache.invalidate("src"));
        let fresh = cache.get_or_load("src", || Ok(dataset("New Co"))).unwrap();
        assert_eq!(fresh.records[0].company_name, "New Co");
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let mut cache = SnapshotCache::new(Duration::ZERO);
        cache.get_or_load("src", || Ok(dataset("Good Co"))).unwrap();
        let err = cache
            .get_or_load("src", || Err(LoadError::unavailable("src", "offline")))
            .unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { .. }));
        assert_eq!(cache.peek("src").unwrap().records[0].company_name, "Good Co");
    }

    #[test]
    fn keys_are_independent() {
        let mut cache = SnapshotCache::new(Duration::from_secs(3600));
        cache.get_or_load("a", || Ok(dataset("Aaa"))).unwrap();
        cache.get_or_load("b", || Ok(dataset("Bbb"))).unwrap();
        assert_eq!(cache.len(), 2);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
