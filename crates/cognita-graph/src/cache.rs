//! Opt-in, process-wide snapshot cache.
//!
//! Algorithms never consult this cache; callers that rebuild snapshots
//! often may wrap the builder with it. Entries are keyed by the build
//! parameters and stamped with the storage version they were built from.
//! An entry is reused only while its stamp matches the caller's current
//! version and it is younger than the TTL. The storage collaborator bumps
//! the version whenever a concept or relation changes.

use crate::graph::GraphSnapshot;
use crate::types::Category;
use cognita_core::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Build parameters identifying a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: Option<Category>,
    pub max_nodes: Option<usize>,
}

impl CacheKey {
    pub fn new(category: Option<Category>, max_nodes: Option<usize>) -> Self {
        Self {
            category,
            max_nodes,
        }
    }
}

#[derive(Debug)]
struct Entry {
    snapshot: Arc<GraphSnapshot>,
    version: u64,
    built_at: Instant,
}

/// Thread-safe cache of immutable snapshots.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot for `key`, if built from `version` and still fresh.
    pub fn get(&self, key: &CacheKey, version: u64) -> Result<Option<Arc<GraphSnapshot>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::operation(format!("Snapshot cache lock poisoned: {e}")))?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.version == version && entry.built_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.snapshot)))
    }

    /// Return the cached snapshot or build, store and return a new one.
    ///
    /// `build` runs without holding the lock; concurrent misses may build
    /// twice, and the last writer wins.
    pub fn get_or_build<F>(&self, key: CacheKey, version: u64, build: F) -> Result<Arc<GraphSnapshot>>
    where
        F: FnOnce() -> Result<GraphSnapshot>,
    {
        if let Some(snapshot) = self.get(&key, version)? {
            log::debug!("Snapshot cache hit for {key:?} at version {version}");
            return Ok(snapshot);
        }

        log::debug!("Snapshot cache miss for {key:?} at version {version}");
        let snapshot = Arc::new(build()?);
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::operation(format!("Snapshot cache lock poisoned: {e}")))?;
        entries.insert(
            key,
            Entry {
                snapshot: Arc::clone(&snapshot),
                version,
                built_at: Instant::now(),
            },
        );
        Ok(snapshot)
    }

    /// Drop every entry.
    pub fn invalidate(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::operation(format!("Snapshot cache lock poisoned: {e}")))?;
        entries.clear();
        Ok(())
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Concept;
    use std::cell::Cell;

    fn build_one(calls: &Cell<usize>) -> Result<GraphSnapshot> {
        calls.set(calls.get() + 1);
        Ok(GraphSnapshot::from_parts(vec![Concept::new(1, "Array")], vec![]).0)
    }

    #[test]
    fn test_hit_reuses_snapshot() {
        let cache = SnapshotCache::default();
        let calls = Cell::new(0);
        let key = CacheKey::new(None, Some(50));

        let a = cache.get_or_build(key, 1, || build_one(&calls)).unwrap();
        let b = cache.get_or_build(key, 1, || build_one(&calls)).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_version_change_rebuilds() {
        let cache = SnapshotCache::default();
        let calls = Cell::new(0);
        let key = CacheKey::new(None, None);

        cache.get_or_build(key, 1, || build_one(&calls)).unwrap();
        cache.get_or_build(key, 2, || build_one(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
        assert!(cache.get(&key, 1).unwrap().is_none());
        assert!(cache.get(&key, 2).unwrap().is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = SnapshotCache::default();
        let calls = Cell::new(0);

        cache
            .get_or_build(CacheKey::new(None, None), 1, || build_one(&calls))
            .unwrap();
        cache
            .get_or_build(CacheKey::new(Some(Category::Network), None), 1, || {
                build_one(&calls)
            })
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_ttl_always_rebuilds() {
        let cache = SnapshotCache::new(Duration::ZERO);
        let calls = Cell::new(0);
        let key = CacheKey::new(None, None);

        cache.get_or_build(key, 1, || build_one(&calls)).unwrap();
        cache.get_or_build(key, 1, || build_one(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate() {
        let cache = SnapshotCache::default();
        let calls = Cell::new(0);
        let key = CacheKey::new(None, None);

        cache.get_or_build(key, 1, || build_one(&calls)).unwrap();
        cache.invalidate().unwrap();
        assert!(cache.is_empty());

        cache.get_or_build(key, 1, || build_one(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_build_error_is_not_cached() {
        let cache = SnapshotCache::default();
        let key = CacheKey::new(None, None);

        let result = cache.get_or_build(key, 1, || Err(Error::operation("store offline")));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SnapshotCache>();
        assert_send_sync::<GraphSnapshot>();
    }
}
