//! Response cache for resource queries.
//!
//! Entries are keyed by resource and a scope string (a list query or a
//! record id). Writes are last-write-wins; a mutation invalidates whole
//! resources rather than individual keys.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::api::Resource;

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub scope: String,
}

impl QueryKey {
    pub fn new(resource: Resource, scope: impl Into<String>) -> Self {
        Self {
            resource,
            scope: scope.into(),
        }
    }

    pub fn record(resource: Resource, id: i64) -> Self {
        Self::new(resource, format!("id={}", id))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    fetched_at: Instant,
}

/// In-memory query cache.
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
    stale_after: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl QueryCache {
    /// A zero `stale_after` disables caching of reads.
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_after,
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Fresh cached value for `key`.
    pub fn get(&self, key: &QueryKey) -> Option<&Value> {
        self.entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_after)
            .map(|entry| &entry.value)
    }

    pub fn put(&mut self, key: QueryKey, value: Value) {
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every entry of `resource`. Returns the number removed.
    pub fn invalidate(&mut self, resource: Resource) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.resource != resource);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(resource = resource.name(), removed, "cache invalidated");
        }
        removed
    }

    /// Invalidate `resource` and everything that depends on it.
    pub fn invalidate_with_dependents(&mut self, resource: Resource) -> usize {
        let mut removed = self.invalidate(resource);
        for dependent in resource.dependents() {
            removed += self.invalidate(*dependent);
        }
        removed
    }

    pub fn remove(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
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
    use serde_json::json;

    fn fresh_cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(600))
    }

    #[test]
    fn test_put_get() {
        let mut cache = fresh_cache();
        let key = QueryKey::record(Resource::Patients, 1);
        cache.put(key.clone(), json!({"id": 1}));
        assert_eq!(cache.get(&key), Some(&json!({"id": 1})));
    }

    #[test]
    fn test_last_write_wins() {
        let mut cache = fresh_cache();
        let key = QueryKey::record(Resource::Patients, 1);
        cache.put(key.clone(), json!({"v": 1}));
        cache.put(key.clone(), json!({"v": 2}));
        assert_eq!(cache.get(&key).unwrap()["v"], 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_stale_time_never_fresh() {
        let mut cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::new(Resource::Clinics, "list");
        cache.put(key.clone(), json!([]));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_invalidate_resource_only() {
        let mut cache = fresh_cache();
        cache.put(QueryKey::new(Resource::Patients, "list?page=1"), json!([]));
        cache.put(QueryKey::record(Resource::Patients, 3), json!({}));
        cache.put(QueryKey::new(Resource::Clinics, "list?page=1"), json!([]));

        assert_eq!(cache.invalidate(Resource::Patients), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&QueryKey::new(Resource::Clinics, "list?page=1")).is_some());
    }

    #[test]
    fn test_invalidate_with_dependents() {
        let mut cache = fresh_cache();
        cache.put(QueryKey::new(Resource::Movements, "list"), json!([]));
        cache.put(QueryKey::new(Resource::Materials, "list"), json!([]));
        cache.put(QueryKey::new(Resource::Lots, "list"), json!([]));
        cache.put(QueryKey::new(Resource::Patients, "list"), json!([]));

        assert_eq!(cache.invalidate_with_dependents(Resource::Movements), 3);
        assert_eq!(cache.len(), 1);
    }
}
