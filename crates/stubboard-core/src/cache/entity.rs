//! Generic bounded key->value cache.

use moka::sync::Cache;
use std::time::Duration;

/// Entry-count-bounded cache with access-based expiry. Mutating entry
/// operations (`upsert_with`) are atomic per key: at most one mutator runs
/// for a given key at a time while distinct keys proceed in parallel.
#[derive(Clone)]
pub struct EntityCache<T: Clone + Send + Sync + 'static> {
    cache: Cache<String, T>,
}

impl<T: Clone + Send + Sync + 'static> EntityCache<T> {
    pub fn new(max_entries: u64, idle_expiry: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_entries)
                .time_to_idle(idle_expiry)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.cache.get(key)
    }

    /// Load-on-miss with population. The loader runs at most once per key
    /// even under concurrent callers.
    pub fn get_with(&self, key: &str, loader: impl FnOnce() -> T) -> T {
        self.cache.get_with(key.to_string(), loader)
    }

    pub fn put(&self, key: &str, value: T) {
        self.cache.insert(key.to_string(), value);
    }

    /// Atomic per-key read-modify-write. The closure receives the current
    /// value (if any) and returns the replacement.
    pub fn upsert_with(&self, key: &str, f: impl FnOnce(Option<T>) -> T) {
        self.cache
            .entry(key.to_string())
            .and_upsert_with(|entry| f(entry.map(|e| e.into_value())));
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn size(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}
