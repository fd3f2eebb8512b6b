// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Thread-safe LRU cache with insertion TTL
//!
//! Entries are evicted when the capacity bound pushes them out (least recently
//! used first) or when they are read after their TTL has elapsed. Either bound
//! applies independently.

use lru::LruCache;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Values produced by a loader and offered to the cache
    pub loads: u64,
    /// Entries dropped by the capacity bound or the TTL
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit ratio as percentage
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// LRU cache whose entries also expire a fixed time after insertion
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    stats: Mutex<CacheStats>,
    ttl: Option<Duration>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Create a cache; a capacity of 0 is raised to 1
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
            ttl,
        }
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Get a live value, promoting it to most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        let mut stats = self.stats.lock();

        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => {
                stats.hits += 1;
                log::debug!("Cache hit for {key:?}");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            stats.evictions += 1;
            log::info!("Cache entry {key:?} expired after {:?}", self.ttl.unwrap_or_default());
        }
        stats.misses += 1;
        None
    }

    /// Insert unless a live value is already cached; returns the value that
    /// ends up cached for the key
    pub fn insert_if_absent(&self, key: K, value: V) -> V {
        let mut entries = self.entries.lock();
        let mut stats = self.stats.lock();

        if let Some(existing) = entries.peek(&key) {
            if !self.is_expired(existing) {
                return existing.value.clone();
            }
        }

        let entry = Entry {
            value: value.clone(),
            inserted_at: Instant::now(),
        };
        // push hands back either the LRU victim or the stale entry for this key
        if let Some((evicted, _)) = entries.push(key, entry) {
            stats.evictions += 1;
            log::debug!("Evicted cache entry {evicted:?}");
        }
        value
    }

    /// Read-through lookup: on a miss, run `load` and cache its result
    ///
    /// Concurrent misses for one key may each run `load`; the first value
    /// inserted wins and every caller receives it. Errors are not cached.
    pub fn get_or_load<E>(&self, key: &K, load: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = load()?;
        self.stats.lock().loads += 1;
        Ok(self.insert_if_absent(key.clone(), value))
    }

    /// Remove one entry; returns whether it was present
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of resident entries, expired ones included until touched
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    /// Reset the statistics
    pub fn reset_stats(&self) {
        self.stats.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_hit_and_miss_counting() {
        let cache: TtlCache<String, i32> = TtlCache::new(4, None);
        assert_eq!(cache.get(&"a".to_string()), None);
        cache.insert_if_absent("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_ratio(), 50.0);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache: TtlCache<&str, i32> = TtlCache::new(4, None);
        assert_eq!(cache.insert_if_absent("k", 1), 1);
        assert_eq!(cache.insert_if_absent("k", 2), 1);
        assert_eq!(cache.get(&"k"), Some(1));
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache: TtlCache<&str, i32> = TtlCache::new(2, None);
        cache.insert_if_absent("a", 1);
        cache.insert_if_absent("b", 2);
        // Touch "a" so "b" becomes least recently used
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert_if_absent("c", 3);

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache: TtlCache<&str, i32> = TtlCache::new(4, Some(Duration::from_millis(20)));
        cache.insert_if_absent("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().evictions, 1);

        // An expired entry does not block a fresh insert
        cache.insert_if_absent("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
    }

    #[test]
    fn test_get_or_load() {
        let cache: TtlCache<&str, i32> = TtlCache::new(4, None);
        let calls = AtomicUsize::new(0);
        let load = || -> Result<i32, String> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        };

        assert_eq!(cache.get_or_load(&"k", load), Ok(7));
        assert_eq!(cache.get_or_load(&"k", load), Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().loads, 1);

        let failed: Result<i32, &str> = cache.get_or_load(&"other", || Err("boom"));
        assert_eq!(failed, Err("boom"));
        assert!(!cache.invalidate(&"other"));
        assert!(cache.invalidate(&"k"));
    }

    #[test]
    fn test_concurrent_loads_share_one_value() {
        let cache: Arc<TtlCache<&str, Arc<String>>> = Arc::new(TtlCache::new(4, None));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .get_or_load(&"k", || Ok::<_, ()>(Arc::new(format!("load {i}"))))
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = cache.get(&"k").unwrap();
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &cached)));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let cache: TtlCache<&str, i32> = TtlCache::new(0, None);
        assert_eq!(cache.capacity(), 1);
    }
}
