use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use utoipa::ToSchema;

pub const DEFAULT_MAX_SIZE: usize = 100;

/// Snapshot of the cache dimensions, returned verbatim by the status route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub size: usize,
    pub max_size: usize,
}

/// Bounded key/value store with strict FIFO eviction.
///
/// Lookups go through a `HashMap`; a separate queue of keys tracks insertion
/// order, front being the earliest-inserted surviving entry. Overwriting an
/// existing key replaces the value without moving the key in the queue, so
/// eviction order depends only on first insertion.
#[derive(Debug)]
pub struct BoundedCache<V> {
    entries: HashMap<String, V>,
    order: VecDeque<String>,
    max_size: usize,
}

impl<V> BoundedCache<V> {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: String, value: V) {
        if self.entries.contains_key(&key) {
            // Overwrite in place; the key keeps its slot in the eviction order
            self.entries.insert(key, value);
            return;
        }
        if self.entries.len() >= self.max_size {
            self.evict_oldest();
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Replaces the capacity, evicting earliest-inserted entries until the
    /// store fits. Callers validate that `max_size` is positive.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.entries.len() > self.max_size {
            self.evict_oldest();
        }
    }

    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            size: self.entries.len(),
            max_size: self.max_size,
        }
    }

    /// Surviving keys in insertion order, earliest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
            tracing::debug!("Evicted cache entry {}", oldest);
        }
    }
}

impl<V> Default for BoundedCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut cache = BoundedCache::new(10);
        cache.put("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_size_never_exceeds_max() {
        let mut cache = BoundedCache::new(3);
        for i in 0..20 {
            cache.put(format!("key{}", i), i);
            assert!(cache.status().size <= 3);
        }
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cache = BoundedCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3);

        assert_eq!(cache.get("a"), None); // earliest inserted, evicted
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("c"), Some(&3));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_survivors_are_last_inserted_in_order() {
        let mut cache = BoundedCache::new(3);
        for i in 0..7 {
            cache.put(format!("k{}", i), i);
        }
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["k4", "k5", "k6"]);
    }

    #[test]
    fn test_overwrite_does_not_evict_or_reorder() {
        let mut cache = BoundedCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("a".to_string(), 3);

        assert_eq!(cache.status().size, 2);
        assert_eq!(cache.get("a"), Some(&3));

        // "a" kept its original slot, so it is still the first to go
        cache.put("c".to_string(), 4);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_shrink_evicts_earliest_entries() {
        let mut cache = BoundedCache::new(5);
        for i in 0..5 {
            cache.put(format!("k{}", i), i);
        }
        cache.set_max_size(2);

        assert_eq!(cache.status(), CacheStatus { size: 2, max_size: 2 });
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["k3", "k4"]);
    }

    #[test]
    fn test_grow_evicts_nothing() {
        let mut cache = BoundedCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.set_max_size(10);

        assert_eq!(cache.status(), CacheStatus { size: 2, max_size: 10 });
        cache.put("c".to_string(), 3);
        assert_eq!(cache.get("a"), Some(&1)); // room to spare now
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut cache = BoundedCache::new(4);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.clear();

        assert_eq!(cache.status(), CacheStatus { size: 0, max_size: 4 });
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_default_capacity() {
        let cache: BoundedCache<i32> = BoundedCache::default();
        assert_eq!(cache.status().max_size, 100);
    }
}
