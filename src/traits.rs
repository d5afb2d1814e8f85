//! # Cache Trait Hierarchy
//!
//! Policy-independent interface shared by [`LruCache`](crate::policy::lru::LruCache)
//! and [`LfuCache`](crate::policy::lfu::LfuCache), so callers can be written
//! once against the operations they need.
//!
//! ## Architecture
//!
//! ```text
//!                     ┌─────────────────────────────────────────┐
//!                     │            CoreCache<K, V>              │
//!                     │                                         │
//!                     │  insert(&mut, K, V) → Option<V>         │
//!                     │  get(&mut, &K) → Option<&V>             │
//!                     │  try_get(&mut, &K) → Result<&V, _>      │
//!                     │  peek(&, &K) → Option<&V>               │
//!                     │  contains(&, &K) → bool                 │
//!                     │  len / is_empty / capacity / clear      │
//!                     └──────────────────┬──────────────────────┘
//!                                        │
//!                                        ▼
//!                     ┌─────────────────────────────────────────┐
//!                     │          MutableCache<K, V>             │
//!                     │                                         │
//!                     │  remove(&K) → Option<V>                 │
//!                     │  remove_batch(&[K]) → Vec<Option<V>>    │
//!                     └──────────────────┬──────────────────────┘
//!                                        │
//!                 ┌──────────────────────┴──────────────────────┐
//!                 ▼                                             ▼
//!   ┌────────────────────────────┐               ┌────────────────────────────┐
//!   │   LruCacheTrait<K, V>      │               │   LfuCacheTrait<K, V>      │
//!   │                            │               │                            │
//!   │  pop_lru() → (K, V)        │               │  pop_lfu() → (K, V)        │
//!   │  peek_lru() → (&K, &V)     │               │  peek_lfu() → (&K, &V)     │
//!   │  touch(&K) → bool          │               │  frequency(&K) → u64       │
//!   └────────────────────────────┘               └────────────────────────────┘
//! ```
//!
//! ## Implementation Notes
//!
//! - `CoreCache` puts no bounds on `K`/`V`; implementations add `Eq + Hash + Clone`.
//! - Values leaving through `remove` or `pop_*` are returned to the caller and
//!   never reach an eviction listener.
//! - None of these caches synchronize internally. Wrap one in a lock for
//!   shared access; `get` needs the write side.

use crate::error::CacheError;

/// Core cache operations that all caches support.
///
/// # Example
///
/// ```
/// use evictkit::traits::CoreCache;
/// use evictkit::policy::lru::LruCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCache::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair.
    ///
    /// If the cache is at capacity, an entry is evicted according to the
    /// cache's policy before the new entry is inserted. Returns the previous
    /// value for `key` unless it was handed to an eviction listener.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, recording the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Like [`get`](Self::get), reporting a miss as [`CacheError::NotFound`].
    ///
    /// ```
    /// use evictkit::error::CacheError;
    /// use evictkit::traits::CoreCache;
    /// use evictkit::policy::lfu::LfuCache;
    ///
    /// let mut cache: LfuCache<u32, &str> = LfuCache::new(4);
    /// CoreCache::insert(&mut cache, 1, "one");
    /// assert_eq!(CoreCache::try_get(&mut cache, &1), Ok(&"one"));
    /// assert_eq!(CoreCache::try_get(&mut cache, &2), Err(CacheError::NotFound));
    /// ```
    fn try_get(&mut self, key: &K) -> Result<&V, CacheError> {
        self.get(key).ok_or(CacheError::NotFound)
    }

    /// Reads a value without affecting eviction order.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes all entries from the cache.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use evictkit::traits::{CoreCache, MutableCache};
/// use evictkit::policy::lfu::LfuCache;
///
/// fn invalidate_keys<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = LfuCache::new(100);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
/// cache.insert(3, "three".to_string());
///
/// invalidate_keys(&mut cache, &[1, 3]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a specific key-value pair, returning the value if it existed.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys, returning results in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// LRU-specific operations.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Returns the least recently used entry without removing it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks a key as recently used; `false` if it is absent.
    fn touch(&mut self, key: &K) -> bool;
}

/// LFU-specific operations.
pub trait LfuCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least frequently used entry.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    /// Returns the least frequently used entry without removing it.
    fn peek_lfu(&self) -> Option<(&K, &V)>;

    /// Access count of a key, if present.
    fn frequency(&self, key: &K) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lfu::LfuCache;
    use crate::policy::lru::LruCache;

    fn fill<C: CoreCache<u32, u32>>(cache: &mut C, n: u32) {
        for i in 0..n {
            cache.insert(i, i * 10);
        }
    }

    fn drain_lru<C: LruCacheTrait<u32, u32>>(cache: &mut C) -> Vec<u32> {
        std::iter::from_fn(|| cache.pop_lru().map(|(k, _)| k)).collect()
    }

    fn drain_lfu<C: LfuCacheTrait<u32, u32>>(cache: &mut C) -> Vec<u32> {
        std::iter::from_fn(|| cache.pop_lfu().map(|(k, _)| k)).collect()
    }

    #[test]
    fn core_cache_is_policy_agnostic() {
        let mut lru = LruCache::new(3);
        let mut lfu = LfuCache::new(3);
        fill(&mut lru, 5);
        fill(&mut lfu, 5);

        assert_eq!(CoreCache::len(&lru), 3);
        assert_eq!(CoreCache::len(&lfu), 3);
        assert_eq!(CoreCache::capacity(&lru), 3);
        assert!(!CoreCache::is_empty(&lfu));
        assert_eq!(CoreCache::try_get(&mut lru, &0), Err(CacheError::NotFound));
        assert_eq!(CoreCache::peek(&lfu, &4), Some(&40));

        CoreCache::clear(&mut lru);
        assert!(CoreCache::is_empty(&lru));
    }

    #[test]
    fn remove_batch_reports_each_key() {
        let mut cache = LruCache::new(4);
        fill(&mut cache, 3);
        let removed = MutableCache::remove_batch(&mut cache, &[0, 7, 2]);
        assert_eq!(removed, vec![Some(0), None, Some(20)]);
        assert_eq!(CoreCache::len(&cache), 1);
    }

    #[test]
    fn lru_trait_pops_in_recency_order() {
        let mut cache = LruCache::new(3);
        fill(&mut cache, 3);
        assert!(LruCacheTrait::touch(&mut cache, &0));
        assert_eq!(LruCacheTrait::peek_lru(&cache), Some((&1, &10)));
        assert_eq!(drain_lru(&mut cache), vec![1, 2, 0]);
    }

    #[test]
    fn lfu_trait_pops_in_frequency_order() {
        let mut cache = LfuCache::new(3);
        fill(&mut cache, 3);
        CoreCache::get(&mut cache, &0);
        CoreCache::get(&mut cache, &0);
        CoreCache::get(&mut cache, &1);
        assert_eq!(LfuCacheTrait::frequency(&cache, &0), Some(3));
        assert_eq!(LfuCacheTrait::peek_lfu(&cache), Some((&2, &20)));
        assert_eq!(drain_lfu(&mut cache), vec![2, 1, 0]);
    }
}
