//! Unified cache builder for both eviction policies.
//!
//! Picks the policy at runtime and hides the listener's concrete type behind
//! [`BoxedListener`], so one [`Cache`] type covers every combination.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::<u64, String>::new(100).build(CachePolicy::Lru);
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```
//!
//! With an eviction listener:
//!
//! ```rust
//! use std::sync::mpsc;
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//! use evictkit::listener::EvictionReason;
//!
//! let (tx, rx) = mpsc::channel();
//! let mut cache = CacheBuilder::new(1)
//!     .listener(move |k: u32, _v: u32, r: EvictionReason| {
//!         let _ = tx.send((k, r));
//!     })
//!     .build(CachePolicy::Lfu);
//! cache.insert(1, 10);
//! cache.insert(2, 20);
//! assert_eq!(rx.try_recv(), Ok((1, EvictionReason::Capacity)));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{CacheError, InvariantError};
use crate::listener::{BoxedListener, EvictionListener, EvictionReason};
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::{CoreCache, MutableCache};

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction, ties broken by recency.
    Lfu,
}

/// Unified cache wrapper that provides a consistent API regardless of policy.
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V>
where
    K: Eq + Hash + Clone,
{
    Lru(LruCache<K, V, BoxedListener<K, V>>),
    Lfu(LfuCache<K, V, BoxedListener<K, V>>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::Lfu(_) => CachePolicy::Lfu,
        }
    }

    /// Insert a key-value pair. Returns the previous value if the key existed
    /// and no listener took it.
    #[doc(alias = "set")]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.insert(key, value),
            CacheInner::Lfu(lfu) => lfu.insert(key, value),
        }
    }

    /// Get a reference to a value by key, recording the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::Lfu(lfu) => lfu.get(key),
        }
    }

    pub fn try_get(&mut self, key: &K) -> Result<&V, CacheError> {
        self.get(key).ok_or(CacheError::NotFound)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.get_mut(key),
            CacheInner::Lfu(lfu) => lfu.get_mut(key),
        }
    }

    /// Read a value without recording the access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.peek(key),
            CacheInner::Lfu(lfu) => lfu.peek(key),
        }
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.contains(key),
            CacheInner::Lfu(lfu) => lfu.contains(key),
        }
    }

    /// Remove a key, returning its value. The listener is not called.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.remove(key),
            CacheInner::Lfu(lfu) => lfu.remove(key),
        }
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::Lfu(lfu) => lfu.len(),
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the maximum capacity.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::Lfu(lfu) => lfu.capacity(),
        }
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::Lfu(lfu) => lfu.clear(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.check_invariants(),
            CacheInner::Lfu(lfu) => lfu.check_invariants(),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            CacheInner::Lru(lru) => f.debug_tuple("Cache").field(lru).finish(),
            CacheInner::Lfu(lfu) => f.debug_tuple("Cache").field(lfu).finish(),
        }
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Cache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        Cache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        Cache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }

    fn clear(&mut self) {
        Cache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        Cache::remove(self, key)
    }
}

/// Builder for creating cache instances.
pub struct CacheBuilder<K, V> {
    capacity: usize,
    listener: Option<BoxedListener<K, V>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: 'static,
{
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            listener: None,
        }
    }

    /// Install an eviction listener. Replaces any listener set earlier.
    pub fn listener<L>(mut self, mut listener: L) -> Self
    where
        L: EvictionListener<K, V> + 'static,
    {
        self.listener = Some(Box::new(move |key: K, value: V, reason: EvictionReason| {
            listener.on_evict(key, value, reason)
        }));
        self
    }

    /// Build a cache with the specified policy.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero. Use [`try_build`](Self::try_build)
    /// when the capacity comes from user input.
    pub fn build(self, policy: CachePolicy) -> Cache<K, V> {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Build a cache with the specified policy, rejecting a zero capacity.
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, CachePolicy};
    /// use evictkit::error::CacheError;
    ///
    /// let err = CacheBuilder::<u64, u64>::new(0).try_build(CachePolicy::Lfu).unwrap_err();
    /// assert_eq!(err, CacheError::InvalidCapacity { capacity: 0 });
    /// ```
    pub fn try_build(self, policy: CachePolicy) -> Result<Cache<K, V>, CacheError> {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(LruCache::from_parts(self.capacity, self.listener)?),
            CachePolicy::Lfu => CacheInner::Lfu(LfuCache::from_parts(self.capacity, self.listener)?),
        };

        Ok(Cache { inner })
    }
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("capacity", &self.capacity)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
