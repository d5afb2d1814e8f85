//! # LRU (Least Recently Used) Cache
//!
//! Fixed-capacity cache that evicts the entry whose last access is oldest.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        LruCache<K, V, L>                             │
//!   │                                                                      │
//!   │   index: KeyIndex<K>                 list: RecencyList<Entry<K, V>>  │
//!   │   ┌─────────┬────────┐                                               │
//!   │   │   Key   │ SlotId │    head (MRU)                   tail (LRU)    │
//!   │   ├─────────┼────────┤       │                             │         │
//!   │   │ "img_a" │  id_2  │──►  [id_2] ◄──► [id_0] ◄──► [id_1]  ◄┘         │
//!   │   │ "img_b" │  id_0  │                                               │
//!   │   │ "img_c" │  id_1  │    victim = tail                              │
//!   │   └─────────┴────────┘                                               │
//!   │                                                                      │
//!   │   capacity: usize (fixed)        listener: Option<L>                 │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method         | Complexity | Effect on order                          |
//! |----------------|------------|------------------------------------------|
//! | `get(&k)`      | O(1)       | hit moves to head                        |
//! | `insert(k, v)` | O(1)       | new/updated entry at head, tail evicted  |
//! | `peek(&k)`     | O(1)       | none                                     |
//! | `contains(&k)` | O(1)       | none                                     |
//! | `remove(&k)`   | O(1)       | unlinks, returns value, no listener call |
//! | `pop_lru()`    | O(1)       | unlinks tail, returns it                 |
//!
//! ## Listener contract
//!
//! - Capacity victims reach the listener with [`EvictionReason::Capacity`]
//!   before the new entry is linked, so `len() <= capacity()` always holds.
//! - Overwriting a key hands the old value over with
//!   [`EvictionReason::Replaced`]. Without a listener, `insert` returns it.
//! - `clear()` and `Drop` hand over every live entry.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3); // evicts "b"
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```
//!
//! ## Thread Safety
//!
//! `get` reorders the list, so even reads need exclusive access. Share a cache
//! across threads behind a `Mutex`/`RwLock` write guard.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::key_index::KeyIndex;
use crate::ds::recency_list::RecencyList;
use crate::error::{CacheError, InvariantError};
use crate::listener::{EvictionListener, EvictionReason, NoListener};
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Fixed-capacity LRU cache. See module-level documentation for details.
pub struct LruCache<K, V, L = NoListener>
where
    L: EvictionListener<K, V>,
{
    index: KeyIndex<K>,
    list: RecencyList<Entry<K, V>>,
    capacity: usize,
    listener: Option<L>,
}

impl<K, V> LruCache<K, V, NoListener>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) for
    /// user-supplied capacities.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, CacheError> {
        Self::from_parts(capacity, None)
    }
}

impl<K, V, L> LruCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    /// Creates a cache that reports dropped entries to `listener`.
    ///
    /// A listener whose [`EvictionListener::is_noop`] is `true` is not
    /// installed, so the cache behaves like one built with `new`.
    pub fn with_listener(capacity: usize, listener: L) -> Result<Self, CacheError> {
        Self::from_parts(capacity, Some(listener))
    }

    pub(crate) fn from_parts(capacity: usize, listener: Option<L>) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity { capacity });
        }
        let listener = listener.filter(|l| !l.is_noop());
        debug!(capacity, listener = listener.is_some(), "lru cache created");
        Ok(Self {
            index: KeyIndex::with_capacity(capacity),
            list: RecencyList::with_capacity(capacity),
            capacity,
            listener,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    pub fn listener_mut(&mut self) -> Option<&mut L> {
        self.listener.as_mut()
    }

    /// Returns `true` if `key` is live. Does not touch recency.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains(key)
    }

    /// Reads a value without marking it as used.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Reads a value and moves it to the most-recent position.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get), but a miss is [`CacheError::NotFound`].
    pub fn try_get<Q>(&mut self, key: &Q) -> Result<&V, CacheError>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get(key).ok_or(CacheError::NotFound)
    }

    /// Mutable access to a value; a hit counts as a use.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.list.move_to_front(id);
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Stores `value` under `key` at the most-recent position.
    ///
    /// A new key arriving at capacity first evicts the least recently used
    /// entry. Overwriting an existing key hands the old value to the listener,
    /// or returns it when no listener is installed.
    #[doc(alias = "set")]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.index.lookup(&key) {
            self.list.move_to_front(id);
            let entry = self.list.get_mut(id)?;
            let old = std::mem::replace(&mut entry.value, value);
            return self.hand_back(key, old);
        }

        if self.index.len() >= self.capacity {
            self.evict_one();
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    /// Removes `key` and returns its value. The listener is not called.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Marks `key` as used without reading it.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.index.lookup(key) {
            Some(id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Removes the least recently used entry and returns it to the caller.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// The entry the next eviction would pick.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Drops every entry, handing each to the listener.
    pub fn clear(&mut self) {
        self.index.clear();
        let drained = self.list.drain();
        match self.listener.as_mut() {
            Some(listener) => {
                let mut count = 0usize;
                for entry in drained {
                    listener.on_evict(entry.key, entry.value, EvictionReason::Cleared);
                    count += 1;
                }
                debug!(count, "lru cache cleared");
            },
            None => drop(drained),
        }
    }

    /// Cross-checks the key index against the recency list.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        self.list.check_links()?;
        for (key, id) in self.index.iter() {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "slot {:?} holds a different key",
                        id
                    )))
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index points at empty slot {:?}",
                        id
                    )))
                },
            }
        }
        Ok(())
    }

    fn evict_one(&mut self) {
        let Some(entry) = self.list.pop_back() else {
            return;
        };
        self.index.remove(&entry.key);
        trace!(capacity = self.capacity, "lru eviction");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_evict(entry.key, entry.value, EvictionReason::Capacity);
        }
    }

    fn hand_back(&mut self, key: K, old: V) -> Option<V> {
        match self.listener.as_mut() {
            Some(listener) => {
                trace!("lru overwrite");
                listener.on_evict(key, old, EvictionReason::Replaced);
                None
            },
            None => Some(old),
        }
    }

    #[cfg(test)]
    fn slot_of(&self, key: &K) -> Option<crate::ds::slot_arena::SlotId> {
        self.index.lookup(key)
    }
}

impl<K, V, L> Drop for LruCache<K, V, L>
where
    L: EvictionListener<K, V>,
{
    fn drop(&mut self) {
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        let mut count = 0usize;
        for entry in self.list.drain() {
            listener.on_evict(entry.key, entry.value, EvictionReason::Teardown);
            count += 1;
        }
        debug!(count, "lru cache torn down");
    }
}

impl<K, V, L> fmt::Debug for LruCache<K, V, L>
where
    L: EvictionListener<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<K, V, L> CoreCache<K, V> for LruCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        LruCache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

impl<K, V, L> MutableCache<K, V> for LruCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V, L> LruCacheTrait<K, V> for LruCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }
}
