//! # LFU (Least Frequently Used) Cache
//!
//! Fixed-capacity cache that evicts the entry with the fewest accesses,
//! breaking ties by least recent use.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        LfuCache<K, V, L>                             │
//!   │                                                                      │
//!   │   index: KeyIndex<K>        ledger: FrequencyLedger<Entry<K, V>>     │
//!   │   ┌─────────┬────────┐                                               │
//!   │   │   Key   │ SlotId │      min_freq ─► freq=1: [D] ◄──► [A] ◄ victim│
//!   │   ├─────────┼────────┤                    │                          │
//!   │   │   "A"   │  id_0  │                    ▼                          │
//!   │   │   "B"   │  id_1  │                  freq=2: [C]                  │
//!   │   │   "C"   │  id_2  │                    │                          │
//!   │   │   "D"   │  id_3  │                    ▼                          │
//!   │   └─────────┴────────┘                  freq=3: [B]                  │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frequency rules
//!
//! - A new key starts at frequency 1, at the head of bucket 1.
//! - `get`, `get_mut`, `touch`, and overwriting `insert` each add 1.
//! - `peek` and `contains` leave the count alone.
//! - Counts saturate at `u64::MAX`; a saturated entry still refreshes its
//!   position inside its bucket.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(3);
//! cache.insert("A", 1);
//! cache.insert("B", 2);
//! cache.insert("C", 3);
//! cache.get(&"B");
//! cache.get(&"B");
//! cache.get(&"C");
//!
//! cache.insert("D", 4); // "A" has the lowest count
//! assert!(!cache.contains(&"A"));
//! assert_eq!(cache.frequency(&"B"), Some(3));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::frequency_ledger::FrequencyLedger;
use crate::ds::key_index::KeyIndex;
use crate::error::{CacheError, InvariantError};
use crate::listener::{EvictionListener, EvictionReason, NoListener};
use crate::traits::{CoreCache, LfuCacheTrait, MutableCache};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Fixed-capacity LFU cache. See module-level documentation for details.
pub struct LfuCache<K, V, L = NoListener>
where
    L: EvictionListener<K, V>,
{
    index: KeyIndex<K>,
    ledger: FrequencyLedger<Entry<K, V>>,
    capacity: usize,
    listener: Option<L>,
}

impl<K, V> LfuCache<K, V, NoListener>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, CacheError> {
        Self::from_parts(capacity, None)
    }
}

impl<K, V, L> LfuCache<K, V, L>
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
        debug!(capacity, listener = listener.is_some(), "lfu cache created");
        Ok(Self {
            index: KeyIndex::with_capacity(capacity),
            ledger: FrequencyLedger::with_capacity(capacity),
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

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains(key)
    }

    /// Reads a value without counting an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.ledger.get(id).map(|entry| &entry.value)
    }

    /// Reads a value and counts one access.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.ledger.touch(id);
        self.ledger.get(id).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get), but a miss is [`CacheError::NotFound`].
    pub fn try_get<Q>(&mut self, key: &Q) -> Result<&V, CacheError>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get(key).ok_or(CacheError::NotFound)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.ledger.touch(id);
        self.ledger.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Access count of `key`, if live.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.ledger.frequency(id)
    }

    /// Lowest access count among live entries.
    pub fn min_frequency(&self) -> Option<u64> {
        self.ledger.min_freq()
    }

    /// Stores `value` under `key`.
    ///
    /// A new key enters at frequency 1, evicting the least frequently used
    /// entry first when the cache is full. Overwriting an existing key counts
    /// as an access and hands the old value to the listener, or returns it
    /// when no listener is installed.
    #[doc(alias = "set")]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.index.lookup(&key) {
            self.ledger.touch(id);
            let entry = self.ledger.get_mut(id)?;
            let old = std::mem::replace(&mut entry.value, value);
            return self.hand_back(key, old);
        }

        if self.index.len() >= self.capacity {
            self.evict_one();
        }

        let id = self.ledger.insert(Entry {
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
        self.ledger.remove(id).map(|(entry, _)| entry.value)
    }

    /// Counts an access without reading the value.
    pub fn touch<Q>(&mut self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let id = self.index.lookup(key)?;
        self.ledger.touch(id)
    }

    /// Removes the current victim and returns it to the caller.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let (entry, _) = self.ledger.pop_min()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// The entry the next eviction would pick, with its count.
    pub fn peek_lfu(&self) -> Option<(&K, &V, u64)> {
        self.ledger
            .peek_min()
            .map(|(entry, freq)| (&entry.key, &entry.value, freq))
    }

    /// Iterates entries by ascending frequency; most recent first within a
    /// frequency.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.ledger
            .frequencies()
            .flat_map(move |freq| self.ledger.iter_bucket(freq))
            .map(|entry| (&entry.key, &entry.value))
    }

    /// Drops every entry, handing each to the listener.
    pub fn clear(&mut self) {
        self.index.clear();
        let drained = self.ledger.drain();
        match self.listener.as_mut() {
            Some(listener) => {
                let mut count = 0usize;
                for (entry, _) in drained {
                    listener.on_evict(entry.key, entry.value, EvictionReason::Cleared);
                    count += 1;
                }
                debug!(count, "lfu cache cleared");
            },
            None => drop(drained),
        }
    }

    /// Cross-checks the key index against the frequency ledger.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.ledger.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but ledger holds {} entries",
                self.index.len(),
                self.ledger.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        self.ledger.check_links()?;
        for (key, id) in self.index.iter() {
            let entry = self.ledger.get(id).ok_or_else(|| {
                InvariantError::new(format!("index points at empty slot {:?}", id))
            })?;
            if entry.key != *key {
                return Err(InvariantError::new(format!(
                    "slot {:?} holds a different key",
                    id
                )));
            }
        }
        Ok(())
    }

    fn evict_one(&mut self) {
        let Some((entry, freq)) = self.ledger.pop_min() else {
            return;
        };
        self.index.remove(&entry.key);
        trace!(freq, capacity = self.capacity, "lfu eviction");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_evict(entry.key, entry.value, EvictionReason::Capacity);
        }
    }

    fn hand_back(&mut self, key: K, old: V) -> Option<V> {
        match self.listener.as_mut() {
            Some(listener) => {
                trace!("lfu overwrite");
                listener.on_evict(key, old, EvictionReason::Replaced);
                None
            },
            None => Some(old),
        }
    }
}

impl<K, V, L> Drop for LfuCache<K, V, L>
where
    L: EvictionListener<K, V>,
{
    fn drop(&mut self) {
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        let mut count = 0usize;
        for (entry, _) in self.ledger.drain() {
            listener.on_evict(entry.key, entry.value, EvictionReason::Teardown);
            count += 1;
        }
        debug!(count, "lfu cache torn down");
    }
}

impl<K, V, L> fmt::Debug for LfuCache<K, V, L>
where
    L: EvictionListener<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.ledger.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.ledger.min_freq())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<K, V, L> CoreCache<K, V> for LfuCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LfuCache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        LfuCache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }
}

impl<K, V, L> MutableCache<K, V> for LfuCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LfuCache::remove(self, key)
    }
}

impl<K, V, L> LfuCacheTrait<K, V> for LfuCache<K, V, L>
where
    K: Eq + Hash + Clone,
    L: EvictionListener<K, V>,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        LfuCache::pop_lfu(self)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        LfuCache::peek_lfu(self).map(|(k, v, _)| (k, v))
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        LfuCache::frequency(self, key)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Reference model: (key, value, freq, last_use_tick)
    struct Model {
        capacity: usize,
        tick: u64,
        entries: Vec<(u8, u16, u64, u64)>,
    }

    impl Model {
        fn bump(&mut self, pos: usize) {
            self.tick += 1;
            self.entries[pos].2 += 1;
            self.entries[pos].3 = self.tick;
        }

        fn victim(&self) -> Option<usize> {
            (0..self.entries.len()).min_by_key(|&i| (self.entries[i].2, self.entries[i].3))
        }
    }

    proptest! {
        /// Property: eviction always picks the lowest (frequency, last use)
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..6,
            ops in prop::collection::vec((0u8..3, 0u8..10, any::<u16>()), 0..200)
        ) {
            let mut cache: LfuCache<u8, u16> = LfuCache::new(capacity);
            let mut model = Model { capacity, tick: 0, entries: Vec::new() };

            for (op, key, value) in ops {
                let pos = model.entries.iter().position(|e| e.0 == key);
                match op {
                    0 => {
                        let old = cache.insert(key, value);
                        match pos {
                            Some(pos) => {
                                prop_assert_eq!(old, Some(model.entries[pos].1));
                                model.entries[pos].1 = value;
                                model.bump(pos);
                            }
                            None => {
                                prop_assert_eq!(old, None);
                                if model.entries.len() == model.capacity {
                                    let victim = model.victim().unwrap();
                                    let (vk, ..) = model.entries.remove(victim);
                                    prop_assert!(!cache.contains(&vk));
                                }
                                model.tick += 1;
                                model.entries.push((key, value, 1, model.tick));
                            }
                        }
                    }
                    1 => {
                        let got = cache.get(&key).copied();
                        match pos {
                            Some(pos) => {
                                prop_assert_eq!(got, Some(model.entries[pos].1));
                                model.bump(pos);
                            }
                            None => prop_assert_eq!(got, None),
                        }
                    }
                    _ => {
                        let removed = cache.remove(&key);
                        let expected = pos.map(|pos| model.entries.remove(pos).1);
                        prop_assert_eq!(removed, expected);
                    }
                }

                prop_assert_eq!(cache.len(), model.entries.len());
                prop_assert!(cache.check_invariants().is_ok());
                for (k, v, f, _) in &model.entries {
                    prop_assert_eq!(cache.peek(k), Some(v));
                    prop_assert_eq!(cache.frequency(k), Some(*f));
                }
                let expected_min = model.entries.iter().map(|e| e.2).min();
                prop_assert_eq!(cache.min_frequency(), expected_min);
            }
        }
    }
}
