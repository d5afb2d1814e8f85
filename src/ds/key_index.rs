//! Key → slot mirror of the live entries.
//!
//! `KeyIndex` owns no entries. It only records which keys are live and which
//! [`SlotId`] holds each one, so the facades can reach an entry in the ordering
//! structure without traversal.

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::SlotId;

#[derive(Debug)]
pub struct KeyIndex<K> {
    map: FxHashMap<K, SlotId>,
}

impl<K> KeyIndex<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn lookup<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.get(key).copied()
    }

    /// Records `key` at `id`, returning the slot it previously mapped to.
    #[inline]
    pub fn insert(&mut self, key: K, id: SlotId) -> Option<SlotId> {
        self.map.insert(key, id)
    }

    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.remove(key)
    }

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, SlotId)> {
        self.map.iter().map(|(key, id)| (key, *id))
    }
}

impl<K> Default for KeyIndex<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_index_lookup_insert_remove() {
        let mut index = KeyIndex::new();
        assert_eq!(index.lookup("a"), None);

        assert_eq!(index.insert("a", SlotId(3)), None);
        assert_eq!(index.lookup("a"), Some(SlotId(3)));
        assert!(index.contains("a"));
        assert_eq!(index.len(), 1);

        assert_eq!(index.insert("a", SlotId(5)), Some(SlotId(3)));
        assert_eq!(index.len(), 1);

        assert_eq!(index.remove("a"), Some(SlotId(5)));
        assert_eq!(index.remove("a"), None);
        assert!(index.is_empty());
    }

    #[test]
    fn key_index_borrowed_lookup() {
        let mut index = KeyIndex::with_capacity(2);
        index.insert("hello".to_string(), SlotId(0));
        assert_eq!(index.lookup("hello"), Some(SlotId(0)));
        assert!(!index.contains("world"));
        index.clear();
        assert!(index.is_empty());
    }
}
