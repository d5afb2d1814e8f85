//! Stable-index storage shared by the ordering structures.
//!
//! Entries are addressed by [`SlotId`] rather than by pointer. A freed slot is
//! recycled by the next insert, so ids are only meaningful while the entry they
//! name is live.

/// Stable handle to an occupied slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    /// Link to the next vacant slot.
    Vacant(Option<usize>),
}

/// Arena whose vacant slots form an intrusive LIFO chain, so the most recently
/// freed slot is the next one reused.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        let Some(idx) = self.free_head else {
            self.slots.push(Slot::Occupied(value));
            return SlotId(self.slots.len() - 1);
        };
        match std::mem::replace(&mut self.slots[idx], Slot::Occupied(value)) {
            Slot::Vacant(next) => self.free_head = next,
            Slot::Occupied(_) => debug_assert!(false, "free chain points at live slot {}", idx),
        }
        SlotId(idx)
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant(_)) {
            return None;
        }
        let Slot::Occupied(value) = std::mem::replace(slot, Slot::Vacant(self.free_head)) else {
            return None;
        };
        self.free_head = Some(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every stored value and forgets all slots.
    pub fn clear(&mut self) {
        self.drain().for_each(drop);
    }

    /// Removes every stored value, yielding them in slot order.
    ///
    /// The arena is empty afterwards even if the iterator is dropped early.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.free_head = None;
        self.len = 0;
        self.slots.drain(..).filter_map(|slot| match slot {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| match slot {
            Slot::Occupied(value) => Some((SlotId(idx), value)),
            Slot::Vacant(_) => None,
        })
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_arena_insert_remove_reuse() {
        let mut arena = SlotArena::new();
        let id1 = arena.insert("a");
        let id2 = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id1), Some(&"a"));
        assert_eq!(arena.get(id2), Some(&"b"));

        assert_eq!(arena.remove(id1), Some("a"));
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(id1));

        let id3 = arena.insert("c");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id3), Some(&"c"));
        assert_eq!(id1.index(), id3.index());
    }

    #[test]
    fn slot_arena_double_remove_is_none() {
        let mut arena = SlotArena::new();
        let id = arena.insert(7);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn slot_arena_get_mut_updates_value() {
        let mut arena = SlotArena::with_capacity(4);
        let id = arena.insert(1);
        if let Some(value) = arena.get_mut(id) {
            *value = 2;
        }
        assert_eq!(arena.get(id), Some(&2));
    }

    #[test]
    fn slot_arena_reuses_most_recently_freed_first() {
        let mut arena = SlotArena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');
        let c = arena.insert('c');
        arena.remove(a);
        arena.remove(c);

        assert_eq!(arena.insert('x'), c);
        assert_eq!(arena.insert('y'), a);
        assert_eq!(arena.insert('z').index(), 3);
        assert_eq!(arena.get(b), Some(&'b'));
        assert_eq!(arena.len(), 4);
        let live: Vec<char> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(live, vec!['y', 'b', 'x', 'z']);
    }

    #[test]
    fn slot_arena_clear_resets_free_chain() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1);
        arena.insert(2);
        arena.remove(a);
        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert_eq!(arena.insert(3).index(), 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn slot_arena_drain_empties_and_skips_holes() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1);
        arena.insert(2);
        arena.insert(3);
        arena.remove(a);

        let mut drained: Vec<_> = arena.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![2, 3]);
        assert!(arena.is_empty());
        assert_eq!(arena.iter().count(), 0);

        let id = arena.insert(9);
        assert_eq!(id.index(), 0);
    }
}
