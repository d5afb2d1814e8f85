//! Recency-ordered doubly linked list backed by `SlotArena`.
//!
//! Nodes live in a `SlotArena` and link to each other by `SlotId`, so an entry
//! can be spliced to the head or unlinked in O(1) given only its id.
//!
//! ```text
//!   head (MRU) ─► [id_2] ◄──► [id_0] ◄──► [id_1] ◄── tail (LRU, victim)
//! ```
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    value: T,
}

/// Doubly linked list ordered by last access; head is most recent.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the id at the head (most recently used).
    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the id at the tail (least recently used).
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts `value` at the head and returns its id.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            prev: None,
            next: self.head,
            value,
        });
        if let Some(head) = self.head {
            if let Some(node) = self.arena.get_mut(head) {
                node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Splices an existing node to the head; returns `false` if `id` is not live.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if Some(id) == self.head {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Removes and returns the tail value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks `id` and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Removes every node, yielding values in unspecified order.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.head = None;
        self.tail = None;
        self.arena.drain().map(|node| node.value)
    }

    /// Iterates values from head (MRU) to tail (LRU).
    pub fn iter(&self) -> RecencyListIter<'_, T> {
        RecencyListIter {
            list: self,
            current: self.head,
        }
    }

    /// Iterates ids from head to tail.
    pub fn iter_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        std::iter::successors(self.head, move |id| {
            self.arena.get(*id).and_then(|node| node.next)
        })
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_node) = self.arena.get_mut(prev_id) {
                prev_node.next = next;
            }
        } else {
            self.head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_node) = self.arena.get_mut(next_id) {
                next_node.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }

        Some(())
    }

    fn attach_front(&mut self, id: SlotId) -> Option<()> {
        let old_head = self.head;
        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = old_head;
        if let Some(old_head) = old_head {
            if let Some(head_node) = self.arena.get_mut(old_head) {
                head_node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        Some(())
    }

    /// Walks head → tail, reporting the first broken link.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.is_empty() {
                return Err(InvariantError::new(format!(
                    "recency list: head {:?} / tail {:?} with {} nodes",
                    self.head,
                    self.tail,
                    self.len()
                )));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            let node = self.arena.get(id).ok_or_else(|| {
                InvariantError::new(format!("recency list: stale SlotId {:?}", id))
            })?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "recency list: node {:?} prev pointer inconsistent",
                    id
                )));
            }
            prev = Some(id);
            current = node.next;
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("recency list has a cycle"));
            }
        }

        if self.tail != prev {
            return Err(InvariantError::new("recency list: tail does not match last node"));
        }
        if count != self.len() {
            return Err(InvariantError::new(format!(
                "recency list: counted {} but len = {}",
                count,
                self.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_links() {
            panic!("recency list invariant violated: {}", err);
        }
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over values from head to tail.
pub struct RecencyListIter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for RecencyListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &RecencyList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn recency_list_push_front_orders_mru_first() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");
        assert_eq!(values(&list), vec!["c", "b", "a"]);
        assert_eq!(list.back(), Some(&"a"));
        list.debug_validate_invariants();
    }

    #[test]
    fn recency_list_move_to_front_from_tail_middle_and_head() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        assert!(list.move_to_front(a));
        assert_eq!(values(&list), vec!["a", "c", "b"]);

        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec!["c", "a", "b"]);

        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec!["c", "a", "b"]);
        assert_eq!(list.back_id(), Some(b));
        assert_eq!(list.front_id(), Some(c));
        list.debug_validate_invariants();
    }

    #[test]
    fn recency_list_pop_back_returns_lru() {
        let mut list = RecencyList::new();
        list.push_front(1);
        list.push_front(2);
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn recency_list_remove_middle_and_ends() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(values(&list), vec!["c", "a"]);
        assert_eq!(list.remove(b), None);

        assert_eq!(list.remove(c), Some("c"));
        assert_eq!(list.front_id(), Some(a));
        assert_eq!(list.back_id(), Some(a));

        assert_eq!(list.remove(a), Some("a"));
        assert!(list.is_empty());
        assert_eq!(list.front_id(), None);
        assert!(!list.move_to_front(a));
    }

    #[test]
    fn recency_list_drain_and_clear_reset_links() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front(1);
        list.push_front(2);
        let mut drained: Vec<_> = list.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![1, 2]);
        assert!(list.is_empty());
        list.debug_validate_invariants();

        list.push_front(3);
        list.clear();
        assert_eq!(list.back(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn recency_list_iter_ids_matches_iter() {
        let mut list = RecencyList::new();
        let a = list.push_front(10);
        let b = list.push_front(20);
        assert_eq!(list.iter_ids().collect::<Vec<_>>(), vec![b, a]);
        if let Some(v) = list.get_mut(a) {
            *v = 11;
        }
        assert_eq!(list.get(a), Some(&11));
    }
}
