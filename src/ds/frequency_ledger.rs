//! Frequency-bucketed entry storage for O(1) LFU eviction.
//!
//! Every live entry sits in exactly one bucket whose frequency equals the
//! entry's own access count. Buckets are doubly linked in ascending frequency
//! order and `min_freq` names the lowest one, so the victim is always the tail
//! of that bucket.
//!
//! ## Architecture
//!
//! ```text
//!   entries: SlotArena<Entry<T>>          buckets: FxHashMap<u64, Bucket>
//!   ┌──────┬──────────────────────┐
//!   │ id_0 │ freq:3, prev/next, T │       min_freq = 1
//!   │ id_1 │ freq:1, prev/next, T │            │
//!   │ id_2 │ freq:1, prev/next, T │            ▼
//!   └──────┴──────────────────────┘       freq=1: head ─► [id_2] ◄──► [id_1] ◄── tail
//!                                                 │ next
//!                                                 ▼
//!                                         freq=3: head ─► [id_0] ◄── tail
//! ```
//!
//! Touch flow (`touch(id)`):
//!
//! 1. unlink `id` from its bucket at `f`
//! 2. if bucket `f` is now empty, unlink and drop it; advance `min_freq` if it
//!    was the minimum
//! 3. create bucket `f + 1` right after `f` (or after `f`'s predecessor when `f`
//!    was dropped) unless it already exists
//! 4. push `id` to the head of bucket `f + 1`
//!
//! Within a bucket the head is the most recent arrival, so popping the tail of
//! the minimum bucket breaks frequency ties by least recent use.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// Default bucket pre-allocation. Most entries cluster at low frequencies.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

#[derive(Debug)]
struct Entry<T> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Entries grouped into per-frequency recency lists.
#[derive(Debug)]
pub struct FrequencyLedger<T> {
    entries: SlotArena<Entry<T>>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<T> FrequencyLedger<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            buckets: FxHashMap::with_capacity_and_hasher(
                DEFAULT_BUCKET_PREALLOC.min(capacity.max(1)),
                Default::default(),
            ),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.entries.contains(id)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.entries.get(id).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.entries.get_mut(id).map(|entry| &mut entry.value)
    }

    #[inline]
    pub fn frequency(&self, id: SlotId) -> Option<u64> {
        self.entries.get(id).map(|entry| entry.freq)
    }

    /// Returns the lowest frequency present, `None` when empty.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Number of distinct frequencies currently held.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries at exactly `freq`.
    pub fn bucket_len(&self, freq: u64) -> usize {
        self.buckets.get(&freq).map(|bucket| bucket.len).unwrap_or(0)
    }

    /// Id of the eviction victim: tail of the minimum bucket.
    pub fn peek_min_id(&self) -> Option<SlotId> {
        if self.min_freq == 0 {
            return None;
        }
        self.buckets.get(&self.min_freq)?.tail
    }

    pub fn peek_min(&self) -> Option<(&T, u64)> {
        let id = self.peek_min_id()?;
        let entry = self.entries.get(id)?;
        Some((&entry.value, entry.freq))
    }

    /// Stores `value` at frequency 1, at the head of that bucket.
    pub fn insert(&mut self, value: T) -> SlotId {
        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            freq: 1,
            value,
        });

        if !self.buckets.contains_key(&1) {
            let next = self.min_freq();
            self.insert_bucket(1, None, next);
        }
        self.list_push_front(1, id);
        self.min_freq = 1;
        id
    }

    /// Increments the frequency of `id` and returns the new count.
    ///
    /// An entry already at `u64::MAX` only moves to the head of its bucket.
    pub fn touch(&mut self, id: SlotId) -> Option<u64> {
        let current_freq = self.entries.get(id)?.freq;
        if current_freq == u64::MAX {
            self.list_remove(current_freq, id)?;
            self.list_push_front(current_freq, id);
            return Some(current_freq);
        }
        let next_freq = current_freq + 1;

        let (prev_freq, next_existing) = {
            let bucket = self.buckets.get(&current_freq)?;
            (bucket.prev, bucket.next)
        };

        self.list_remove(current_freq, id)?;
        let bucket_empty = self.bucket_len(current_freq) == 0;
        if bucket_empty {
            self.unlink_bucket(current_freq, prev_freq, next_existing);
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if bucket_empty {
                prev_freq
            } else {
                Some(current_freq)
            };
            self.insert_bucket(next_freq, prev, next_existing);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = next_freq;
        }
        self.list_push_front(next_freq, id);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }

        Some(next_freq)
    }

    /// Removes `id`, returning its value and final frequency.
    pub fn remove(&mut self, id: SlotId) -> Option<(T, u64)> {
        let freq = self.entries.get(id)?.freq;
        self.list_remove(freq, id)?;
        if self.bucket_len(freq) == 0 {
            let (prev, next) = {
                let bucket = self.buckets.get(&freq)?;
                (bucket.prev, bucket.next)
            };
            self.unlink_bucket(freq, prev, next);
        }
        self.entries.remove(id).map(|entry| (entry.value, entry.freq))
    }

    /// Removes the victim (tail of the minimum bucket).
    pub fn pop_min(&mut self) -> Option<(T, u64)> {
        let id = self.peek_min_id()?;
        self.remove(id)
    }

    /// Iterates one bucket from head (most recent) to tail.
    pub fn iter_bucket(&self, freq: u64) -> BucketIter<'_, T> {
        BucketIter {
            ledger: self,
            current: self.buckets.get(&freq).and_then(|bucket| bucket.head),
        }
    }

    /// Iterates frequencies present, ascending.
    pub fn frequencies(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(self.min_freq(), move |freq| {
            self.buckets.get(freq).and_then(|bucket| bucket.next)
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Removes every entry, yielding `(value, freq)` in unspecified order.
    pub fn drain(&mut self) -> impl Iterator<Item = (T, u64)> + '_ {
        self.buckets.clear();
        self.min_freq = 0;
        self.entries.drain().map(|entry| (entry.value, entry.freq))
    }

    /// Walks every bucket and entry, reporting the first broken link.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        if self.is_empty() {
            if !self.buckets.is_empty() || self.min_freq != 0 {
                return Err(InvariantError::new(format!(
                    "empty ledger still holds {} buckets (min_freq {})",
                    self.buckets.len(),
                    self.min_freq
                )));
            }
            return Ok(());
        }

        let min = self.buckets.get(&self.min_freq).ok_or_else(|| {
            InvariantError::new(format!("min_freq {} has no bucket", self.min_freq))
        })?;
        if min.prev.is_some() {
            return Err(InvariantError::new(format!(
                "min bucket {} has a predecessor",
                self.min_freq
            )));
        }

        let mut seen_buckets = 0usize;
        let mut seen_entries = 0usize;
        let mut last_freq = 0u64;
        for freq in self.frequencies() {
            if seen_buckets == self.buckets.len() {
                return Err(InvariantError::new("bucket chain has a cycle"));
            }
            let bucket = self
                .buckets
                .get(&freq)
                .ok_or_else(|| InvariantError::new(format!("dangling bucket link {}", freq)))?;
            if freq <= last_freq {
                return Err(InvariantError::new(format!(
                    "bucket {} follows {} out of order",
                    freq, last_freq
                )));
            }
            if bucket.len == 0 {
                return Err(InvariantError::new(format!("bucket {} is empty", freq)));
            }

            let mut count = 0usize;
            let mut prev = None;
            let mut current = bucket.head;
            while let Some(id) = current {
                let entry = self.entries.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {}: stale SlotId {:?}", freq, id))
                })?;
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "entry {:?} has freq {} but sits in bucket {}",
                        id, entry.freq, freq
                    )));
                }
                if entry.prev != prev {
                    return Err(InvariantError::new(format!(
                        "bucket {}: entry {:?} prev pointer inconsistent",
                        freq, id
                    )));
                }
                prev = Some(id);
                current = entry.next;
                count += 1;
                if count > self.len() {
                    return Err(InvariantError::new(format!("bucket {} has a cycle", freq)));
                }
            }
            if bucket.tail != prev {
                return Err(InvariantError::new(format!(
                    "bucket {}: tail does not match last entry",
                    freq
                )));
            }
            if count != bucket.len {
                return Err(InvariantError::new(format!(
                    "bucket {}: counted {} but len = {}",
                    freq, count, bucket.len
                )));
            }

            last_freq = freq;
            seen_buckets += 1;
            seen_entries += count;
        }

        if seen_buckets != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "{} buckets reachable from min_freq, {} stored",
                seen_buckets,
                self.buckets.len()
            )));
        }
        if seen_entries != self.len() {
            return Err(InvariantError::new(format!(
                "{} entries linked, {} stored",
                seen_entries,
                self.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_links() {
            panic!("frequency ledger invariant violated: {}", err);
        }
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                len: 0,
                prev,
                next,
            },
        );

        if let Some(prev) = prev {
            if let Some(prev_bucket) = self.buckets.get_mut(&prev) {
                prev_bucket.next = Some(freq);
            }
        }
        if let Some(next) = next {
            if let Some(next_bucket) = self.buckets.get_mut(&next) {
                next_bucket.prev = Some(freq);
            }
        }
    }

    fn unlink_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev) = prev {
            if let Some(prev_bucket) = self.buckets.get_mut(&prev) {
                prev_bucket.next = next;
            }
        }
        if let Some(next) = next {
            if let Some(next_bucket) = self.buckets.get_mut(&next) {
                next_bucket.prev = prev;
            }
        }
        self.buckets.remove(&freq);
        if self.min_freq == freq {
            self.min_freq = next.unwrap_or(0);
        }
    }

    fn list_push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            debug_assert!(false, "bucket {} missing", freq);
            return;
        };

        let old_head = bucket.head;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        if let Some(old_head) = old_head {
            if let Some(entry) = self.entries.get_mut(old_head) {
                entry.prev = Some(id);
            }
        } else {
            bucket.tail = Some(id);
        }
        bucket.head = Some(id);
        bucket.len += 1;
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = self.entries.get(id)?;
            (entry.prev, entry.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        if let Some(prev) = prev {
            if let Some(entry) = self.entries.get_mut(prev) {
                entry.next = next;
            }
        } else {
            bucket.head = next;
        }
        if let Some(next) = next {
            if let Some(entry) = self.entries.get_mut(next) {
                entry.prev = prev;
            }
        } else {
            bucket.tail = prev;
        }
        bucket.len = bucket.len.saturating_sub(1);

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }

        Some(())
    }
}

impl<T> Default for FrequencyLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over one bucket's values, most recent first.
pub struct BucketIter<'a, T> {
    ledger: &'a FrequencyLedger<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for BucketIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.ledger.entries.get(id)?;
        self.current = entry.next;
        Some(&entry.value)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        /// Property: links and bucket membership hold after any op sequence
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_always_hold(
            ops in prop::collection::vec((0u8..4, 0usize..32), 0..200)
        ) {
            let mut ledger: FrequencyLedger<u32> = FrequencyLedger::new();
            let mut live: Vec<SlotId> = Vec::new();
            let mut value = 0u32;

            for (op, pick) in ops {
                match op {
                    0 => {
                        live.push(ledger.insert(value));
                        value += 1;
                    }
                    1 if !live.is_empty() => {
                        ledger.touch(live[pick % live.len()]);
                    }
                    2 if !live.is_empty() => {
                        let id = live.swap_remove(pick % live.len());
                        prop_assert!(ledger.remove(id).is_some());
                    }
                    3 => {
                        if let Some(id) = ledger.peek_min_id() {
                            live.retain(|l| *l != id);
                            prop_assert!(ledger.pop_min().is_some());
                        }
                    }
                    _ => {}
                }
                prop_assert!(ledger.check_links().is_ok());
                prop_assert_eq!(ledger.len(), live.len());
            }
        }

        /// Property: the victim always has the minimum frequency
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_pop_min_returns_lowest_frequency(
            touches in prop::collection::vec(0usize..8, 0..64)
        ) {
            let mut ledger: FrequencyLedger<usize> = FrequencyLedger::new();
            let ids: Vec<SlotId> = (0..8).map(|i| ledger.insert(i)).collect();
            let mut freqs: HashMap<usize, u64> = (0..8).map(|i| (i, 1)).collect();

            for t in touches {
                ledger.touch(ids[t]);
                *freqs.get_mut(&t).unwrap() += 1;
            }

            while let Some((value, freq)) = ledger.pop_min() {
                let lowest = *freqs.values().min().unwrap();
                prop_assert_eq!(freq, lowest);
                prop_assert_eq!(freqs.remove(&value), Some(freq));
            }
            prop_assert!(freqs.is_empty());
        }
    }
}
