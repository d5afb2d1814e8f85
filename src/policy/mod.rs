//! Eviction policies.
//!
//! | Policy | Victim                                   | Type                  |
//! |--------|------------------------------------------|-----------------------|
//! | LRU    | least recently used entry                | [`lru::LruCache`]     |
//! | LFU    | fewest accesses, then least recently used | [`lfu::LfuCache`]     |

pub mod lfu;
pub mod lru;
