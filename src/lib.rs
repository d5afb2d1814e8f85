//! evictkit: fixed-capacity LRU and LFU caches with eviction callbacks.
//!
//! Every operation is O(1). A [`KeyIndex`](ds::KeyIndex) maps each key to a
//! stable slot in the policy's ordering structure: a recency list for LRU,
//! frequency-bucketed lists for LFU. Entries the cache drops on its own are
//! handed to an optional [`EvictionListener`](listener::EvictionListener).
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//! assert!(!cache.contains(&"b"));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod listener;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::{CacheError, InvariantError};
pub use crate::listener::{ContextListener, EvictionListener, EvictionReason};
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
