//! Eviction notifications.
//!
//! A cache owns every stored value. Whenever it drops one on its own
//! initiative (capacity pressure, overwrite, `clear`, or teardown) it hands the
//! key and value to the installed [`EvictionListener`] first, so resources the
//! value refers to can be reclaimed. Values that leave through `remove` or
//! `pop_*` are returned to the caller instead and never reach the listener.
//!
//! Listeners run synchronously on the calling thread, inside the cache
//! operation that triggered them. They cannot call back into the same cache:
//! the cache is mutably borrowed for the whole call, and a cache shared through
//! `RefCell` panics on the nested borrow.
//!
//! ```
//! use evictkit::listener::{ContextListener, EvictionReason};
//! use evictkit::policy::lru::LruCache;
//!
//! let listener = ContextListener::new(Vec::new(), |key: u32, _v: String, log: &mut Vec<u32>, _r: EvictionReason| {
//!     log.push(key);
//! });
//! let mut cache = LruCache::with_listener(1, listener).unwrap();
//! cache.insert(1, "a".to_string());
//! cache.insert(2, "b".to_string());
//! assert_eq!(cache.listener().unwrap().context(), &vec![1]);
//! ```

use std::fmt;

/// Describes why the cache gave up an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// Chosen as the policy victim to make room for a new key.
    Capacity,
    /// The key was written again; the old value is handed back.
    Replaced,
    /// Dropped by `clear`.
    Cleared,
    /// Still live when the cache itself was dropped.
    Teardown,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionReason::Capacity => f.write_str("evicted due to capacity"),
            EvictionReason::Replaced => f.write_str("replaced by a newer value"),
            EvictionReason::Cleared => f.write_str("dropped by clear"),
            EvictionReason::Teardown => f.write_str("dropped at cache teardown"),
        }
    }
}

/// Receives entries the cache is about to drop.
pub trait EvictionListener<K, V> {
    fn on_evict(&mut self, key: K, value: V, reason: EvictionReason);

    /// Returns `true` if this listener ignores every call. A cache never
    /// installs such a listener, so `insert` keeps returning replaced values.
    #[inline]
    fn is_noop(&self) -> bool {
        false
    }
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: FnMut(K, V, EvictionReason),
{
    #[inline]
    fn on_evict(&mut self, key: K, value: V, reason: EvictionReason) {
        self(key, value, reason)
    }
}

/// Type-erased listener used by [`crate::builder::Cache`].
pub type BoxedListener<K, V> = Box<dyn FnMut(K, V, EvictionReason)>;

/// Placeholder listener type for caches built without one.
///
/// A cache whose listener slot is empty returns replaced values from `insert`
/// and simply drops capacity victims. Passing `NoListener` to `with_listener`
/// leaves the slot empty as well.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoListener;

impl<K, V> EvictionListener<K, V> for NoListener {
    #[inline]
    fn on_evict(&mut self, _key: K, _value: V, _reason: EvictionReason) {}

    #[inline]
    fn is_noop(&self) -> bool {
        true
    }
}

/// Listener that threads a caller-owned context through every invocation.
///
/// The context is passed unmodified by the cache; only `f` touches it.
pub struct ContextListener<C, F> {
    context: C,
    f: F,
}

impl<C, F> ContextListener<C, F> {
    pub fn new(context: C, f: F) -> Self {
        Self { context, f }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }
}

impl<C, F> fmt::Debug for ContextListener<C, F>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextListener")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<K, V, C, F> EvictionListener<K, V> for ContextListener<C, F>
where
    F: FnMut(K, V, &mut C, EvictionReason),
{
    #[inline]
    fn on_evict(&mut self, key: K, value: V, reason: EvictionReason) {
        (self.f)(key, value, &mut self.context, reason)
    }
}
