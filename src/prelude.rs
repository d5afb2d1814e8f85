pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::CacheError;
pub use crate::listener::{ContextListener, EvictionListener, EvictionReason, NoListener};
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::traits::{CoreCache, LfuCacheTrait, LruCacheTrait, MutableCache};
