//! Comic Reader Cache Library
//!
//! Bounded in-memory caches: a window cache for decoded pages around the
//! reading position and an LRU recency cache for memoized remote lookups.

pub mod bounded;
pub mod recency;

pub use bounded::{BoundedCache, CacheError, CacheStats, EvictionPolicy};
pub use recency::{RecencyCache, DEFAULT_RECENCY_CAPACITY};
