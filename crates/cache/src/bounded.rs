//! Bounded cache with window or LRU eviction
//!
//! One store, two retention policies:
//!
//! - [`EvictionPolicy::Window`]: membership is decided by the caller. Every
//!   call to [`BoundedCache::set_window`] eagerly drops keys outside the
//!   wanted set; the cache never bounds itself otherwise.
//! - [`EvictionPolicy::Lru`]: recency ordering with a fixed capacity. A hit
//!   promotes the key to most-recent, inserts evict the least-recent entry
//!   once the capacity is exceeded.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// Retention policy of a [`BoundedCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keys live while they belong to the caller's current window
    Window,

    /// Least recently used entries are evicted beyond `capacity`
    Lru { capacity: usize },
}

/// Statistics about cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently cached
    pub entries: usize,

    /// Number of lookups that found an entry
    pub hits: u64,

    /// Number of lookups that found nothing
    pub misses: u64,

    /// Number of entries dropped by the policy (window exits or LRU overflow)
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("window membership only applies to window caches (policy is {0:?})")]
    WindowOnly(EvictionPolicy),
}

/// Capacity- or window-bounded key/value store
///
/// # Example
///
/// ```
/// use comic_reader_cache::BoundedCache;
/// use std::collections::HashSet;
///
/// let mut pages = BoundedCache::window();
/// for index in 0..5_usize {
///     pages.put(index, format!("page {index}"));
/// }
///
/// let wanted: HashSet<usize> = [1, 2, 3].into_iter().collect();
/// pages.set_window(&wanted).unwrap();
/// assert_eq!(pages.len(), 3);
/// assert!(!pages.contains_key(&0));
///
/// let mut recent = BoundedCache::lru(2);
/// recent.put("a", 1);
/// recent.put("b", 2);
/// recent.get("a");
/// recent.put("c", 3);
/// assert!(recent.contains_key("a"));
/// assert!(!recent.contains_key("b"));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    policy: EvictionPolicy,
    entries: HashMap<K, V>,

    /// Recency queue for the LRU policy (least recent at front). Always
    /// empty under the window policy.
    order: VecDeque<K>,

    stats: CacheStats,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create a cache whose membership follows [`set_window`](Self::set_window)
    pub fn window() -> Self {
        Self::with_policy(EvictionPolicy::Window)
    }

    /// Create a recency cache holding at most `capacity` entries
    ///
    /// A capacity of zero is raised to one.
    pub fn lru(capacity: usize) -> Self {
        Self::with_policy(EvictionPolicy::Lru { capacity: capacity.max(1) })
    }

    fn with_policy(policy: EvictionPolicy) -> Self {
        Self { policy, entries: HashMap::new(), order: VecDeque::new(), stats: CacheStats::default() }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check membership without touching recency or statistics
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Borrow an entry without touching recency or statistics
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    /// Look up an entry
    ///
    /// Under the LRU policy a hit promotes the key to most-recent. Under the
    /// window policy the lookup has no effect besides statistics.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        match self.entries.get(key).cloned() {
            Some(value) => {
                self.stats.hits += 1;
                if matches!(self.policy, EvictionPolicy::Lru { .. }) {
                    self.touch(key);
                }
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or replace an entry
    ///
    /// Under the LRU policy the key becomes most-recent and least-recent
    /// entries are evicted while the cache is over capacity. Under the window
    /// policy the insert is unbounded.
    pub fn put(&mut self, key: K, value: V) {
        let existed = self.entries.insert(key.clone(), value).is_some();

        if let EvictionPolicy::Lru { capacity } = self.policy {
            if existed {
                self.touch(&key);
            } else {
                self.order.push_back(key);
            }

            while self.entries.len() > capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                if self.entries.remove(&oldest).is_some() {
                    self.stats.evictions += 1;
                    tracing::debug!(key = ?oldest, "evicted least recent entry");
                }
            }
        }

        self.stats.entries = self.entries.len();
    }

    /// Evict every key not in `wanted`
    ///
    /// Eviction is eager: nothing outside the window survives this call.
    /// Keys of `wanted` that are not cached are left for the caller to
    /// populate (see [`missing`](Self::missing)).
    ///
    /// # Returns
    ///
    /// The evicted keys, or [`CacheError::WindowOnly`] for an LRU cache.
    pub fn set_window(&mut self, wanted: &HashSet<K>) -> Result<Vec<K>, CacheError> {
        if self.policy != EvictionPolicy::Window {
            return Err(CacheError::WindowOnly(self.policy));
        }

        let stale: Vec<K> =
            self.entries.keys().filter(|key| !wanted.contains(*key)).cloned().collect();

        for key in &stale {
            self.entries.remove(key);
        }

        if !stale.is_empty() {
            self.stats.evictions += stale.len() as u64;
            tracing::debug!(evicted = ?stale, "window recomputed");
        }
        self.stats.entries = self.entries.len();

        Ok(stale)
    }

    /// Keys from `wanted` that are not cached, in the order given
    pub fn missing<'a, I>(&self, wanted: I) -> Vec<K>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        wanted.into_iter().filter(|key| !self.entries.contains_key(*key)).cloned().collect()
    }

    /// Remove an entry outright (not counted as an eviction)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let removed = self.entries.remove(key)?;
        self.order.retain(|existing| <K as Borrow<Q>>::borrow(existing) != key);
        self.stats.entries = self.entries.len();
        Some(removed)
    }

    /// Rewrite every key through `remap`
    ///
    /// Entries for which `remap` returns `None` are dropped. Recency order is
    /// preserved for the surviving keys. The mapping must be injective over
    /// the surviving keys.
    ///
    /// # Returns
    ///
    /// The number of dropped entries.
    pub fn remap_keys<F>(&mut self, mut remap: F) -> usize
    where
        F: FnMut(&K) -> Option<K>,
    {
        let before = self.entries.len();
        let mut renamed: HashMap<K, K> = HashMap::with_capacity(before);

        let entries = std::mem::take(&mut self.entries);
        for (key, value) in entries {
            if let Some(new_key) = remap(&key) {
                renamed.insert(key, new_key.clone());
                self.entries.insert(new_key, value);
            }
        }

        self.order = std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|key| renamed.get(&key).cloned())
            .collect();

        self.stats.entries = self.entries.len();
        before - self.entries.len()
    }

    /// Iterate over cached keys (arbitrary order)
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Keys from least to most recently used (empty under the window policy)
    pub fn recency_order(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Drop all entries; statistics counters other than `entries` are kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let position =
            self.order.iter().position(|existing| <K as Borrow<Q>>::borrow(existing) == key);
        if let Some(index) = position {
            if let Some(found) = self.order.remove(index) {
                self.order.push_back(found);
            }
        }
    }
}
