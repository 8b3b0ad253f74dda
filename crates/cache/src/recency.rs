//! Recency cache for memoized text lookups
//!
//! A [`BoundedCache`] with the LRU policy keyed by request text. A miss is
//! an ordinary outcome and never an error.

use crate::bounded::BoundedCache;

/// Default number of remembered responses
pub const DEFAULT_RECENCY_CAPACITY: usize = 3;

/// Text key to response payload, most recent at the tail
pub type RecencyCache<V> = BoundedCache<String, V>;

impl<V> BoundedCache<String, V> {
    /// Create a recency cache with [`DEFAULT_RECENCY_CAPACITY`]
    pub fn recency() -> Self {
        Self::lru(DEFAULT_RECENCY_CAPACITY)
    }

    /// Look up `text`, promoting it on a hit
    pub fn lookup(&mut self, text: &str) -> Option<V>
    where
        V: Clone,
    {
        self.get(text)
    }

    /// Remember the response for `text`
    pub fn remember(&mut self, text: &str, response: V) {
        self.put(text.to_owned(), response);
    }
}
