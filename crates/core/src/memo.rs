//! Memoized remote lookups
//!
//! OCR, translation and speech calls are slow and metered. [`RemoteMemo`]
//! remembers the last few successful responses per service so that asking
//! again about the same text is free. Failures pass through and are never
//! remembered.

use comic_reader_cache::{CacheStats, RecencyCache};

/// A remote text service
pub trait RemoteService {
    type Output: Clone;

    fn call(&mut self, text: &str) -> Result<Self::Output, RemoteError>;

    /// Cache key for `text`; requests with the same key share a response
    fn cache_key(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

pub struct RemoteMemo<S: RemoteService> {
    service: S,
    cache: RecencyCache<S::Output>,
}

impl<S: RemoteService> RemoteMemo<S> {
    pub fn new(service: S, capacity: usize) -> Self {
        Self { service, cache: RecencyCache::lru(capacity) }
    }

    /// Answer from memory, or call the service and remember a success
    pub fn request(&mut self, text: &str) -> Result<S::Output, RemoteError> {
        let key = self.service.cache_key(text);
        if let Some(hit) = self.cache.lookup(&key) {
            return Ok(hit);
        }

        let response = self.service.call(text)?;
        self.cache.remember(&key, response.clone());
        Ok(response)
    }

    /// Silent lookup; a miss is not an error
    pub fn cached(&mut self, text: &str) -> Option<S::Output> {
        let key = self.service.cache_key(text);
        self.cache.lookup(&key)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}
