//! Decoded pages around the reading position
//!
//! Only the current page and its immediate neighbours are kept decoded. The
//! window is recomputed eagerly on every move, so stale pages never outlive
//! the move that made them stale. The current page is decoded synchronously
//! on a miss; neighbours are filled by [`PageCache::prefetch_one`] from a
//! deferred tick.
//!
//! A page that fails to decode is never cached. It is remembered as failed
//! until the window is next recomputed, which keeps prefetch from retrying it
//! on every tick.

use crate::error::{ReaderError, ReaderResult};
use comic_reader_cache::{BoundedCache, CacheStats};
use comic_reader_container::{DecodedImage, ImageContainer, ImageDecoder};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to a decoded page
pub type PageHandle = Arc<DecodedImage>;

pub struct PageCache {
    container: Option<Box<dyn ImageContainer>>,
    decoder: Arc<dyn ImageDecoder>,
    cache: BoundedCache<usize, PageHandle>,
    current: usize,

    /// Keys whose decode failed in the current window
    failed: HashSet<usize>,
}

impl PageCache {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            container: None,
            decoder,
            cache: BoundedCache::window(),
            current: 0,
            failed: HashSet::new(),
        }
    }

    /// Swap in `container` and show its first page
    ///
    /// A container without pages is rejected with [`ReaderError::Empty`]
    /// and the previously open container stays untouched.
    pub fn open(&mut self, container: Box<dyn ImageContainer>) -> ReaderResult<()> {
        if container.is_empty() {
            return Err(ReaderError::Empty);
        }

        self.close();
        tracing::debug!(source = %container.source().display(), pages = container.len(), "page cache reset");
        self.container = Some(container);
        self.current = 0;
        self.recompute_window();
        Ok(())
    }

    /// Close the open container and drop every cached page
    pub fn close(&mut self) {
        if let Some(mut container) = self.container.take() {
            container.close();
        }
        self.cache.clear();
        self.failed.clear();
        self.current = 0;
    }

    pub fn is_open(&self) -> bool {
        self.container.is_some()
    }

    pub fn container(&self) -> Option<&dyn ImageContainer> {
        self.container.as_deref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.container.as_ref().map(|container| container.source())
    }

    pub fn page_count(&self) -> usize {
        self.container.as_ref().map_or(0, |container| container.len())
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn entry_name(&self, index: usize) -> Option<&str> {
        self.container.as_ref()?.entries().get(index).map(String::as_str)
    }

    /// File backing the current page, when pages are files
    pub fn current_page_path(&self) -> Option<PathBuf> {
        self.container.as_ref()?.page_path(self.current)
    }

    /// `{current-1, current, current+1}` clipped to the page range
    pub fn window(&self) -> Vec<usize> {
        let count = self.page_count();
        if count == 0 {
            return Vec::new();
        }

        let start = self.current.saturating_sub(1);
        let end = (self.current + 1).min(count - 1);
        (start..=end).collect()
    }

    /// Indices currently holding a decoded page, ascending
    pub fn cached_indices(&self) -> Vec<usize> {
        self.cache.keys().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The decoded current page
    ///
    /// On a miss the page is decoded right away, so the visible page is
    /// never blank while it can be decoded at all.
    pub fn current(&mut self) -> ReaderResult<PageHandle> {
        if !self.is_open() {
            return Err(ReaderError::Empty);
        }

        if let Some(page) = self.cache.get(&self.current) {
            return Ok(page);
        }

        self.decode_into_cache(self.current)
    }

    /// Move by `delta` pages, clamped to the page range
    ///
    /// # Returns
    ///
    /// Whether the index moved. `false` at either end lets the caller decide
    /// to continue in a neighbouring container.
    pub fn advance(&mut self, delta: isize) -> bool {
        let count = self.page_count();
        if count == 0 {
            return false;
        }

        let target = self.current.saturating_add_signed(delta).min(count - 1);
        self.seek(target)
    }

    /// Jump to `index`; out-of-range indices are refused
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.page_count() || index == self.current {
            return false;
        }

        self.current = index;
        self.recompute_window();
        true
    }

    /// Window indices still waiting for a decode, nearest first
    pub fn pending(&self) -> Vec<usize> {
        let mut wanted = self.window();
        wanted.sort_by_key(|index| index.abs_diff(self.current));
        self.cache
            .missing(wanted.iter())
            .into_iter()
            .filter(|index| !self.failed.contains(index))
            .collect()
    }

    /// Decode at most one missing window page
    ///
    /// # Returns
    ///
    /// The index that was attempted, or `None` when nothing was pending.
    pub fn prefetch_one(&mut self) -> Option<usize> {
        let index = self.pending().into_iter().next()?;
        // Failures are recorded in `failed`; prefetch has no caller to report to.
        let _ = self.decode_into_cache(index);
        Some(index)
    }

    /// Decode every missing window page
    ///
    /// Idempotent; with nothing pending it does no work.
    ///
    /// # Returns
    ///
    /// The number of decode attempts made.
    pub fn prefetch_neighbors(&mut self) -> usize {
        let mut attempts = 0;
        while self.prefetch_one().is_some() {
            attempts += 1;
        }
        attempts
    }

    /// Drop page `index` after its backing file was deleted
    ///
    /// Cached pages below `index` keep their keys, the removed page is
    /// evicted and pages above it shift down by one. The current index keeps
    /// pointing at the same position, or at the new last page when the last
    /// page was removed.
    ///
    /// # Returns
    ///
    /// The number of pages left.
    pub fn remove_page(&mut self, index: usize) -> ReaderResult<usize> {
        let container = self.container.as_mut().ok_or(ReaderError::Empty)?;
        container.forget_entry(index)?;
        let remaining = container.len();

        let shift = |key: &usize| match (*key).cmp(&index) {
            std::cmp::Ordering::Less => Some(*key),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(*key - 1),
        };
        self.cache.remap_keys(shift);
        self.failed = self.failed.iter().filter_map(shift).collect();

        if remaining == 0 {
            tracing::debug!(index, "last page removed");
            self.close();
            return Ok(0);
        }

        if self.current > index || self.current >= remaining {
            self.current -= 1;
        }
        self.recompute_window();

        Ok(remaining)
    }

    fn recompute_window(&mut self) {
        let wanted: HashSet<usize> = self.window().into_iter().collect();
        if let Err(err) = self.cache.set_window(&wanted) {
            tracing::error!(%err, "page cache lost its window policy");
        }
        self.failed.clear();
    }

    fn decode_into_cache(&mut self, index: usize) -> ReaderResult<PageHandle> {
        let container = self.container.as_mut().ok_or(ReaderError::Empty)?;

        let decoded = container
            .read_index(index)
            .and_then(|bytes| self.decoder.decode(&bytes));

        match decoded {
            Ok(image) => {
                tracing::debug!(index, width = image.width, height = image.height, "page decoded");
                let page = Arc::new(image);
                self.cache.put(index, Arc::clone(&page));
                self.failed.remove(&index);
                Ok(page)
            }
            Err(err) => {
                tracing::warn!(index, %err, "page decode failed");
                self.failed.insert(index);
                Err(err.into())
            }
        }
    }
}
