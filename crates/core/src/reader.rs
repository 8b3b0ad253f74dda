//! The reader controller
//!
//! [`Reader`] owns one instance of every engine component and is the only
//! place that wires them together: opening paths, turning pages (across
//! containers when allowed), scroll gating, deletion and the deferred decode
//! queue. Everything runs on the caller's thread; deferred work advances one
//! decode per [`Reader::run_deferred_tick`].

use crate::collection::CollectionIndex;
use crate::config::ReaderConfig;
use crate::deletion::{DeletionCoordinator, DeletionOutcome};
use crate::error::{ReaderError, ReaderResult};
use crate::memo::{RemoteMemo, RemoteService};
use crate::page_cache::{PageCache, PageHandle};
use crate::scroll::ScrollRateLimiter;
use comic_reader_container::{
    display_name, BrowseMode, Clock, ContainerError, ContainerOpener, ImageContainer,
    ImageDecoder, RasterDecoder, SystemClock, SystemTrash, Trash,
};
use comic_reader_scheduler::{DeferredQueue, DeferredTask, QueueStats};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Snapshot of what the reader is showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderStatus {
    pub mode: &'static str,
    pub container: Option<PathBuf>,
    pub container_name: Option<String>,
    /// 0-based position in the collection
    pub container_position: Option<usize>,
    pub container_count: usize,
    /// 0-based page index
    pub page: Option<usize>,
    pub page_count: usize,
    pub entry: Option<String>,
}

impl fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(name), Some(page)) = (&self.container_name, self.page) else {
            return write!(f, "(nothing open)");
        };

        write!(f, "{name}")?;
        if let Some(position) = self.container_position {
            write!(f, " [{}/{}]", position + 1, self.container_count)?;
        }
        write!(f, " page {}/{}", page + 1, self.page_count)?;
        if let Some(entry) = &self.entry {
            write!(f, " {entry}")?;
        }
        Ok(())
    }
}

pub fn mode_name(mode: BrowseMode) -> &'static str {
    match mode {
        BrowseMode::Archives => "archives",
        BrowseMode::Images => "images",
    }
}

pub struct Reader {
    config: ReaderConfig,
    opener: ContainerOpener,
    collection: CollectionIndex,
    pages: PageCache,
    deletion: DeletionCoordinator,
    limiter: ScrollRateLimiter,
    queue: DeferredQueue,
    clock: Arc<dyn Clock>,
}

impl Reader {
    /// Reader backed by the real filesystem, zip archives, the `image`
    /// decoder and the platform trash
    pub fn new(config: ReaderConfig) -> Self {
        let opener = ContainerOpener::new(config.media_filter());
        let limiter = ScrollRateLimiter::new(&config.scroll);

        Self {
            opener,
            collection: CollectionIndex::empty(BrowseMode::Archives),
            pages: PageCache::new(Arc::new(RasterDecoder)),
            deletion: DeletionCoordinator::new(Arc::new(SystemTrash)),
            limiter,
            queue: DeferredQueue::new(),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Use a different image decoder; drops anything already open
    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.pages.close();
        self.pages = PageCache::new(decoder);
        self
    }

    pub fn with_trash(mut self, trash: Arc<dyn Trash>) -> Self {
        self.deletion = DeletionCoordinator::new(trash);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_opener(mut self, opener: ContainerOpener) -> Self {
        self.opener = opener;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn collection(&self) -> &CollectionIndex {
        &self.collection
    }

    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    pub fn mode(&self) -> BrowseMode {
        self.collection.mode()
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Memoize `service` with the configured recency capacity
    pub fn remote_memo<S: RemoteService>(&self, service: S) -> RemoteMemo<S> {
        RemoteMemo::new(service, self.config.recency_capacity)
    }

    /// Open an archive, a folder, or the folder around an image file
    ///
    /// On failure the previously open container and collection are kept
    /// exactly as they were.
    pub fn open_path(&mut self, path: &Path) -> ReaderResult<()> {
        if !path.exists() {
            return Err(ReaderError::NotFound(path.display().to_string()));
        }

        let filter = self.opener.filter();
        let lister = self.opener.lister().as_ref();

        if path.is_dir() {
            let collection = CollectionIndex::scan(path, BrowseMode::Images, filter, lister);
            return self.open_folder(collection);
        }

        if !filter.is_archive(path) && !filter.is_image(&path.to_string_lossy()) {
            tracing::warn!(path = %path.display(), "neither an archive nor an image");
            return Err(ContainerError::NotAnArchive(path.to_path_buf()).into());
        }

        match filter.mode_for(path) {
            BrowseMode::Archives => {
                let collection = CollectionIndex::build(path, BrowseMode::Archives, filter, lister);
                self.open_archive(collection, 1)
            }
            BrowseMode::Images => {
                let collection = CollectionIndex::build(path, BrowseMode::Images, filter, lister);
                self.open_folder(collection)
            }
        }
    }

    /// Move one page forward
    pub fn next_page(&mut self) -> ReaderResult<bool> {
        self.turn_page(1)
    }

    /// Move one page back
    pub fn prev_page(&mut self) -> ReaderResult<bool> {
        self.turn_page(-1)
    }

    /// Open the next archive of the collection
    ///
    /// Returns `Ok(false)` when already at the last one or when browsing a
    /// folder of images.
    pub fn next_container(&mut self) -> ReaderResult<bool> {
        self.step_container(1)
    }

    pub fn previous_container(&mut self) -> ReaderResult<bool> {
        self.step_container(-1)
    }

    /// Feed a wheel tick; positive `wheel_delta` is an upward scroll
    ///
    /// # Returns
    ///
    /// Whether the tick turned a page.
    pub fn on_scroll(&mut self, wheel_delta: i32) -> ReaderResult<bool> {
        let now = self.clock.now();
        match self.limiter.on_tick(now, wheel_delta) {
            Some(step) => self.turn_page(step.delta()),
            None => Ok(false),
        }
    }

    /// The decoded page to show; queues its neighbours for decoding
    pub fn current_page(&mut self) -> ReaderResult<PageHandle> {
        let page = self.pages.current()?;
        self.queue.schedule(DeferredTask::PrefetchNeighbors);
        Ok(page)
    }

    /// Trash the current archive (archive mode) or page (folder mode)
    pub fn delete_current(&mut self) -> ReaderResult<DeletionOutcome> {
        let outcome =
            self.deletion.delete_current(&mut self.collection, &mut self.pages, &self.opener)?;
        self.queue.cancel_all();

        let outcome = match outcome {
            DeletionOutcome::ReopenFailed { pointer, path, error } => {
                self.recover_after_failed_reopen(pointer, path, error)
            }
            other => other,
        };

        if self.pages.is_open() {
            self.queue.schedule(DeferredTask::WarmUp);
        }
        Ok(outcome)
    }

    /// Run one deferred task
    ///
    /// Each task decodes at most one page and requeues itself while window
    /// pages are still missing.
    ///
    /// # Returns
    ///
    /// Whether a task was run.
    pub fn run_deferred_tick(&mut self) -> bool {
        let Some(task) = self.queue.next() else {
            return false;
        };

        if !self.queue.is_current(&task) {
            return true;
        }

        match task.task {
            DeferredTask::PrefetchNeighbors | DeferredTask::WarmUp => {
                if self.pages.prefetch_one().is_some() && !self.pages.pending().is_empty() {
                    self.queue.schedule(task.task);
                }
            }
        }
        true
    }

    /// Drain the deferred queue
    ///
    /// # Returns
    ///
    /// The number of ticks run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ticks = 0;
        while self.run_deferred_tick() {
            ticks += 1;
        }
        ticks
    }

    pub fn status(&self) -> ReaderStatus {
        let source = self.pages.source().map(Path::to_path_buf);
        let is_open = source.is_some();

        ReaderStatus {
            mode: mode_name(self.mode()),
            container_name: source.as_deref().map(display_name),
            container: source,
            container_position: match self.mode() {
                BrowseMode::Archives => self.collection.pointer(),
                BrowseMode::Images => None,
            },
            container_count: match self.mode() {
                BrowseMode::Archives => self.collection.len(),
                BrowseMode::Images => usize::from(is_open),
            },
            page: is_open.then(|| self.pages.current_index()),
            page_count: self.pages.page_count(),
            entry: self.pages.entry_name(self.pages.current_index()).map(str::to_owned),
        }
    }

    /// Cancel deferred work and release the open container
    pub fn close(&mut self) {
        self.queue.cancel_all();
        self.pages.close();
        self.collection = CollectionIndex::empty(self.collection.mode());
        self.limiter.reset();
        tracing::info!("reader closed");
    }

    fn turn_page(&mut self, delta: isize) -> ReaderResult<bool> {
        if !self.pages.is_open() {
            return Err(ReaderError::Empty);
        }

        if self.pages.advance(delta) {
            if self.mode() == BrowseMode::Images {
                self.collection.set_pointer(self.pages.current_index());
            }
            self.queue.schedule(DeferredTask::PrefetchNeighbors);
            return Ok(true);
        }

        if self.mode() == BrowseMode::Archives && self.config.advance_across_containers {
            let moved = self.step_container(delta)?;
            if moved && delta < 0 {
                let last = self.pages.page_count().saturating_sub(1);
                self.pages.seek(last);
            }
            return Ok(moved);
        }

        Ok(false)
    }

    fn step_container(&mut self, delta: isize) -> ReaderResult<bool> {
        if self.mode() != BrowseMode::Archives {
            return Ok(false);
        }

        let mut next = self.collection.clone();
        if !next.navigate(delta) {
            let end = if delta < 0 { "first" } else { "last" };
            tracing::info!("already at the {end} container");
            return Ok(false);
        }

        self.open_archive(next, delta.signum())?;
        Ok(true)
    }

    /// Open the container at the collection's pointer and commit both
    ///
    /// A failed open is followed by exactly one attempt at the neighbour in
    /// `direction`; if that fails too the result is [`ReaderError::Empty`].
    fn open_archive(&mut self, mut collection: CollectionIndex, direction: isize) -> ReaderResult<()> {
        let container = match self.open_at_pointer(&collection) {
            Ok(container) => container,
            Err(first) => {
                if !collection.navigate(direction) {
                    return Err(first);
                }
                tracing::warn!(%first, "open failed; trying the neighbouring container");
                self.open_at_pointer(&collection).map_err(|err| {
                    tracing::warn!(%err, "neighbouring container failed as well");
                    ReaderError::Empty
                })?
            }
        };

        self.commit(collection, container)
    }

    fn open_folder(&mut self, collection: CollectionIndex) -> ReaderResult<()> {
        let dir = collection
            .dir()
            .map(Path::to_path_buf)
            .or_else(|| collection.current().and_then(Path::parent).map(Path::to_path_buf))
            .unwrap_or_default();

        if collection.is_empty() {
            return Err(ReaderError::Empty);
        }

        let container = self.opener.open_pages(&dir, collection.paths().to_vec())?;
        let start = collection.pointer().unwrap_or(0);
        self.commit(collection, container)?;
        self.pages.seek(start);
        Ok(())
    }

    fn open_at_pointer(&self, collection: &CollectionIndex) -> ReaderResult<Box<dyn ImageContainer>> {
        let path = collection.current().ok_or(ReaderError::Empty)?;
        Ok(self.opener.open(path)?)
    }

    fn commit(
        &mut self,
        collection: CollectionIndex,
        container: Box<dyn ImageContainer>,
    ) -> ReaderResult<()> {
        self.pages.open(container)?;
        self.queue.cancel_all();
        self.collection = collection;
        self.queue.schedule(DeferredTask::WarmUp);

        tracing::info!(
            source = ?self.pages.source(),
            pages = self.pages.page_count(),
            position = ?self.collection.pointer(),
            "container opened"
        );
        Ok(())
    }

    fn recover_after_failed_reopen(
        &mut self,
        pointer: usize,
        path: PathBuf,
        error: String,
    ) -> DeletionOutcome {
        let mut next = self.collection.clone();
        if !next.navigate(1) {
            return DeletionOutcome::ReopenFailed { pointer, path, error };
        }

        match self.open_at_pointer(&next) {
            Ok(container) => {
                let path = next.current().map(Path::to_path_buf).unwrap_or_default();
                let pointer = next.pointer().unwrap_or_default();
                match self.commit(next, container) {
                    Ok(()) => DeletionOutcome::Reopened { pointer, path },
                    Err(err) => DeletionOutcome::ReopenFailed { pointer, path, error: err.to_string() },
                }
            }
            Err(err) => {
                tracing::warn!(%err, "neighbouring container failed after delete");
                DeletionOutcome::ReopenFailed { pointer, path, error }
            }
        }
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.queue.cancel_all();
        self.pages.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScrollConfig, ScrollPolarity};
    use crate::fixtures::{write_book, write_images, write_zip, FakeDecoder, RecordingTrash, RefusingTrash};
    use comic_reader_container::ManualClock;
    use std::time::Duration;

    fn reader() -> Reader {
        Reader::new(ReaderConfig::default()).with_decoder(Arc::new(FakeDecoder::default()))
    }

    #[test]
    fn open_archive_builds_collection() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        write_book(temp.path(), "vol1.zip", 3);
        let anchor = write_book(temp.path(), "vol2.zip", 2);

        let mut reader = reader();
        reader.open_path(&anchor).expect("open");

        let status = reader.status();
        assert_eq!(status.mode, "archives");
        assert_eq!(status.container_name.as_deref(), Some("vol2.zip"));
        assert_eq!(status.container_position, Some(1));
        assert_eq!(status.container_count, 2);
        assert_eq!(status.page, Some(0));
        assert_eq!(status.page_count, 2);
        assert_eq!(status.entry.as_deref(), Some("001.png"));
        assert_eq!(status.to_string(), "vol2.zip [2/2] page 1/2 001.png");
    }

    #[test]
    fn failed_open_keeps_previous_state() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let good = write_book(temp.path(), "a.zip", 3);
        let other = tempfile::tempdir().expect("temp dir should be created");
        let broken = other.path().join("broken.zip");
        std::fs::write(&broken, b"not a zip").expect("write");

        let mut reader = reader();
        reader.open_path(&good).expect("open");
        reader.next_page().expect("turn");

        let err = reader.open_path(&broken).expect_err("broken archive");
        assert!(matches!(err, ReaderError::Corrupt(_)));
        assert_eq!(reader.pages().source(), Some(good.as_path()));
        assert_eq!(reader.pages().current_index(), 1);
        assert_eq!(reader.collection().current(), Some(good.as_path()));
    }

    #[test]
    fn unsupported_file_keeps_previous_state() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let good = write_book(temp.path(), "a.zip", 3);
        let other = tempfile::tempdir().expect("temp dir should be created");
        let notes = other.path().join("notes.txt");
        std::fs::write(&notes, b"not a page").expect("write");

        let mut reader = reader();
        reader.open_path(&good).expect("open");
        reader.next_page().expect("turn");

        let err = reader.open_path(&notes).expect_err("text file is not openable");
        assert!(matches!(err, ReaderError::Corrupt(_)));
        assert_eq!(reader.pages().source(), Some(good.as_path()));
        assert_eq!(reader.pages().current_index(), 1);
        assert_eq!(reader.collection().current(), Some(good.as_path()));
        assert_eq!(reader.mode(), BrowseMode::Archives);
    }

    #[test]
    fn empty_archive_advances_once() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let empty = write_zip(temp.path(), "a.zip", &[("readme.txt", b"no pages")]);
        write_book(temp.path(), "b.zip", 2);

        let mut reader = reader();
        reader.open_path(&empty).expect("falls through to b.zip");
        assert_eq!(reader.status().container_name.as_deref(), Some("b.zip"));
    }

    #[test]
    fn two_failures_report_empty() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let first = write_zip(temp.path(), "a.zip", &[("readme.txt", b"no pages")]);
        write_zip(temp.path(), "b.zip", &[("readme.txt", b"no pages")]);
        write_book(temp.path(), "c.zip", 2);

        let mut reader = reader();
        let err = reader.open_path(&first).expect_err("only one advance");
        assert!(matches!(err, ReaderError::Empty));
        assert!(!reader.pages().is_open());
    }

    #[test]
    fn paging_crosses_containers() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(temp.path(), "a.zip", 2);
        write_book(temp.path(), "b.zip", 3);

        let mut reader = reader();
        reader.open_path(&first).expect("open");
        assert!(reader.next_page().expect("turn"));
        assert!(reader.next_page().expect("cross"));
        assert_eq!(reader.status().container_name.as_deref(), Some("b.zip"));
        assert_eq!(reader.pages().current_index(), 0);

        assert!(reader.prev_page().expect("cross back"));
        assert_eq!(reader.status().container_name.as_deref(), Some("a.zip"));
        assert_eq!(reader.pages().current_index(), 1, "lands on the last page");

        assert!(reader.prev_page().expect("turn"));
        assert!(!reader.prev_page().expect("at the very start"));
    }

    #[test]
    fn paging_stays_put_when_crossing_disabled() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(temp.path(), "a.zip", 1);
        write_book(temp.path(), "b.zip", 1);

        let config = ReaderConfig { advance_across_containers: false, ..Default::default() };
        let mut reader = Reader::new(config).with_decoder(Arc::new(FakeDecoder::default()));
        reader.open_path(&first).expect("open");
        assert!(!reader.next_page().expect("no move"));
        assert!(reader.next_container().expect("explicit move"));
        assert!(!reader.next_container().expect("already last"));
        assert!(reader.previous_container().expect("back"));
    }

    #[test]
    fn folder_mode_starts_at_anchor_image() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let files = write_images(temp.path(), 4);

        let mut reader = reader();
        reader.open_path(&files[2]).expect("open");
        let status = reader.status();
        assert_eq!(status.mode, "images");
        assert_eq!(status.page, Some(2));
        assert_eq!(status.page_count, 4);
        assert_eq!(status.entry.as_deref(), Some("p3.png"));

        assert!(reader.next_page().expect("turn"));
        assert!(!reader.next_page().expect("folder end"));
        assert!(!reader.next_container().expect("no containers in folder mode"));
        assert_eq!(reader.collection().pointer(), Some(3));
    }

    #[test]
    fn directory_opens_in_folder_mode() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        write_images(temp.path(), 2);

        let mut reader = reader();
        reader.open_path(temp.path()).expect("open");
        assert_eq!(reader.mode(), BrowseMode::Images);
        assert_eq!(reader.status().page, Some(0));
    }

    #[test]
    fn deferred_ticks_decode_one_page_each() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let book = write_book(temp.path(), "a.zip", 5);

        let mut reader = reader();
        reader.open_path(&book).expect("open");
        reader.next_page().expect("turn");
        assert!(reader.pages().cached_indices().is_empty());

        assert!(reader.run_deferred_tick());
        assert_eq!(reader.pages().cached_indices().len(), 1);

        reader.run_until_idle();
        assert_eq!(reader.pages().cached_indices(), vec![0, 1, 2]);
        assert!(!reader.run_deferred_tick());
    }

    #[test]
    fn opening_cancels_pending_prefetch() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(temp.path(), "a.zip", 3);
        let second = write_book(temp.path(), "b.zip", 3);

        let mut reader = reader();
        reader.open_path(&first).expect("open");
        reader.current_page().expect("decode");
        reader.open_path(&second).expect("open");

        assert!(reader.queue_stats().cancelled >= 1);
        reader.run_until_idle();
        assert_eq!(reader.pages().source(), Some(second.as_path()));
        assert_eq!(reader.pages().cached_indices(), vec![0, 1]);
    }

    #[test]
    fn scroll_is_rate_limited() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let book = write_book(temp.path(), "a.zip", 20);
        let clock = ManualClock::new();

        let config = ReaderConfig {
            scroll: ScrollConfig { polarity: ScrollPolarity::UpIsPrevious, ..Default::default() },
            ..Default::default()
        };
        let mut reader = Reader::new(config)
            .with_decoder(Arc::new(FakeDecoder::default()))
            .with_clock(Arc::new(clock.clone()));
        reader.open_path(&book).expect("open");

        let mut turned = 0;
        for _ in 0..10 {
            if reader.on_scroll(-120).expect("scroll") {
                turned += 1;
            }
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(turned, 5);
        assert_eq!(reader.pages().current_index(), 5);
    }

    #[test]
    fn delete_reopens_next_and_cancels_work() {
        let books = tempfile::tempdir().expect("temp dir should be created");
        let bin = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(books.path(), "a.zip", 3);
        write_book(books.path(), "b.zip", 3);

        let mut reader = reader().with_trash(Arc::new(RecordingTrash::new(bin.path())));
        reader.open_path(&first).expect("open");
        reader.current_page().expect("decode");

        let outcome = reader.delete_current().expect("delete");
        assert_eq!(
            outcome,
            DeletionOutcome::Reopened { pointer: 0, path: books.path().join("b.zip") }
        );
        assert_eq!(reader.status().container_count, 1);
        reader.run_until_idle();
        assert_eq!(reader.pages().cached_indices(), vec![0, 1]);
    }

    #[test]
    fn delete_skips_unopenable_successor_once() {
        let books = tempfile::tempdir().expect("temp dir should be created");
        let bin = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(books.path(), "a.zip", 1);
        write_zip(books.path(), "b.zip", &[("notes.txt", b"no pages")]);
        write_book(books.path(), "c.zip", 1);

        let mut reader = reader().with_trash(Arc::new(RecordingTrash::new(bin.path())));
        reader.open_path(&first).expect("open");

        let outcome = reader.delete_current().expect("delete");
        assert_eq!(
            outcome,
            DeletionOutcome::Reopened { pointer: 1, path: books.path().join("c.zip") }
        );
    }

    #[test]
    fn refused_delete_leaves_reader_intact() {
        let books = tempfile::tempdir().expect("temp dir should be created");
        let first = write_book(books.path(), "a.zip", 3);

        let mut reader = reader().with_trash(Arc::new(RefusingTrash));
        reader.open_path(&first).expect("open");
        reader.next_page().expect("turn");
        let before = reader.status();

        assert!(reader.delete_current().is_err());
        assert_eq!(reader.status(), before);
    }

    #[test]
    fn close_releases_everything() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let book = write_book(temp.path(), "a.zip", 2);

        let mut reader = reader();
        reader.open_path(&book).expect("open");
        reader.close();

        assert!(!reader.pages().is_open());
        assert!(reader.collection().is_empty());
        assert_eq!(reader.status().to_string(), "(nothing open)");
        assert!(matches!(reader.next_page(), Err(ReaderError::Empty)));
    }

    #[test]
    fn remote_memo_uses_configured_capacity() {
        struct Echo;
        impl RemoteService for Echo {
            type Output = String;
            fn call(&mut self, text: &str) -> Result<String, crate::memo::RemoteError> {
                Ok(text.to_owned())
            }
        }

        let config = ReaderConfig { recency_capacity: 1, ..Default::default() };
        let reader = Reader::new(config);
        let mut memo = reader.remote_memo(Echo);
        memo.request("a").expect("ok");
        memo.request("b").expect("ok");
        assert_eq!(memo.cached("a"), None);
        assert_eq!(memo.cached("b").as_deref(), Some("b"));
    }

    #[test]
    fn missing_path_is_not_found() {
        let mut reader = reader();
        let err = reader.open_path(Path::new("/definitely/not/here.zip")).expect_err("missing");
        assert!(matches!(err, ReaderError::NotFound(_)));
    }
}
