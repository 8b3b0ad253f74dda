//! Deleting the unit under the reader
//!
//! In archive mode the unit is the current container; in folder mode it is
//! the current page file. Either way the resource is moved to the trash
//! first, and nothing else changes unless that move succeeded.

use crate::collection::CollectionIndex;
use crate::error::{ReaderError, ReaderResult};
use crate::page_cache::PageCache;
use comic_reader_container::{BrowseMode, ContainerOpener, Trash};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// What the reader shows after a deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// The container at `pointer` was opened at its first page
    Reopened { pointer: usize, path: PathBuf },

    /// A page was removed from the open folder
    PageRemoved { index: usize, remaining: usize },

    /// The container at `pointer` could not be opened
    ReopenFailed { pointer: usize, path: PathBuf, error: String },

    /// Nothing is left, even after a rescan
    Empty,
}

pub struct DeletionCoordinator {
    trash: Arc<dyn Trash>,
}

impl DeletionCoordinator {
    pub fn new(trash: Arc<dyn Trash>) -> Self {
        Self { trash }
    }

    /// Trash the current unit and move on to what follows it
    ///
    /// # Errors
    ///
    /// [`ReaderError::NotFound`] when nothing is selected, or the trash
    /// error. In both cases `collection` and `pages` are left unchanged.
    pub fn delete_current(
        &self,
        collection: &mut CollectionIndex,
        pages: &mut PageCache,
        opener: &ContainerOpener,
    ) -> ReaderResult<DeletionOutcome> {
        let target = self.target(collection, pages)?;

        if let Err(err) = self.trash.move_to_trash(&target) {
            tracing::warn!(path = %target.display(), %err, "trash failed; nothing changed");
            return Err(err.into());
        }
        tracing::info!(path = %target.display(), "moved to trash");

        match collection.mode() {
            BrowseMode::Archives => self.after_container_removed(collection, pages, opener),
            BrowseMode::Images => self.after_page_removed(collection, pages, opener),
        }
    }

    fn target(&self, collection: &CollectionIndex, pages: &PageCache) -> ReaderResult<PathBuf> {
        let missing = || ReaderError::NotFound("no current item to delete".to_string());

        match collection.mode() {
            BrowseMode::Archives => collection.current().map(PathBuf::from).ok_or_else(missing),
            BrowseMode::Images => pages.current_page_path().ok_or_else(missing),
        }
    }

    fn after_container_removed(
        &self,
        collection: &mut CollectionIndex,
        pages: &mut PageCache,
        opener: &ContainerOpener,
    ) -> ReaderResult<DeletionOutcome> {
        collection.remove_current();
        // Nothing decoded from the removed archive may survive.
        pages.close();

        if collection.is_empty() && collection.rescan(opener.filter(), opener.lister().as_ref()) == 0 {
            return Ok(DeletionOutcome::Empty);
        }

        let (Some(pointer), Some(path)) = (collection.pointer(), collection.current()) else {
            return Ok(DeletionOutcome::Empty);
        };
        let path = path.to_path_buf();

        let opened = opener.open(&path).map_err(ReaderError::from).and_then(|c| pages.open(c));
        match opened {
            Ok(()) => Ok(DeletionOutcome::Reopened { pointer, path }),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "reopen after delete failed");
                Ok(DeletionOutcome::ReopenFailed { pointer, path, error: err.to_string() })
            }
        }
    }

    fn after_page_removed(
        &self,
        collection: &mut CollectionIndex,
        pages: &mut PageCache,
        opener: &ContainerOpener,
    ) -> ReaderResult<DeletionOutcome> {
        let index = pages.current_index();
        collection.set_pointer(index);
        collection.remove_current();
        let remaining = pages.remove_page(index)?;

        if remaining > 0 {
            collection.set_pointer(pages.current_index());
            return Ok(DeletionOutcome::PageRemoved { index, remaining });
        }

        if collection.rescan(opener.filter(), opener.lister().as_ref()) == 0 {
            return Ok(DeletionOutcome::Empty);
        }

        let dir = collection.dir().map(PathBuf::from).unwrap_or_default();
        let container = opener.open_pages(&dir, collection.paths().to_vec())?;
        pages.open(container)?;
        Ok(DeletionOutcome::Reopened { pointer: 0, path: dir })
    }
}
