//! Sibling containers of the opened path
//!
//! Built from the directory of an anchor path: every sibling matching the
//! browse mode's filter, naturally sorted, with a pointer at the anchor.

use comic_reader_container::{parent_dir, sort_paths, BrowseMode, DirectoryLister, MediaFilter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CollectionIndex {
    mode: BrowseMode,
    dir: Option<PathBuf>,
    paths: Vec<PathBuf>,

    /// `None` exactly when `paths` is empty
    pointer: Option<usize>,
}

impl CollectionIndex {
    pub fn empty(mode: BrowseMode) -> Self {
        Self { mode, dir: None, paths: Vec::new(), pointer: None }
    }

    /// List the siblings of `anchor` and point at it
    ///
    /// If the listing fails or `anchor` is not part of it, the collection
    /// degrades to `anchor` alone.
    pub fn build(
        anchor: &Path,
        mode: BrowseMode,
        filter: &MediaFilter,
        lister: &dyn DirectoryLister,
    ) -> Self {
        let dir = parent_dir(anchor);
        let listed = list_matching(&dir, mode, filter, lister);

        // Listed paths are `dir` joined with a name; compare the anchor the same way.
        let joined = anchor.file_name().map(|name| dir.join(name));
        let position = listed.iter().position(|path| {
            joined.as_deref().is_some_and(|joined| path == joined) || same_path(path, anchor)
        });
        let (paths, pointer) = match position {
            Some(position) => (listed, position),
            None => {
                tracing::debug!(anchor = %anchor.display(), "anchor not among siblings");
                (vec![anchor.to_path_buf()], 0)
            }
        };

        tracing::info!(
            dir = %dir.display(),
            ?mode,
            len = paths.len(),
            pointer,
            "collection built"
        );

        Self { mode, dir: Some(dir), paths, pointer: Some(pointer) }
    }

    /// List `dir` itself, pointing at its first entry
    pub fn scan(
        dir: &Path,
        mode: BrowseMode,
        filter: &MediaFilter,
        lister: &dyn DirectoryLister,
    ) -> Self {
        let paths = list_matching(dir, mode, filter, lister);
        let pointer = if paths.is_empty() { None } else { Some(0) };
        tracing::info!(dir = %dir.display(), ?mode, len = paths.len(), "collection scanned");
        Self { mode, dir: Some(dir.to_path_buf()), paths, pointer }
    }

    /// Re-list the anchor directory, pointing at its first entry
    ///
    /// # Returns
    ///
    /// The new length.
    pub fn rescan(&mut self, filter: &MediaFilter, lister: &dyn DirectoryLister) -> usize {
        let Some(dir) = &self.dir else {
            return self.paths.len();
        };

        self.paths = list_matching(dir, self.mode, filter, lister);
        self.pointer = if self.paths.is_empty() { None } else { Some(0) };
        tracing::info!(dir = %dir.display(), len = self.paths.len(), "collection rescanned");
        self.paths.len()
    }

    /// Move the pointer by `delta`, clamped to both ends
    ///
    /// # Returns
    ///
    /// Whether the pointer changed.
    pub fn navigate(&mut self, delta: isize) -> bool {
        let Some(pointer) = self.pointer else {
            return false;
        };

        let target = pointer.saturating_add_signed(delta).min(self.paths.len() - 1);
        self.pointer = Some(target);
        target != pointer
    }

    /// Point at `index` if it is in range
    pub fn set_pointer(&mut self, index: usize) -> bool {
        if index >= self.paths.len() {
            return false;
        }
        self.pointer = Some(index);
        true
    }

    /// Remove the entry at the pointer
    ///
    /// The pointer then refers to the entry that followed the removed one,
    /// or to the new last entry if the last one was removed, or to nothing.
    pub fn remove_current(&mut self) -> Option<PathBuf> {
        let pointer = self.pointer?;
        let removed = self.paths.remove(pointer);

        self.pointer = match self.paths.len() {
            0 => None,
            len if pointer >= len => Some(len - 1),
            _ => Some(pointer),
        };

        Some(removed)
    }

    pub fn current(&self) -> Option<&Path> {
        self.pointer.and_then(|pointer| self.paths.get(pointer)).map(PathBuf::as_path)
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.pointer == Some(0)
    }

    pub fn is_last(&self) -> bool {
        self.pointer.is_some_and(|pointer| pointer + 1 == self.paths.len())
    }
}

fn list_matching(
    dir: &Path,
    mode: BrowseMode,
    filter: &MediaFilter,
    lister: &dyn DirectoryLister,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = match lister.list_dir(dir) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "listing failed");
            return Vec::new();
        }
    };

    paths.retain(|path| filter.matches(mode, path));
    sort_paths(&mut paths);
    paths.dedup();
    paths
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
