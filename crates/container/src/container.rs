//! Image containers: an archive or a folder exposing ordered pages
//!
//! Downstream code works against [`ImageContainer`] only. Which variant
//! backs it is decided once, by [`ContainerOpener::open`].

use crate::archive::{ArchiveHandle, ArchiveReader, ZipArchiveReader};
use crate::error::{ContainerError, ContainerResult};
use crate::lister::{DirectoryLister, FsLister};
use crate::natural::{sort_names, sort_paths};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which siblings make up a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseMode {
    /// Each archive file in a directory is a container
    Archives,

    /// The image files of one directory are the pages of a folder container
    Images,
}

/// File extension filters for archives and page images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    pub archive_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["zip".into(), "cbz".into()],
            image_extensions: ["png", "jpg", "jpeg", "bmp", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl MediaFilter {
    pub fn is_archive(&self, path: &Path) -> bool {
        has_extension(path, &self.archive_extensions)
    }

    pub fn is_image(&self, name: &str) -> bool {
        has_extension(Path::new(name), &self.image_extensions)
    }

    /// Whether `path` belongs to a collection browsed in `mode`
    pub fn matches(&self, mode: BrowseMode, path: &Path) -> bool {
        match mode {
            BrowseMode::Archives => self.is_archive(path),
            BrowseMode::Images => self.is_image(&path.to_string_lossy()),
        }
    }

    /// Browse mode implied by opening `path`
    pub fn mode_for(&self, path: &Path) -> BrowseMode {
        if self.is_archive(path) {
            BrowseMode::Archives
        } else {
            BrowseMode::Images
        }
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// An opened archive or folder with naturally ordered page entries
pub trait ImageContainer: Send {
    /// Path the container was opened from (archive file or folder)
    fn source(&self) -> &Path;

    /// Page entry names in reading order
    fn entries(&self) -> &[String];

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Raw bytes of the named entry
    fn read_entry(&mut self, name: &str) -> ContainerResult<Vec<u8>>;

    /// Raw bytes of the page at `index`
    fn read_index(&mut self, index: usize) -> ContainerResult<Vec<u8>> {
        let name = self
            .entries()
            .get(index)
            .cloned()
            .ok_or(ContainerError::PageOutOfRange { index, page_count: self.len() })?;
        self.read_entry(&name)
    }

    /// Standalone file backing the page at `index`, if pages are files
    fn page_path(&self, index: usize) -> Option<PathBuf>;

    /// Drop the page at `index` after its backing file was removed
    fn forget_entry(&mut self, index: usize) -> ContainerResult<String>;

    /// Release backend resources; further reads fail
    fn close(&mut self);
}

/// Pages are the image entries of an archive
pub struct ArchiveContainer {
    source: PathBuf,
    reader: Box<dyn ArchiveReader>,
    handle: Option<ArchiveHandle>,
    entries: Vec<String>,
}

impl ArchiveContainer {
    /// Open `path` with `reader`, keeping only image entries
    ///
    /// An archive without any image entry is reported as
    /// [`ContainerError::NoPages`] and left closed.
    pub fn open(
        path: &Path,
        mut reader: Box<dyn ArchiveReader>,
        filter: &MediaFilter,
    ) -> ContainerResult<Self> {
        let handle = reader.open(path)?;

        let mut entries: Vec<String> = match reader.list_entries(handle) {
            Ok(names) => names.into_iter().filter(|name| filter.is_image(name)).collect(),
            Err(err) => {
                let _ = reader.close(handle);
                return Err(err);
            }
        };

        if entries.is_empty() {
            let _ = reader.close(handle);
            return Err(ContainerError::NoPages(path.to_path_buf()));
        }

        sort_names(&mut entries);

        Ok(Self { source: path.to_path_buf(), reader, handle: Some(handle), entries })
    }
}

impl ImageContainer for ArchiveContainer {
    fn source(&self) -> &Path {
        &self.source
    }

    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn read_entry(&mut self, name: &str) -> ContainerResult<Vec<u8>> {
        let handle = self.handle.ok_or(ContainerError::Unsupported("reading a closed archive"))?;
        self.reader.read_entry(handle, name)
    }

    fn page_path(&self, _index: usize) -> Option<PathBuf> {
        None
    }

    fn forget_entry(&mut self, _index: usize) -> ContainerResult<String> {
        Err(ContainerError::Unsupported("removing a page from an archive"))
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.reader.close(handle) {
                tracing::warn!(source = %self.source.display(), %err, "archive close failed");
            }
        }
    }
}

impl Drop for ArchiveContainer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pages are image files of one directory
#[derive(Debug, Clone)]
pub struct FolderContainer {
    source: PathBuf,
    paths: Vec<PathBuf>,
    entries: Vec<String>,
}

impl FolderContainer {
    /// List the image files of `dir` in natural order
    pub fn open(dir: &Path, lister: &dyn DirectoryLister, filter: &MediaFilter) -> ContainerResult<Self> {
        let paths: Vec<PathBuf> = lister
            .list_dir(dir)?
            .into_iter()
            .filter(|path| filter.matches(BrowseMode::Images, path))
            .collect();

        Self::from_paths(dir, paths)
    }

    /// Build a folder container from already discovered page files
    pub fn from_paths(dir: &Path, mut paths: Vec<PathBuf>) -> ContainerResult<Self> {
        if paths.is_empty() {
            return Err(ContainerError::NoPages(dir.to_path_buf()));
        }

        sort_paths(&mut paths);
        let entries = paths.iter().map(|path| display_name(path)).collect();

        Ok(Self { source: dir.to_path_buf(), paths, entries })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl ImageContainer for FolderContainer {
    fn source(&self) -> &Path {
        &self.source
    }

    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn read_entry(&mut self, name: &str) -> ContainerResult<Vec<u8>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry == name)
            .ok_or_else(|| ContainerError::EntryNotFound(name.to_owned()))?;
        self.read_index(index)
    }

    fn read_index(&mut self, index: usize) -> ContainerResult<Vec<u8>> {
        let path = self
            .paths
            .get(index)
            .ok_or(ContainerError::PageOutOfRange { index, page_count: self.paths.len() })?;

        std::fs::read(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ContainerError::PathNotFound(path.clone()),
            _ => ContainerError::Io(err),
        })
    }

    fn page_path(&self, index: usize) -> Option<PathBuf> {
        self.paths.get(index).cloned()
    }

    fn forget_entry(&mut self, index: usize) -> ContainerResult<String> {
        if index >= self.paths.len() {
            return Err(ContainerError::PageOutOfRange { index, page_count: self.paths.len() });
        }

        self.paths.remove(index);
        Ok(self.entries.remove(index))
    }

    fn close(&mut self) {}
}

/// Display name of a path: its file name, or the whole path if it has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Directory holding `path`; a bare file name lives in `.`
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Produces a fresh archive backend per opened container
pub type ArchiveReaderFactory = Arc<dyn Fn() -> Box<dyn ArchiveReader> + Send + Sync>;

/// Chooses and opens the right container variant for a path
#[derive(Clone)]
pub struct ContainerOpener {
    filter: MediaFilter,
    archives: ArchiveReaderFactory,
    lister: Arc<dyn DirectoryLister>,
}

impl ContainerOpener {
    /// Zip archives and the real filesystem
    pub fn new(filter: MediaFilter) -> Self {
        Self {
            filter,
            archives: Arc::new(|| Box::new(ZipArchiveReader::new()) as Box<dyn ArchiveReader>),
            lister: Arc::new(FsLister),
        }
    }

    /// Use a different archive backend
    pub fn with_archive_reader(mut self, factory: ArchiveReaderFactory) -> Self {
        self.archives = factory;
        self
    }

    /// Use a different directory lister
    pub fn with_lister(mut self, lister: Arc<dyn DirectoryLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    pub fn lister(&self) -> &Arc<dyn DirectoryLister> {
        &self.lister
    }

    /// Open `path` as an archive, a folder, or the folder of an image file
    pub fn open(&self, path: &Path) -> ContainerResult<Box<dyn ImageContainer>> {
        if !path.exists() {
            return Err(ContainerError::PathNotFound(path.to_path_buf()));
        }

        if path.is_dir() {
            let folder = FolderContainer::open(path, self.lister.as_ref(), &self.filter)?;
            return Ok(Box::new(folder));
        }

        if self.filter.is_archive(path) {
            let archive = ArchiveContainer::open(path, (self.archives)(), &self.filter)?;
            tracing::info!(source = %path.display(), pages = archive.len(), "archive opened");
            return Ok(Box::new(archive));
        }

        if self.filter.is_image(&path.to_string_lossy()) {
            let dir = parent_dir(path);
            let folder = FolderContainer::open(&dir, self.lister.as_ref(), &self.filter)?;
            return Ok(Box::new(folder));
        }

        Err(ContainerError::NotAnArchive(path.to_path_buf()))
    }

    /// Open a folder container over known page files
    pub fn open_pages(&self, dir: &Path, pages: Vec<PathBuf>) -> ContainerResult<Box<dyn ImageContainer>> {
        Ok(Box::new(FolderContainer::from_paths(dir, pages)?))
    }
}
