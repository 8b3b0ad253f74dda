use crate::error::{ContainerError, ContainerResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory listing boundary, used for folder pages and sibling discovery
pub trait DirectoryLister: Send + Sync {
    /// Immediate child files of `dir`, unsorted
    ///
    /// Subdirectories are left out, so callers never touch the filesystem
    /// to tell files apart.
    fn list_dir(&self, dir: &Path) -> ContainerResult<Vec<PathBuf>>;
}

/// Lists the real filesystem, one level deep
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_dir(&self, dir: &Path) -> ContainerResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ContainerError::PathNotFound(dir.to_path_buf()));
        }

        let mut children = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            // Symlinked files count; `file_type` alone would not follow them.
            if entry.path().is_file() {
                children.push(entry.into_path());
            }
        }

        Ok(children)
    }
}
