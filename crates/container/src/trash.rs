//! Moving resources to a trash location
//!
//! Both backends either move the file or fail; neither ever falls back to
//! permanent deletion.

use crate::error::{ContainerError, ContainerResult};
use std::fs;
use std::path::{Path, PathBuf};

pub trait Trash: Send + Sync {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()>;
}

/// The platform recycle bin
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()> {
        if !path.exists() {
            return Err(ContainerError::PathNotFound(path.to_path_buf()));
        }

        trash::delete(path).map_err(|err| ContainerError::Trash {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

/// Moves files into a plain directory, renaming on collision
#[derive(Debug, Clone)]
pub struct DirectoryTrash {
    dir: PathBuf,
}

impl DirectoryTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn destination(&self, path: &Path) -> ContainerResult<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| ContainerError::PathNotFound(path.to_path_buf()))?
            .to_string_lossy()
            .into_owned();

        let mut candidate = self.dir.join(&name);
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{counter}-{name}"));
            counter += 1;
        }

        Ok(candidate)
    }
}

impl Trash for DirectoryTrash {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()> {
        if !path.exists() {
            return Err(ContainerError::PathNotFound(path.to_path_buf()));
        }

        let failed = |err: std::io::Error| ContainerError::Trash {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(failed)?;
        let destination = self.destination(path)?;
        fs::rename(path, &destination).map_err(failed)?;

        tracing::debug!(from = %path.display(), to = %destination.display(), "moved to trash directory");
        Ok(())
    }
}
