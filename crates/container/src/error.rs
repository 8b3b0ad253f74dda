use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an archive: {}", .0.display())]
    NotAnArchive(PathBuf),
    #[error("corrupt data: {0}")]
    Corrupt(String),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("entry not found: {0}")]
    EntryNotFound(String),
    #[error("page {index} out of range (page_count={page_count})")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("invalid archive handle {0}")]
    InvalidHandle(u64),
    #[error("no image pages in {}", .0.display())]
    NoPages(PathBuf),
    #[error("could not move {} to trash: {reason}", .path.display())]
    Trash { path: PathBuf, reason: String },
    #[error("{0} is not supported by this container")]
    Unsupported(&'static str),
}

pub type ContainerResult<T> = Result<T, ContainerError>;
