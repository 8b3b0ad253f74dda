use crate::config::ConfigError;
use comic_reader_container::ContainerError;

/// Errors surfaced by the navigation engine
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Missing path, entry or position
    #[error("not found: {0}")]
    NotFound(String),

    /// Unreadable archive or image
    #[error("corrupt: {0}")]
    Corrupt(String),

    /// A filesystem or trash operation failed
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// No containers or pages remain
    #[error("nothing left to show")]
    Empty,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ReaderResult<T> = Result<T, ReaderError>;

impl From<ContainerError> for ReaderError {
    fn from(err: ContainerError) -> Self {
        let message = err.to_string();
        match err {
            ContainerError::NotAnArchive(_)
            | ContainerError::UnsupportedFormat(_)
            | ContainerError::Corrupt(_) => Self::Corrupt(message),
            ContainerError::PathNotFound(_)
            | ContainerError::EntryNotFound(_)
            | ContainerError::PageOutOfRange { .. }
            | ContainerError::InvalidHandle(_) => Self::NotFound(message),
            ContainerError::NoPages(_) => Self::Empty,
            ContainerError::Io(_) | ContainerError::Trash { .. } | ContainerError::Unsupported(_) => {
                Self::IoFailure(message)
            }
        }
    }
}
