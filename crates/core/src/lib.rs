//! Comic Reader Core Library
//!
//! Navigation engine for browsing pages from archives or folders while
//! keeping only a small window of decoded pages in memory.
//!
//! # Architecture
//!
//! - [`PageCache`]: decoded pages around the current index of the open
//!   container, backed by a window-policy [`BoundedCache`]
//! - [`CollectionIndex`]: naturally sorted siblings of the opened path
//! - [`DeletionCoordinator`]: trash-then-update deletion with index remapping
//! - [`ScrollRateLimiter`]: wheel input gating with burst acceleration
//! - [`RemoteMemo`]: recency-cached remote text lookups
//! - [`Reader`]: the controller owning all of the above
//!
//! [`BoundedCache`]: comic_reader_cache::BoundedCache
//!
//! # Example
//!
//! ```no_run
//! use comic_reader_core::{Reader, ReaderConfig};
//! use std::path::Path;
//!
//! let mut reader = Reader::new(ReaderConfig::load(None)?);
//! reader.open_path(Path::new("/comics/vol1.cbz"))?;
//! let page = reader.current_page()?;
//! println!("{} ({}x{})", reader.status(), page.width, page.height);
//! reader.run_until_idle();
//! # Ok::<(), comic_reader_core::ReaderError>(())
//! ```

pub mod collection;
pub mod config;
pub mod deletion;
pub mod error;
pub mod memo;
pub mod page_cache;
pub mod reader;
pub mod scroll;

#[cfg(test)]
pub(crate) mod fixtures;

pub use collection::CollectionIndex;
pub use config::{ConfigError, ReaderConfig, ScrollConfig, ScrollPolarity, SpeedTier};
pub use deletion::{DeletionCoordinator, DeletionOutcome};
pub use error::{ReaderError, ReaderResult};
pub use memo::{RemoteError, RemoteMemo, RemoteService};
pub use page_cache::{PageCache, PageHandle};
pub use reader::{mode_name, Reader, ReaderStatus};
pub use scroll::{NavigationStep, ScrollRateLimiter};
