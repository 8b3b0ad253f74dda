//! Comic Reader Container Library
//!
//! Everything the reader touches outside its own memory: archives, directory
//! listings, image decoding, the trash, the clock and natural ordering of
//! names.
//!
//! Each external concern sits behind a small trait ([`ArchiveReader`],
//! [`DirectoryLister`], [`ImageDecoder`], [`Trash`]) with one production
//! implementation, so the navigation engine can be driven by fakes in tests.
//! [`ContainerOpener`] decides whether a path is read as an archive or as a
//! folder of images and returns an [`ImageContainer`] either way.

pub mod archive;
pub mod clock;
pub mod container;
pub mod decode;
pub mod error;
pub mod lister;
pub mod natural;
pub mod trash;

pub use archive::{ArchiveHandle, ArchiveReader, ZipArchiveReader};
pub use clock::{Clock, ManualClock, SystemClock};
pub use container::{
    display_name, parent_dir, ArchiveContainer, ArchiveReaderFactory, BrowseMode,
    ContainerOpener, FolderContainer, ImageContainer, MediaFilter,
};
pub use decode::{DecodedImage, ImageDecoder, RasterDecoder};
pub use error::{ContainerError, ContainerResult};
pub use lister::{DirectoryLister, FsLister};
pub use natural::{natural_cmp, natural_path_cmp, sort_names, sort_paths};
pub use trash::{DirectoryTrash, SystemTrash, Trash};
