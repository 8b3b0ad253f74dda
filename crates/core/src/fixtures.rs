//! Test doubles and on-disk fixtures shared by the engine's unit tests

use comic_reader_container::{
    ContainerError, ContainerResult, DecodedImage, ImageContainer, ImageDecoder, Trash,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).expect("png encode");
    bytes
}

pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("zip file should be created");
    let mut writer = zip::ZipWriter::new(file);
    for (entry, bytes) in entries {
        writer.start_file(*entry, SimpleFileOptions::default()).expect("start entry");
        writer.write_all(bytes).expect("write entry");
    }
    writer.finish().expect("finish zip");
    path
}

/// Zip with `pages` decodable PNG pages named `001.png`, `002.png`, ...
pub fn write_book(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let png = png_bytes(2, 2);
    let names: Vec<String> = (1..=pages).map(|i| format!("{i:03}.png")).collect();
    let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), png.as_slice())).collect();
    write_zip(dir, name, &entries)
}

/// Write `count` PNG files named `p1.png`, `p2.png`, ... into `dir`
pub fn write_images(dir: &Path, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|i| {
            let path = dir.join(format!("p{i}.png"));
            std::fs::write(&path, png_bytes(1, 1)).expect("write image");
            path
        })
        .collect()
}

/// In-memory container; every page decodes with [`FakeDecoder`] unless
/// marked corrupt
pub struct FakeContainer {
    source: PathBuf,
    entries: Vec<String>,
    bytes: Vec<Vec<u8>>,
}

impl FakeContainer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            source: PathBuf::from("/fake/book.zip"),
            entries: (1..=pages).map(|i| format!("page{i}.png")).collect(),
            bytes: vec![b"page".to_vec(); pages],
        }
    }

    pub fn corrupt(&mut self, index: usize) {
        self.bytes[index] = b"corrupt".to_vec();
    }

    pub fn set_bytes(&mut self, index: usize, bytes: Vec<u8>) {
        self.bytes[index] = bytes;
    }
}

impl ImageContainer for FakeContainer {
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
        Ok(self.bytes[index].clone())
    }

    fn page_path(&self, _index: usize) -> Option<PathBuf> {
        None
    }

    fn forget_entry(&mut self, index: usize) -> ContainerResult<String> {
        if index >= self.entries.len() {
            return Err(ContainerError::PageOutOfRange { index, page_count: self.entries.len() });
        }
        self.bytes.remove(index);
        Ok(self.entries.remove(index))
    }

    fn close(&mut self) {}
}

/// Decodes anything except `corrupt` into a 1x1 page, counting calls
#[derive(Default)]
pub struct FakeDecoder {
    calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, bytes: &[u8]) -> ContainerResult<DecodedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes == b"corrupt" {
            return Err(ContainerError::Corrupt("bad page".into()));
        }
        Ok(DecodedImage::from_rgba(RgbaImage::new(1, 1)))
    }
}

/// Trash that refuses every move
pub struct RefusingTrash;

impl Trash for RefusingTrash {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()> {
        Err(ContainerError::Trash { path: path.to_path_buf(), reason: "refused".into() })
    }
}

/// Trash that records moves, then performs them in a directory
pub struct RecordingTrash {
    inner: comic_reader_container::DirectoryTrash,
    moved: Mutex<Vec<PathBuf>>,
}

impl RecordingTrash {
    pub fn new(dir: &Path) -> Self {
        Self { inner: comic_reader_container::DirectoryTrash::new(dir), moved: Mutex::new(Vec::new()) }
    }

    pub fn moved(&self) -> Vec<PathBuf> {
        self.moved.lock().expect("lock").clone()
    }
}

impl Trash for RecordingTrash {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()> {
        self.inner.move_to_trash(path)?;
        self.moved.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
}

/// Trash that moves into a directory, then drops a new file next to the
/// trashed one, as another program might
pub struct ReplacingTrash {
    inner: comic_reader_container::DirectoryTrash,
    name: String,
    bytes: Vec<u8>,
}

impl ReplacingTrash {
    pub fn new(dir: &Path, name: &str, bytes: Vec<u8>) -> Self {
        Self { inner: comic_reader_container::DirectoryTrash::new(dir), name: name.to_owned(), bytes }
    }
}

impl Trash for ReplacingTrash {
    fn move_to_trash(&self, path: &Path) -> ContainerResult<()> {
        self.inner.move_to_trash(path)?;
        let sibling = path.parent().unwrap_or(Path::new(".")).join(&self.name);
        std::fs::write(sibling, &self.bytes)?;
        Ok(())
    }
}
