use crate::error::{ContainerError, ContainerResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Largest buffer reserved up front for one entry
const MAX_PREALLOCATION: u64 = 64 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveHandle(u64);

impl ArchiveHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Archive backend: list and read entries of an opened archive
pub trait ArchiveReader: Send {
    fn open(&mut self, path: &Path) -> ContainerResult<ArchiveHandle>;
    fn list_entries(&self, handle: ArchiveHandle) -> ContainerResult<Vec<String>>;
    fn read_entry(&mut self, handle: ArchiveHandle, name: &str) -> ContainerResult<Vec<u8>>;
    fn close(&mut self, handle: ArchiveHandle) -> ContainerResult<()>;
}

struct ZipRecord {
    archive: ZipArchive<BufReader<File>>,
    names: Vec<String>,
}

/// Zip backend
#[derive(Default)]
pub struct ZipArchiveReader {
    next_handle: u64,
    open: HashMap<ArchiveHandle, ZipRecord>,
}

impl ZipArchiveReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, handle: ArchiveHandle) -> ContainerResult<&ZipRecord> {
        self.open.get(&handle).ok_or(ContainerError::InvalidHandle(handle.raw()))
    }

    fn record_mut(&mut self, handle: ArchiveHandle) -> ContainerResult<&mut ZipRecord> {
        self.open.get_mut(&handle).ok_or(ContainerError::InvalidHandle(handle.raw()))
    }
}

impl ArchiveReader for ZipArchiveReader {
    fn open(&mut self, path: &Path) -> ContainerResult<ArchiveHandle> {
        if !path.exists() {
            return Err(ContainerError::PathNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|err| match err {
            ZipError::Io(io) => ContainerError::Io(io),
            _ => ContainerError::NotAnArchive(path.to_path_buf()),
        })?;

        // Directory entries carry no data.
        let names =
            archive.file_names().filter(|name| !name.ends_with('/')).map(str::to_owned).collect();

        self.next_handle += 1;
        let handle = ArchiveHandle(self.next_handle);
        self.open.insert(handle, ZipRecord { archive, names });

        Ok(handle)
    }

    fn list_entries(&self, handle: ArchiveHandle) -> ContainerResult<Vec<String>> {
        Ok(self.record(handle)?.names.clone())
    }

    fn read_entry(&mut self, handle: ArchiveHandle, name: &str) -> ContainerResult<Vec<u8>> {
        let record = self.record_mut(handle)?;
        let mut entry = record.archive.by_name(name).map_err(|err| match err {
            ZipError::FileNotFound => ContainerError::EntryNotFound(name.to_owned()),
            other => ContainerError::Corrupt(format!("{name}: {other}")),
        })?;

        let mut bytes = Vec::with_capacity(preallocation_hint(entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|err| ContainerError::Corrupt(format!("{name}: {err}")))?;

        Ok(bytes)
    }

    fn close(&mut self, handle: ArchiveHandle) -> ContainerResult<()> {
        self.open.remove(&handle).map(|_| ()).ok_or(ContainerError::InvalidHandle(handle.raw()))
    }
}

/// Buffer size to reserve for an entry whose header declares `declared` bytes
///
/// Headers can be forged, so the reservation is capped; the buffer still
/// grows to the real size while reading.
fn preallocation_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use zip::write::SimpleFileOptions;

    pub(crate) fn write_zip(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
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

    #[test]
    fn lists_and_reads_entries() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_zip(temp.path(), "book.zip", &[("b.png", b"bee"), ("a.png", b"ay")]);

        let mut reader = ZipArchiveReader::new();
        let handle = reader.open(&path).expect("open should succeed");

        let mut names = reader.list_entries(handle).expect("list should succeed");
        names.sort();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(reader.read_entry(handle, "b.png").expect("read"), b"bee");
    }

    #[test]
    fn missing_entry_is_reported() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_zip(temp.path(), "book.zip", &[("a.png", b"ay")]);

        let mut reader = ZipArchiveReader::new();
        let handle = reader.open(&path).expect("open should succeed");
        let err = reader.read_entry(handle, "zzz.png").expect_err("entry is absent");
        assert!(matches!(err, ContainerError::EntryNotFound(name) if name == "zzz.png"));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("fake.zip");
        std::fs::write(&path, b"definitely not a zip").expect("write fixture");

        let err = ZipArchiveReader::new().open(&path).expect_err("open should fail");
        assert!(matches!(err, ContainerError::NotAnArchive(_)));
    }

    #[test]
    fn closed_handle_is_invalid() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_zip(temp.path(), "book.zip", &[("a.png", b"ay")]);

        let mut reader = ZipArchiveReader::new();
        let handle = reader.open(&path).expect("open should succeed");
        reader.close(handle).expect("close should succeed");

        assert!(matches!(
            reader.list_entries(handle),
            Err(ContainerError::InvalidHandle(raw)) if raw == handle.raw()
        ));
    }

    #[test]
    fn preallocation_is_capped() {
        assert_eq!(preallocation_hint(12), 12);
        assert_eq!(preallocation_hint(0xFFFF_FFF0), 64 << 20);
        assert_eq!(preallocation_hint(u64::MAX), 64 << 20);
    }

    #[test]
    fn forged_entry_size_reads_real_bytes() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("forged.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).expect("create zip"));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("a.png", stored).expect("start entry");
        writer.write_all(b"ay").expect("write entry");
        writer.finish().expect("finish zip");

        let mut raw = std::fs::read(&path).expect("read zip");
        let forged = 0xFFFF_FFF0u32.to_le_bytes();
        for (signature, offset) in [(&b"PK\x03\x04"[..], 22), (&b"PK\x01\x02"[..], 24)] {
            let at = raw.windows(4).position(|w| w == signature).expect("header present");
            raw[at + offset..at + offset + 4].copy_from_slice(&forged);
        }
        std::fs::write(&path, raw).expect("write forged zip");

        let mut reader = ZipArchiveReader::new();
        let handle = reader.open(&path).expect("open should succeed");
        match reader.read_entry(handle, "a.png") {
            Ok(bytes) => assert_eq!(bytes, b"ay"),
            Err(err) => assert!(matches!(err, ContainerError::Corrupt(_)), "{err}"),
        }
    }
}
