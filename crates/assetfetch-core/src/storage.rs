//! Destination file handling: append/truncate writer, staging path, completeness check.
//!
//! The destination file is its own resume checkpoint: every chunk is written
//! and flushed before progress is acknowledged, so the on-disk length is
//! always a valid offset for the next range request.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix of the staging file an in-flight fetch writes into.
pub const PART_SUFFIX: &str = ".part";

/// Sequential writer over one destination file.
#[derive(Debug)]
pub struct DestinationWriter {
    file: File,
    /// Length of the file when the writer was opened (resume offset).
    start_offset: u64,
    written: u64,
}

impl DestinationWriter {
    /// Open for append, keeping the current contents (resume).
    pub fn open_append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let start_offset = file.metadata()?.len();
        Ok(Self {
            file,
            start_offset,
            written: 0,
        })
    }

    /// Open for a full rewrite starting at offset 0.
    pub fn create_truncate(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file,
            start_offset: 0,
            written: 0,
        })
    }

    /// Write one chunk and flush it to the OS before returning.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.file.flush()?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written by this writer (excludes the resume offset).
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Total bytes now in the file.
    pub fn file_len(&self) -> u64 {
        self.start_offset + self.written
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

}

/// `<destination>.part`
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Size of the file at `path`, or 0 if it does not exist.
pub fn existing_len(path: &Path) -> io::Result<u64> {
    match fs::metadata(path) {
        Ok(m) if m.is_file() => Ok(m.len()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Whether `len` bytes on disk count as a complete copy of a resource of `expected` bytes.
///
/// With an unknown expected size any non-empty file is complete.
pub fn is_complete(len: u64, expected: Option<u64>, tolerance: f64) -> bool {
    if len == 0 {
        return false;
    }
    match expected {
        None => true,
        Some(0) => true,
        Some(exp) => len as f64 >= exp as f64 * tolerance,
    }
}

/// Create `destination`'s parent directory if absent.
pub fn ensure_parent_dir(destination: &Path) -> io::Result<()> {
    match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Atomically move the staging file onto its final name.
pub fn finalize(staging: &Path, destination: &Path) -> io::Result<()> {
    fs::rename(staging, destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_existing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.bin");
        fs::write(&p, b"hello ").unwrap();
        let mut w = DestinationWriter::open_append(&p).unwrap();
        assert_eq!(w.start_offset(), 6);
        w.write_chunk(b"world").unwrap();
        assert_eq!(w.written(), 5);
        assert_eq!(w.file_len(), 11);
        drop(w);
        assert_eq!(fs::read(&p).unwrap(), b"hello world");
    }

    #[test]
    fn truncate_discards_existing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.bin");
        fs::write(&p, b"corrupt partial data").unwrap();
        let mut w = DestinationWriter::create_truncate(&p).unwrap();
        w.write_chunk(b"ok").unwrap();
        drop(w);
        assert_eq!(fs::read(&p).unwrap(), b"ok");
    }

    #[test]
    fn completeness_threshold() {
        assert!(!is_complete(0, None, 0.95));
        assert!(is_complete(1, None, 0.95));
        assert!(is_complete(95, Some(100), 0.95));
        assert!(!is_complete(94, Some(100), 0.95));
        assert!(!is_complete(99, Some(100), 1.0));
        assert!(is_complete(100, Some(100), 1.0));
    }

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/x/home_hero_office_01.mp4")),
            PathBuf::from("/x/home_hero_office_01.mp4.part")
        );
    }

    #[test]
    fn existing_len_of_missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(existing_len(&dir.path().join("nope")).unwrap(), 0);
        assert!(existing_len(dir.path()).is_err());
    }
}
