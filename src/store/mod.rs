use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::buffer::{Record, RECORD_SIZE};
use crate::error::HexError;

/// Two-tier backing store for the editor.
///
/// Opening a file clones it to a working copy (`<file>.tmp`) and every read
/// and write goes against that copy. `commit` propagates the working copy
/// over the original; dropping the store deletes the working copy, so an
/// exit without saving discards all edits.
pub struct FileStore {
    file: File,
    size: u64,
    original: PathBuf,
    working: PathBuf,
}

impl FileStore {
    /// Open `path` for editing by cloning it to a working copy.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HexError> {
        let original = path.as_ref().to_path_buf();

        let mut working = OsString::from(original.as_os_str());
        working.push(".tmp");
        let working = PathBuf::from(working);

        // A stale working copy from a crashed session would make the clone fail.
        let _ = fs::remove_file(&working);
        reflink_copy::reflink_or_copy(&original, &working).map_err(HexError::Io)?;

        let file = OpenOptions::new().read(true).write(true).open(&working)?;
        let size = file.metadata()?.len();

        Ok(Self {
            file,
            size,
            original,
            working,
        })
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of 16-byte records, counting a trailing partial record.
    pub fn line_count(&self) -> u64 {
        self.size.div_ceil(RECORD_SIZE as u64)
    }

    pub fn path(&self) -> &Path {
        &self.original
    }

    /// Read the record at `line`. The last record of a file whose size is
    /// not a multiple of 16 comes back short; bytes past the end of the
    /// file are never read.
    pub fn read_record(&mut self, line: u64) -> Result<Record, HexError> {
        if line >= self.line_count() {
            return Err(HexError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("record {line} is beyond the end of the file"),
            )));
        }

        let offset = line * RECORD_SIZE as u64;
        let len = (self.size - offset).min(RECORD_SIZE as u64) as usize;

        let mut bytes = [0u8; RECORD_SIZE];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut bytes[..len])?;

        Ok(Record::new(bytes, len))
    }

    /// Read `buf.len()` bytes starting at `offset`. Used by the pattern
    /// scan, which walks the file in chunks instead of whole records.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), HexError> {
        if offset + buf.len() as u64 > self.size {
            return Err(HexError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past the end of the file",
            )));
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Write a single byte into the working copy. The write is flushed
    /// before returning so the next read of the same offset observes it.
    pub fn write_byte(&mut self, offset: u64, value: u8) -> Result<(), HexError> {
        if offset >= self.size {
            return Err(HexError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "write past the end of the file",
            )));
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&[value])?;
        self.file.flush()?;
        Ok(())
    }

    /// Propagate the working copy over the original file.
    pub fn commit(&mut self) -> Result<(), HexError> {
        self.file.flush()?;
        fs::copy(&self.working, &self.original)?;
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.working);
    }
}
