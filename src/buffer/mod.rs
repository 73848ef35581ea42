pub mod cursor;


use crate::error::HexError;
use crate::store::FileStore;

pub use cursor::Cursor;

/// Bytes per record (one screen row).
pub const RECORD_SIZE: usize = 16;

/// Default window height in records; shrunk at open time for short files.
pub const DEFAULT_WINDOW_HEIGHT: usize = 10;

/// One 16-byte slice of the file, independently owned once loaded.
///
/// `len` is the number of valid bytes: 16 everywhere except the trailing
/// record of a file whose size is not a multiple of 16. Bytes past `len`
/// are padding and are never exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    bytes: [u8; RECORD_SIZE],
    len: usize,
}

impl Record {
    pub fn new(bytes: [u8; RECORD_SIZE], len: usize) -> Self {
        debug_assert!(len <= RECORD_SIZE);
        Self { bytes, len }
    }

    pub fn empty() -> Self {
        Self {
            bytes: [0; RECORD_SIZE],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes of the record.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn get(&self, col: usize) -> Option<u8> {
        self.bytes().get(col).copied()
    }
}

/// Fixed-capacity window of contiguous records slid over the file.
///
/// `records[i]` always mirrors file record `base_line + i`, except for a
/// byte holding an uncommitted edit. The window never grows or shrinks
/// after open; scrolling loads one record at the incoming edge and evicts
/// the record at the opposite edge, an O(capacity) shift.
pub struct WindowBuffer {
    records: Vec<Record>,
    base_line: u64,
}

impl WindowBuffer {
    /// Build the window at the top of the file. Capacity is the default
    /// height, reduced to the file's record count for short files; an
    /// empty file still gets a capacity-1 window over one empty record.
    pub fn new(store: &mut FileStore) -> Result<Self, HexError> {
        let lines = store.line_count();

        if lines == 0 {
            return Ok(Self {
                records: vec![Record::empty()],
                base_line: 0,
            });
        }

        let capacity = lines.min(DEFAULT_WINDOW_HEIGHT as u64) as usize;
        let records = (0..capacity as u64)
            .map(|line| store.read_record(line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            records,
            base_line: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// File record-index of the window's top row.
    pub fn base_line(&self) -> u64 {
        self.base_line
    }

    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Scroll one record toward the start of the file: the incoming record
    /// lands at the top and the bottom record is evicted. Returns `false`
    /// without touching the window when already at the start.
    pub fn scroll_up(&mut self, store: &mut FileStore) -> Result<bool, HexError> {
        if self.base_line == 0 {
            return Ok(false);
        }

        // Load before shifting so an I/O failure leaves the window intact.
        let incoming = store.read_record(self.base_line - 1)?;
        self.records.rotate_right(1);
        self.records[0] = incoming;
        self.base_line -= 1;
        Ok(true)
    }

    /// Scroll one record toward the end of the file: the incoming record
    /// lands at the bottom and the top record is evicted. Returns `false`
    /// without touching the window when the last record is already resident.
    pub fn scroll_down(&mut self, store: &mut FileStore) -> Result<bool, HexError> {
        if self.base_line + self.capacity() as u64 >= store.line_count() {
            return Ok(false);
        }

        let incoming = store.read_record(self.base_line + self.capacity() as u64)?;
        self.records.rotate_left(1);
        let bottom = self.capacity() - 1;
        self.records[bottom] = incoming;
        self.base_line += 1;
        Ok(true)
    }

    /// Reload the whole window so that `target_line` is resident, clamping
    /// the base so a full window of records stays in range. Used for
    /// search jumps. The old window survives a mid-read failure.
    pub fn reposition(&mut self, store: &mut FileStore, target_line: u64) -> Result<(), HexError> {
        let max_base = store.line_count().saturating_sub(self.capacity() as u64);
        let base = target_line.min(max_base);

        let records = (0..self.capacity() as u64)
            .map(|i| store.read_record(base + i))
            .collect::<Result<Vec<_>, _>>()?;

        self.records = records;
        self.base_line = base;
        Ok(())
    }

    /// Read the byte at a window position.
    pub fn read_byte(&self, row: usize, col: usize) -> Result<u8, HexError> {
        self.records
            .get(row)
            .and_then(|record| record.get(col))
            .ok_or(HexError::Bounds { row, col })
    }

    /// Overwrite the byte at a window position. No file I/O happens here;
    /// the caller marks the byte dirty and flushes it later.
    pub fn write_byte(&mut self, row: usize, col: usize, value: u8) -> Result<(), HexError> {
        match self.records.get_mut(row) {
            Some(record) if col < record.len => {
                record.bytes[col] = value;
                Ok(())
            }
            _ => Err(HexError::Bounds { row, col }),
        }
    }
}
