//! Linear byte-pattern search over the backing file.
//!
//! The scan reads the file in bounded chunks and compares raw byte slices,
//! so zero bytes and non-printable bytes in the pattern or the data are
//! matched like any other value. The in-memory window is not consulted.

use crate::error::HexError;
use crate::store::FileStore;

/// Longest accepted pattern: 16 hex digits of input.
pub const MAX_PATTERN_BYTES: usize = 8;

/// Bytes read from the store per scan step.
const SCAN_CHUNK: usize = 4096;

/// Parse the user's hex text into the pattern bytes.
///
/// Accepts an optional `0x` prefix. Rejects empty input, non-hex
/// characters, an odd digit count, and patterns longer than
/// [`MAX_PATTERN_BYTES`]; rejection leaves no trace in editor state.
pub fn parse_pattern(input: &str) -> Result<Vec<u8>, HexError> {
    let digits = input.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(HexError::InvalidInput("search pattern is empty".into()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidInput(
            "search pattern must contain only hex digits".into(),
        ));
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::InvalidInput(
            "search pattern needs an even number of hex digits".into(),
        ));
    }
    if digits.len() / 2 > MAX_PATTERN_BYTES {
        return Err(HexError::InvalidInput(format!(
            "search pattern is limited to {MAX_PATTERN_BYTES} bytes"
        )));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| HexError::InvalidInput("search pattern must contain only hex digits".into()))
        })
        .collect()
}

/// Scan the file from offset 0 for the first occurrence of `pattern`.
///
/// Chunks overlap by `pattern.len() - 1` bytes so a match straddling a
/// chunk boundary is still found. Returns the absolute byte offset of the
/// first match, or `None`.
pub fn find(store: &mut FileStore, pattern: &[u8]) -> Result<Option<u64>, HexError> {
    let size = store.size();
    if pattern.is_empty() || (pattern.len() as u64) > size {
        return Ok(None);
    }

    let mut buf = vec![0u8; SCAN_CHUNK + pattern.len() - 1];
    let mut offset = 0u64;

    while offset + pattern.len() as u64 <= size {
        let want = (buf.len() as u64).min(size - offset) as usize;
        store.read_at(offset, &mut buf[..want])?;

        for p in 0..=(want - pattern.len()) {
            if &buf[p..p + pattern.len()] == pattern {
                return Ok(Some(offset + p as u64));
            }
        }

        // Next untested position; re-reads pattern.len() - 1 tail bytes.
        offset += (want - pattern.len() + 1) as u64;
    }

    Ok(None)
}
