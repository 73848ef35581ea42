//! Hex-entry state machine.
//!
//! A byte is edited as two hex keystrokes: the first digit lands in the
//! high nibble and enters `Editing`, the second composes the full byte and
//! returns to `Browsing`. Abort policy: any non-digit input while a digit
//! is pending discards the edit entirely and restores the byte that was
//! there before the first keystroke; a half-typed value never reaches the
//! backing store.

use crate::buffer::{Cursor, WindowBuffer, RECORD_SIZE};
use crate::error::HexError;

/// Editor state: browsing the window or mid-way through typing a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Browsing,
    /// First hex digit typed; `original` is the byte value before the
    /// edit began, kept so an abort can restore it.
    Editing { original: u8, high: u8 },
}

impl EditorState {
    /// Returns a display string for the state
    pub fn display(&self) -> &str {
        match self {
            EditorState::Browsing => "",
            EditorState::Editing { .. } => "-- EDIT --",
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditorState::Editing { .. })
    }
}

/// The single outstanding unflushed byte, addressed by file record and
/// column. The value travels with the mark so a flush retried after an
/// I/O failure does not depend on the record still being resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyByte {
    pub line: u64,
    pub col: usize,
    pub value: u8,
}

impl DirtyByte {
    /// Absolute byte offset of the marked position in the file.
    pub fn offset(&self) -> u64 {
        self.line * RECORD_SIZE as u64 + self.col as u64
    }
}

/// One logical input event, decoded from raw key input by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    /// A hex digit keystroke, already converted to its value (0..=15).
    HexDigit(u8),
    /// Escape or any key with no binding; aborts a pending edit.
    Cancel,
    Save,
    /// A validated search pattern, 1..=8 bytes.
    Search(Vec<u8>),
    Quit,
}

/// Result of handling an input event
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    /// Input was handled, continue
    Handled,
    /// Display a message to the user
    Message(String),
    /// Request quit
    Quit,
}

/// Mutable editor pieces the state machine operates on.
pub struct EditContext<'a> {
    pub window: &'a mut WindowBuffer,
    pub cursor: &'a Cursor,
    pub dirty: &'a mut Option<DirtyByte>,
}

impl EditorState {
    /// Feed one hex digit to the machine.
    ///
    /// Browsing: stash the current byte, write the digit into the high
    /// nibble, mark dirty, enter `Editing`. Editing: compose
    /// `high * 16 + digit`, mark dirty, return to `Browsing`. A digit
    /// aimed at a position with no byte under it (empty file) is ignored.
    pub fn feed_digit(&mut self, digit: u8, ctx: &mut EditContext) -> Result<(), HexError> {
        debug_assert!(digit < 16);

        let row = ctx.cursor.row;
        let col = ctx.cursor.col;

        match *self {
            EditorState::Browsing => {
                let Some(original) = ctx.window.record(row).and_then(|r| r.get(col)) else {
                    return Ok(());
                };

                let value = digit << 4;
                ctx.window.write_byte(row, col, value)?;
                *ctx.dirty = Some(DirtyByte {
                    line: ctx.window.base_line() + row as u64,
                    col,
                    value,
                });
                *self = EditorState::Editing {
                    original,
                    high: digit,
                };
            }
            EditorState::Editing { high, .. } => {
                let value = high * 16 + digit;
                ctx.window.write_byte(row, col, value)?;
                *ctx.dirty = Some(DirtyByte {
                    line: ctx.window.base_line() + row as u64,
                    col,
                    value,
                });
                *self = EditorState::Browsing;
            }
        }

        Ok(())
    }

    /// Abort a pending edit: restore the pre-edit byte, drop the dirty
    /// mark, return to `Browsing`. No-op while browsing.
    pub fn abort(&mut self, ctx: &mut EditContext) -> Result<(), HexError> {
        if let EditorState::Editing { original, .. } = *self {
            ctx.window.write_byte(ctx.cursor.row, ctx.cursor.col, original)?;
            *ctx.dirty = None;
            *self = EditorState::Browsing;
        }
        Ok(())
    }
}

/// Convert a hex character to its value, accepting both cases.
pub fn hex_digit(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}
