//! Session orchestration: cursor movement, window scrolling at the edges,
//! dirty-byte flushing, search jumps.

use std::path::Path;

use crate::buffer::{Cursor, WindowBuffer, RECORD_SIZE};
use crate::error::HexError;
use crate::mode::{DirtyByte, EditContext, EditorState, InputEvent, InputResult};
use crate::search;
use crate::store::FileStore;

/// Owns every mutable piece of the editor: the store handle, the window,
/// the cursor, the edit state, and the single outstanding dirty byte.
/// One logical event is processed to completion (flush, transition, at
/// most one scroll) before the caller draws the next frame.
pub struct EditorSession {
    store: FileStore,
    window: WindowBuffer,
    cursor: Cursor,
    state: EditorState,
    dirty: Option<DirtyByte>,
    modified: bool,
}

impl EditorSession {
    /// Open `path` for editing: clone the working copy and load the first
    /// window of records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HexError> {
        let mut store = FileStore::open(path)?;
        let window = WindowBuffer::new(&mut store)?;

        Ok(Self {
            store,
            window,
            cursor: Cursor::new(),
            state: EditorState::Browsing,
            dirty: None,
            modified: false,
        })
    }

    pub fn window(&self) -> &WindowBuffer {
        &self.window
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn file_path(&self) -> &Path {
        self.store.path()
    }

    pub fn file_size(&self) -> u64 {
        self.store.size()
    }

    /// Whether any edit has been flushed to the working copy since the
    /// last save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Absolute file offset of the byte under the cursor.
    pub fn cursor_offset(&self) -> u64 {
        (self.window.base_line() + self.cursor.row as u64) * RECORD_SIZE as u64
            + self.cursor.col as u64
    }

    /// Process one logical input event.
    ///
    /// I/O failures abort the event and surface as a notification; the
    /// in-memory state stays consistent and a pending flush is retried on
    /// the next event. `Bounds` errors are invariant violations and
    /// propagate.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<InputResult, HexError> {
        match self.dispatch(event) {
            Ok(result) => Ok(result),
            Err(HexError::Io(e)) => Ok(InputResult::Message(format!("i/o error: {e}"))),
            Err(other) => Err(other),
        }
    }

    fn dispatch(&mut self, event: InputEvent) -> Result<InputResult, HexError> {
        // Retry a pending flush before anything else runs; a byte that
        // cannot reach the store blocks further edits instead of being
        // silently dropped.
        self.flush_dirty()?;

        match event {
            InputEvent::Up => {
                self.abort_edit()?;
                if self.cursor.row > 0 {
                    self.cursor.move_up();
                } else {
                    self.window.scroll_up(&mut self.store)?;
                }
                self.clamp_cursor_col();
                Ok(InputResult::Handled)
            }
            InputEvent::Down => {
                self.abort_edit()?;
                if self.cursor.row + 1 < self.window.capacity() {
                    self.cursor.move_down(self.window.capacity() - 1);
                } else {
                    self.window.scroll_down(&mut self.store)?;
                }
                self.clamp_cursor_col();
                Ok(InputResult::Handled)
            }
            InputEvent::Left => {
                self.abort_edit()?;
                self.cursor.move_left();
                Ok(InputResult::Handled)
            }
            InputEvent::Right => {
                self.abort_edit()?;
                let max_col = self.current_record_len().saturating_sub(1);
                self.cursor.move_right(max_col);
                Ok(InputResult::Handled)
            }
            InputEvent::HexDigit(digit) => {
                let mut ctx = EditContext {
                    window: &mut self.window,
                    cursor: &self.cursor,
                    dirty: &mut self.dirty,
                };
                self.state.feed_digit(digit, &mut ctx)?;
                // A fully composed byte is flushed before the next frame.
                self.flush_dirty()?;
                Ok(InputResult::Handled)
            }
            InputEvent::Cancel => {
                self.abort_edit()?;
                Ok(InputResult::Handled)
            }
            InputEvent::Save => {
                self.abort_edit()?;
                self.store.commit()?;
                self.modified = false;
                Ok(InputResult::Message(format!(
                    "written to {}",
                    self.store.path().display()
                )))
            }
            InputEvent::Search(pattern) => {
                self.abort_edit()?;
                match search::find(&mut self.store, &pattern)? {
                    Some(offset) => {
                        self.jump_to(offset)?;
                        Ok(InputResult::Message(format!("LOCATION: 0x{offset:08X}")))
                    }
                    None => Ok(InputResult::Message("LOCATION: NOT FOUND".into())),
                }
            }
            InputEvent::Quit => Ok(InputResult::Quit),
        }
    }

    /// Write the outstanding dirty byte through to the store. Only runs
    /// while browsing; a half-typed edit is never flushed. On failure the
    /// mark is kept so the flush is retried on the next event.
    fn flush_dirty(&mut self) -> Result<(), HexError> {
        if !matches!(self.state, EditorState::Browsing) {
            return Ok(());
        }
        if let Some(mark) = self.dirty {
            self.store.write_byte(mark.offset(), mark.value)?;
            self.dirty = None;
            self.modified = true;
        }
        Ok(())
    }

    fn abort_edit(&mut self) -> Result<(), HexError> {
        let mut ctx = EditContext {
            window: &mut self.window,
            cursor: &self.cursor,
            dirty: &mut self.dirty,
        };
        self.state.abort(&mut ctx)
    }

    /// Rebase the window on a search hit and park the cursor on the
    /// matched byte.
    fn jump_to(&mut self, offset: u64) -> Result<(), HexError> {
        let line = offset / RECORD_SIZE as u64;
        self.window.reposition(&mut self.store, line)?;
        self.cursor.row = (line - self.window.base_line()) as usize;
        self.cursor.col = (offset % RECORD_SIZE as u64) as usize;
        Ok(())
    }

    fn current_record_len(&self) -> usize {
        self.window
            .record(self.cursor.row)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    /// Keep the cursor on a valid byte after a vertical move onto the
    /// (possibly short) last record.
    fn clamp_cursor_col(&mut self) {
        let max_col = self.current_record_len().saturating_sub(1);
        self.cursor.clamp_col(max_col);
    }
}
