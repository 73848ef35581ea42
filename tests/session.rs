use std::fs;
use std::io::Write;
use std::path::PathBuf;

use hexed::{EditorSession, InputEvent, InputResult, RECORD_SIZE};

use proptest::prelude::*;

fn fixture(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn working_copy_of(f: &tempfile::NamedTempFile) -> PathBuf {
    PathBuf::from(format!("{}.tmp", f.path().display()))
}

#[test]
fn composing_two_digits_yields_the_byte() {
    let f = fixture(&patterned(4 * RECORD_SIZE));
    let mut session = EditorSession::open(f.path()).unwrap();

    // Move to column 5 and type 0x7F.
    for _ in 0..5 {
        session.handle_event(InputEvent::Right).unwrap();
    }
    session.handle_event(InputEvent::HexDigit(0x7)).unwrap();
    assert!(session.state().is_editing());
    assert_eq!(session.window().read_byte(0, 5).unwrap(), 0x70);

    session.handle_event(InputEvent::HexDigit(0xF)).unwrap();
    assert!(!session.state().is_editing());
    assert_eq!(session.window().read_byte(0, 5).unwrap(), 0x7F);

    // The composed byte was flushed to the working copy before the next
    // frame; the original file is untouched until a save.
    let working = fs::read(working_copy_of(&f)).unwrap();
    assert_eq!(working[5], 0x7F);
    assert_eq!(fs::read(f.path()).unwrap()[5], 5);
}

#[test]
fn aborted_edit_restores_the_original_byte() {
    let f = fixture(&patterned(4 * RECORD_SIZE));
    let mut session = EditorSession::open(f.path()).unwrap();

    session.handle_event(InputEvent::HexDigit(0xA)).unwrap();
    assert_eq!(session.window().read_byte(0, 0).unwrap(), 0xA0);

    // Navigation input while a digit is pending drops the edit.
    session.handle_event(InputEvent::Down).unwrap();
    assert!(!session.state().is_editing());
    assert_eq!(session.window().read_byte(0, 0).unwrap(), 0);

    // Nothing reached the working copy.
    let working = fs::read(working_copy_of(&f)).unwrap();
    assert_eq!(working[0], 0);
}

#[test]
fn save_commits_working_copy_to_original() {
    let f = fixture(&patterned(2 * RECORD_SIZE));
    let mut session = EditorSession::open(f.path()).unwrap();

    session.handle_event(InputEvent::HexDigit(0xB)).unwrap();
    session.handle_event(InputEvent::HexDigit(0xE)).unwrap();
    assert!(session.is_modified());

    let result = session.handle_event(InputEvent::Save).unwrap();
    assert!(matches!(result, InputResult::Message(_)));
    assert!(!session.is_modified());
    assert_eq!(fs::read(f.path()).unwrap()[0], 0xBE);
}

#[test]
fn quitting_without_save_discards_edits() {
    let f = fixture(&patterned(2 * RECORD_SIZE));
    let working = {
        let mut session = EditorSession::open(f.path()).unwrap();
        session.handle_event(InputEvent::HexDigit(0xB)).unwrap();
        session.handle_event(InputEvent::HexDigit(0xE)).unwrap();
        assert_eq!(
            session.handle_event(InputEvent::Quit).unwrap(),
            InputResult::Quit
        );
        working_copy_of(&f)
    };

    // Session dropped: working copy gone, original untouched.
    assert!(!working.exists());
    assert_eq!(fs::read(f.path()).unwrap()[0], 0);
}

#[test]
fn cursor_scrolls_window_at_edges() {
    let f = fixture(&patterned(30 * RECORD_SIZE));
    let mut session = EditorSession::open(f.path()).unwrap();
    let capacity = session.window().capacity();

    // Walk to the bottom row, then one more Down scrolls the window.
    for _ in 0..capacity - 1 {
        session.handle_event(InputEvent::Down).unwrap();
    }
    assert_eq!(session.cursor().row, capacity - 1);
    assert_eq!(session.window().base_line(), 0);

    session.handle_event(InputEvent::Down).unwrap();
    assert_eq!(session.cursor().row, capacity - 1);
    assert_eq!(session.window().base_line(), 1);

    // Up at the top row scrolls back.
    for _ in 0..capacity - 1 {
        session.handle_event(InputEvent::Up).unwrap();
    }
    assert_eq!(session.cursor().row, 0);
    session.handle_event(InputEvent::Up).unwrap();
    assert_eq!(session.window().base_line(), 0);
    assert_eq!(session.cursor().row, 0);

    // Up at the very start stays put.
    session.handle_event(InputEvent::Up).unwrap();
    assert_eq!(session.window().base_line(), 0);
    assert_eq!(session.cursor().row, 0);
}

#[test]
fn search_jump_lands_on_the_match() {
    let mut bytes = patterned(40 * RECORD_SIZE);
    let offset = 25 * RECORD_SIZE + 7;
    bytes[offset] = 0xFE;
    bytes[offset + 1] = 0xED;
    let f = fixture(&bytes);
    let mut session = EditorSession::open(f.path()).unwrap();

    let result = session
        .handle_event(InputEvent::Search(vec![0xFE, 0xED]))
        .unwrap();
    assert_eq!(
        result,
        InputResult::Message(format!("LOCATION: 0x{offset:08X}"))
    );

    assert_eq!(session.cursor_offset(), offset as u64);
    assert_eq!(
        session
            .window()
            .read_byte(session.cursor().row, session.cursor().col)
            .unwrap(),
        0xFE
    );
}

#[test]
fn search_miss_reports_not_found() {
    let f = fixture(&[0x00, 0x11, 0x22, 0x33, 0x44]);
    let mut session = EditorSession::open(f.path()).unwrap();

    let result = session.handle_event(InputEvent::Search(vec![0x55])).unwrap();
    assert_eq!(result, InputResult::Message("LOCATION: NOT FOUND".into()));
    // No jump on a miss.
    assert_eq!(session.cursor_offset(), 0);
}

#[test]
fn moving_onto_short_last_record_clamps_column() {
    // Two records, the second only 4 bytes long.
    let f = fixture(&patterned(RECORD_SIZE + 4));
    let mut session = EditorSession::open(f.path()).unwrap();

    for _ in 0..RECORD_SIZE {
        session.handle_event(InputEvent::Right).unwrap();
    }
    assert_eq!(session.cursor().col, 15);

    session.handle_event(InputEvent::Down).unwrap();
    assert_eq!(session.cursor().row, 1);
    assert_eq!(session.cursor().col, 3);

    // Right on the short record is bounded by its last valid byte.
    session.handle_event(InputEvent::Right).unwrap();
    assert_eq!(session.cursor().col, 3);
}

#[test]
fn hex_digit_on_empty_file_is_ignored() {
    let f = fixture(&[]);
    let mut session = EditorSession::open(f.path()).unwrap();
    assert_eq!(session.window().capacity(), 1);

    let result = session.handle_event(InputEvent::HexDigit(0xC)).unwrap();
    assert_eq!(result, InputResult::Handled);
    assert!(!session.state().is_editing());
    assert!(!session.is_modified());
}

#[test]
fn edit_on_short_last_record_round_trips() {
    let f = fixture(&patterned(RECORD_SIZE + 4));
    let mut session = EditorSession::open(f.path()).unwrap();

    session.handle_event(InputEvent::Down).unwrap();
    for _ in 0..3 {
        session.handle_event(InputEvent::Right).unwrap();
    }
    session.handle_event(InputEvent::HexDigit(0x5)).unwrap();
    session.handle_event(InputEvent::HexDigit(0xA)).unwrap();

    let working = fs::read(working_copy_of(&f)).unwrap();
    assert_eq!(working.len(), RECORD_SIZE + 4);
    assert_eq!(working[RECORD_SIZE + 3], 0x5A);
}

fn arbitrary_event() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        Just(InputEvent::Up),
        Just(InputEvent::Down),
        Just(InputEvent::Left),
        Just(InputEvent::Right),
        Just(InputEvent::Cancel),
        (0u8..16).prop_map(InputEvent::HexDigit),
    ]
}

proptest! {
    /// The cursor never leaves the window and the window never slides
    /// past either end of the file, whatever the input sequence.
    #[test]
    fn cursor_and_window_stay_in_bounds(
        events in proptest::collection::vec(arbitrary_event(), 0..128)
    ) {
        let f = fixture(&patterned(13 * RECORD_SIZE + 9));
        let mut session = EditorSession::open(f.path()).unwrap();
        let capacity = session.window().capacity();
        let line_count = 14u64; // ceil((13 * 16 + 9) / 16)

        for event in events {
            session.handle_event(event).unwrap();
            prop_assert!(session.cursor().row < capacity);
            prop_assert!(session.cursor().col < RECORD_SIZE);
            prop_assert!(session.window().base_line() + capacity as u64 <= line_count);
            prop_assert!(session.cursor_offset() < session.file_size());
        }
    }
}
