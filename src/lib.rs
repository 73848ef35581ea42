pub mod buffer;
pub mod error;
pub mod mode;
pub mod navigation;
pub mod search;
pub mod store;

pub use buffer::{Cursor, Record, WindowBuffer, DEFAULT_WINDOW_HEIGHT, RECORD_SIZE};
pub use error::HexError;
pub use mode::{DirtyByte, EditorState, InputEvent, InputResult};
pub use navigation::EditorSession;
pub use store::FileStore;
