use thiserror::Error;

/// Error taxonomy for the editor core.
///
/// `Bounds` means a window index escaped its invariant range and is a bug;
/// the event loop treats it as fatal. `Io` is surfaced to the user as a
/// notification and the failed operation is aborted without corrupting
/// in-memory state. `InvalidInput` rejects a search pattern locally.
#[derive(Debug, Error)]
pub enum HexError {
    #[error("position out of range (row {row}, col {col})")]
    Bounds { row: usize, col: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidInput(String),
}
