//! Error types for building a board from an external move history.

/// Errors from translating a move history into a [`Board`](crate::board::Board).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A move lies outside the 15×15 grid.
    #[error("move ({row}, {col}) is off the board")]
    OutOfBounds {
        /// Row of the offending move.
        row: u32,
        /// Column of the offending move.
        col: u32,
    },
    /// Two moves in the history target the same cell.
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied {
        /// Row of the duplicated cell.
        row: u8,
        /// Column of the duplicated cell.
        col: u8,
    },
    /// A player id other than 1 (black) or 2 (white).
    #[error("unknown player id {id}")]
    UnknownPlayer {
        /// The unrecognized id.
        id: u32,
    },
}
