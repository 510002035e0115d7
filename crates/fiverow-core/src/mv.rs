//! Board coordinates of a move.

use std::fmt;

use crate::board::BOARD_SIZE;

/// The four line directions as `(row, col)` steps: both diagonals,
/// vertical, and horizontal. Opposite directions are covered by
/// stepping backwards.
pub const DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, 0), (0, 1), (1, -1)];

/// A cell on the 15×15 board, identified by row and column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    row: u8,
    col: u8,
}

impl Move {
    /// Create a move from row and column.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is off the board. Coordinates reaching
    /// the search are produced internally, so a bad one is a bug.
    #[inline]
    pub const fn new(row: u8, col: u8) -> Move {
        assert!(
            (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE,
            "move coordinates off the board"
        );
        Move { row, col }
    }

    /// Create a move, returning `None` if the coordinates are off the board.
    #[inline]
    pub const fn try_new(row: u8, col: u8) -> Option<Move> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Move { row, col })
        } else {
            None
        }
    }

    /// Create a move from a row-major cell index.
    #[inline]
    pub const fn from_index(index: usize) -> Move {
        Move::new((index / BOARD_SIZE) as u8, (index % BOARD_SIZE) as u8)
    }

    /// Row-major cell index (`row * 15 + col`).
    #[inline]
    pub const fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {})", self.row, self.col)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}
