//! The Gomoku board: a 15×15 grid of cell values, mutated in place during search.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::error::BoardError;
use crate::mv::Move;
use crate::player::Player;

/// Board width and height.
pub const BOARD_SIZE: usize = 15;

/// Number of cells on the board.
pub const CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Cell value of an empty intersection.
pub const EMPTY: i8 = 0;

/// Complete Gomoku position: one `i8` per cell (`0`, `1` for black, `-1` for white).
///
/// Whose turn it is lives outside the board; the search threads the mover
/// explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [i8; CELLS],
}

/// Byte-exact snapshot of every cell, used as a transposition key.
///
/// The same position reached through different move orders yields the same
/// key. Turn and search level are not part of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey([i8; CELLS]);

impl fmt::Debug for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stones = self.0.iter().filter(|&&c| c != EMPTY).count();
        write!(f, "BoardKey({stones} stones)")
    }
}

impl Board {
    /// Return an empty board.
    pub const fn new() -> Board {
        Board { cells: [EMPTY; CELLS] }
    }

    /// Build a board from a move history.
    ///
    /// Rejects moves that land on an occupied cell.
    pub fn from_history(history: &[(Move, Player)]) -> Result<Board, BoardError> {
        let mut board = Board::new();
        for &(mv, player) in history {
            if !board.is_empty(mv) {
                return Err(BoardError::Occupied {
                    row: mv.row(),
                    col: mv.col(),
                });
            }
            board.cells[mv.index()] = player.value();
        }
        trace!(stones = history.len(), "board built from history");
        Ok(board)
    }

    /// Build a board from client-supplied `(row, col, player_id)` triples.
    ///
    /// Player ids are 1 for black and 2 for white.
    pub fn from_external_history(history: &[(u32, u32, u32)]) -> Result<Board, BoardError> {
        let moves = history
            .iter()
            .map(|&(row, col, id)| {
                let mv = u8::try_from(row)
                    .ok()
                    .zip(u8::try_from(col).ok())
                    .and_then(|(r, c)| Move::try_new(r, c))
                    .ok_or(BoardError::OutOfBounds { row, col })?;
                let player = u8::try_from(id)
                    .ok()
                    .and_then(Player::from_external_id)
                    .ok_or(BoardError::UnknownPlayer { id })?;
                Ok((mv, player))
            })
            .collect::<Result<Vec<_>, BoardError>>()?;
        Board::from_history(&moves)
    }

    /// Return the raw cell value at `mv`.
    #[inline]
    pub fn get(&self, mv: Move) -> i8 {
        self.cells[mv.index()]
    }

    /// Return the player owning the stone at `mv`, if any.
    #[inline]
    pub fn stone(&self, mv: Move) -> Option<Player> {
        Player::from_value(self.cells[mv.index()])
    }

    /// Return the cell value at signed coordinates, or `None` off the board.
    ///
    /// Line scans step past the edges freely and treat `None` as a wall.
    #[inline]
    pub fn probe(&self, row: i32, col: i32) -> Option<i8> {
        if row < 0 || col < 0 || row >= BOARD_SIZE as i32 || col >= BOARD_SIZE as i32 {
            return None;
        }
        Some(self.cells[row as usize * BOARD_SIZE + col as usize])
    }

    /// Return `true` if no stone sits on `mv`.
    #[inline]
    pub fn is_empty(&self, mv: Move) -> bool {
        self.cells[mv.index()] == EMPTY
    }

    /// Put a stone on an empty cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is occupied.
    #[inline]
    pub fn set_stone(&mut self, mv: Move, player: Player) {
        assert!(self.is_empty(mv), "cell {mv} is already occupied");
        self.cells[mv.index()] = player.value();
    }

    /// Remove the stone on `mv`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is empty.
    #[inline]
    pub fn clear_stone(&mut self, mv: Move) {
        assert!(!self.is_empty(mv), "cell {mv} is already empty");
        self.cells[mv.index()] = EMPTY;
    }

    /// Tentatively place a stone, returning a guard that removes it on drop.
    ///
    /// The guard dereferences to the board, so it can be passed straight
    /// into a recursive call. Every exit path, including `?` and early
    /// returns, restores the cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is occupied.
    #[inline]
    pub fn place(&mut self, mv: Move, player: Player) -> Placement<'_> {
        self.set_stone(mv, player);
        Placement { board: self, mv }
    }

    /// Snapshot the whole grid as a transposition key.
    #[inline]
    pub fn key(&self) -> BoardKey {
        BoardKey(self.cells)
    }

    /// Number of empty cells.
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == EMPTY).count()
    }

    /// Number of stones of either colour.
    pub fn stone_count(&self) -> usize {
        CELLS - self.empty_cells()
    }

    /// Iterate over empty cells in row-major order.
    pub fn iter_empty(&self) -> impl Iterator<Item = Move> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == EMPTY)
            .map(|(i, _)| Move::from_index(i))
    }

    /// Return a pretty-printable wrapper for this board.
    pub fn pretty(&self) -> PrettyBoard<'_> {
        PrettyBoard(self)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({} stones)", self.stone_count())
    }
}

/// A stone placed by [`Board::place`]; removing it is tied to this guard's lifetime.
pub struct Placement<'a> {
    board: &'a mut Board,
    mv: Move,
}

impl Placement<'_> {
    /// The move this guard placed.
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }
}

impl Deref for Placement<'_> {
    type Target = Board;

    #[inline]
    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placement<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placement<'_> {
    #[inline]
    fn drop(&mut self) {
        self.board.clear_stone(self.mv);
    }
}

/// Wrapper for pretty-printing a board as a 15×15 grid.
pub struct PrettyBoard<'a>(&'a Board);

impl fmt::Display for PrettyBoard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE as u8 {
            write!(f, " {}", (b'a' + col) as char)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE as u8 {
            write!(f, "{:2} ", row + 1)?;
            for col in 0..BOARD_SIZE as u8 {
                let c = match self.0.stone(Move::new(row, col)) {
                    Some(Player::Black) => 'x',
                    Some(Player::White) => 'o',
                    None => '-',
                };
                write!(f, " {c}")?;
            }
            if (row as usize) < BOARD_SIZE - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
