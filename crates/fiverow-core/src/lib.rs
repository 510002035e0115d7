//! Core Gomoku types: board representation, moves, players, and threat detection.

mod board;
mod error;
mod mv;
mod player;
pub mod threat;

pub use board::{BOARD_SIZE, Board, BoardKey, CELLS, EMPTY, Placement, PrettyBoard};
pub use error::BoardError;
pub use mv::{DIRECTIONS, Move};
pub use player::Player;
pub use threat::{is_immediate_win, is_imminent_loss, will_win_next_move};
