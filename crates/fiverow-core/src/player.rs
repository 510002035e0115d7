//! The two Gomoku players.

use std::fmt;
use std::ops::Not;

/// A player, stored as the cell value its stones occupy on the board.
///
/// Black moves first. The two values are numerically opposite, so the
/// opponent is always the negation of the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Player {
    Black = 1,
    White = -1,
}

impl Player {
    /// Return the cell value of this player's stones (`1` or `-1`).
    #[inline]
    pub const fn value(self) -> i8 {
        self as i8
    }

    /// Return the player whose stones carry `value`, if any.
    #[inline]
    pub const fn from_value(value: i8) -> Option<Player> {
        match value {
            1 => Some(Player::Black),
            -1 => Some(Player::White),
            _ => None,
        }
    }

    /// Return the opponent.
    #[inline]
    pub const fn flip(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Map a request-layer player id (1 = black, 2 = white) to a player.
    pub const fn from_external_id(id: u8) -> Option<Player> {
        match id {
            1 => Some(Player::Black),
            2 => Some(Player::White),
            _ => None,
        }
    }

    /// Return the request-layer player id (1 = black, 2 = white).
    #[inline]
    pub const fn external_id(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }
}

impl Not for Player {
    type Output = Player;

    #[inline]
    fn not(self) -> Player {
        self.flip()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "x"),
            Player::White => write!(f, "o"),
        }
    }
}
