//! Three-plane board encoding for learned leaf evaluators.
//!
//! Layout, from the mover's perspective after a candidate is played:
//! - plane 0: the mover's stones, including the candidate
//! - plane 1: the opponent's stones
//! - plane 2: all ones if the mover is black, all zeros if white

use fiverow_core::{BOARD_SIZE, Board, Move, Player};

/// Number of input planes.
pub const PLANES: usize = 3;

/// One encoded position.
#[derive(Clone, PartialEq)]
pub struct Planes(pub [[[f32; BOARD_SIZE]; BOARD_SIZE]; PLANES]);

impl Planes {
    /// Encode `board` as if `player` had just played `mv`.
    ///
    /// `mv` must be empty on `board`; the board is not modified.
    pub fn encode(board: &Board, player: Player, mv: Move) -> Planes {
        let mut planes = [[[0.0; BOARD_SIZE]; BOARD_SIZE]; PLANES];
        let me = player.value();

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let cell = board.get(Move::new(row as u8, col as u8));
                if cell == me {
                    planes[0][row][col] = 1.0;
                } else if cell == -me {
                    planes[1][row][col] = 1.0;
                }
            }
        }
        planes[0][mv.row() as usize][mv.col() as usize] = 1.0;

        if player == Player::Black {
            planes[2] = [[1.0; BOARD_SIZE]; BOARD_SIZE];
        }

        Planes(planes)
    }

    /// Encode one position per candidate, in candidate order.
    pub fn encode_batch(board: &Board, player: Player, candidates: &[Move]) -> Vec<Planes> {
        candidates
            .iter()
            .map(|&mv| Planes::encode(board, player, mv))
            .collect()
    }

    /// Borrow plane `i` (0..3).
    #[inline]
    pub fn plane(&self, i: usize) -> &[[f32; BOARD_SIZE]; BOARD_SIZE] {
        &self.0[i]
    }
}

impl std::fmt::Debug for Planes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = |p: usize| self.0[p].iter().flatten().filter(|&&v| v != 0.0).count();
        write!(f, "Planes(mine={}, theirs={}, black={})", count(0), count(1), count(2) > 0)
    }
}
