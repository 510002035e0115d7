//! Tactical predicates: immediate wins, forced losses, and unstoppable threats.
//!
//! Overlines (six or more in a row) never count as a win. Every scan along a
//! line is capped so that a sixth stone of the same colour is seen and
//! disqualifies the line.

use crate::board::{Board, EMPTY};
use crate::mv::{DIRECTIONS, Move};
use crate::player::Player;

/// Count contiguous `stone` cells starting one step from `(row, col)`, at most `max` steps.
#[inline]
fn run_length(board: &Board, row: i32, col: i32, (dr, dc): (i32, i32), stone: i8, max: i32) -> i32 {
    let mut len = 0;
    while len < max && board.probe(row + dr * (len + 1), col + dc * (len + 1)) == Some(stone) {
        len += 1;
    }
    len
}

/// Return `true` if `player` has exactly five in a row through `mv`.
///
/// `mv` itself is counted as the player's stone, so the check also answers
/// "would playing here win" for an empty cell.
pub fn is_immediate_win(board: &Board, mv: Move, player: Player) -> bool {
    let stone = player.value();
    let (row, col) = (mv.row() as i32, mv.col() as i32);

    DIRECTIONS.iter().any(|&(dr, dc)| {
        let forward = run_length(board, row, col, (dr, dc), stone, 5);
        let backward = run_length(board, row, col, (-dr, -dc), stone, 5 - forward);
        1 + forward + backward == 5
    })
}

/// Return `true` if the opponent of `player` can win on their next stone.
///
/// Checks every empty cell on the board, not only those near the last move.
pub fn is_imminent_loss(board: &Board, player: Player) -> bool {
    let opponent = !player;
    board
        .iter_empty()
        .any(|mv| is_immediate_win(board, mv, opponent))
}

/// Return `true` if `player`, having just played `mv`, wins on the next move
/// whatever the opponent does.
///
/// That is the case with five in a row, an open four, or two hard fours.
/// Only meaningful once the opponent's own immediate win has been ruled out.
pub fn will_win_next_move(board: &Board, mv: Move, player: Player) -> bool {
    let stone = player.value();
    let (row, col) = (mv.row() as i32, mv.col() as i32);
    let mut hard_fours = 0;

    for &(dr, dc) in &DIRECTIONS {
        let at = |step: i32| board.probe(row + dr * step, col + dc * step);

        // Forward: own stones with at most one gap, five steps to expose an overline.
        let mut length = 1;
        let mut gap_forward = 0;
        for step in 1..=5 {
            match at(step) {
                Some(s) if s == stone => length += 1,
                Some(EMPTY) if gap_forward == 0 => gap_forward = step,
                _ => break,
            }
        }

        // Backward starts from the last stone before the forward gap.
        let base = if gap_forward != 0 { gap_forward } else { length };
        let mut length_back = base;
        let mut gap_back = 0;
        for step in 1..=(6 - base) {
            match at(-step) {
                Some(s) if s == stone => length_back += 1,
                Some(EMPTY) if gap_back == 0 => gap_back = step,
                _ => break,
            }
        }

        match length_back {
            6 => continue,
            5 if gap_back == 0 || gap_back == 6 - base => return true,
            4 if gap_back != 0 => {
                hard_fours += 1;
                if hard_fours == 2 {
                    return true;
                }
            }
            _ => {}
        }

        // Forward four: stretch the forward run up to the backward gap.
        if gap_back == 0 {
            length += length_back - base;
        } else {
            length += gap_back - 1;
        }
        if length == 4 && gap_forward != 0 {
            hard_fours += 1;
            if hard_fours == 2 {
                return true;
            }
        }
    }

    false
}
