//! Candidate move generation via directional line analysis.
//!
//! Every empty cell is scored by extending along the four line directions,
//! counting the mover's and the opponent's stones with at most one gap per
//! side. Forced situations short-circuit into a single move:
//! - the mover completes five: returned immediately;
//! - the opponent would complete five: the cell must be blocked;
//! - the mover makes an open four or two hard fours: a winning move.
//!
//! A block outranks a winning move, and only a five outranks a block.
//! Otherwise cells are ranked by interest, where every open line side of
//! length `n` (for either player) contributes `n^4`.

use fiverow_core::{Board, CELLS, DIRECTIONS, Move, Player};
use tracing::trace;

/// Interest of any empty cell before line analysis.
pub const BASE_INTEREST: i32 = 10;

/// Bonus for cells in the central 7×7 region, biasing opening play.
pub const CENTER_BONUS: i32 = 5;

/// Bonus for a useful stone sitting just past a second gap.
pub const PEEK_BONUS: i32 = 15;

/// One open four (`4^4`). Cells above this widen the candidate count by one.
pub const HIGH_INTEREST: i32 = 256;

/// Rows and columns of the centre region.
const CENTER: std::ops::RangeInclusive<usize> = 4..=10;

/// What one direction through a cell contributes.
#[derive(Debug, Default)]
struct LineReport {
    /// The mover completes exactly five here.
    five: bool,
    /// The opponent would complete exactly five here.
    block: bool,
    /// Hard fours (at most one per side) the mover gets by playing here.
    hard_fours: u32,
    /// Sum of `length^4` over open sides.
    interest: i32,
    /// Gap-peek bonuses.
    bonus: i32,
}

/// Analyse the line through `(row, col)` along `(dr, dc)` for mover `me`.
fn scan_line(board: &Board, row: i32, col: i32, (dr, dc): (i32, i32), me: i8) -> LineReport {
    let opp = -me;
    let at = |step: i32| board.probe(row + dr * step, col + dc * step);
    let mut report = LineReport::default();

    // Forward: whichever colour appears first blocks the other.
    let mut my_len = 1;
    let mut opp_len = 1;
    let mut gap_forward = 0;
    let mut my_blocked = false;
    let mut opp_blocked = false;
    for step in 1..=5 {
        match at(step) {
            None => break,
            Some(s) if s == me => {
                if my_blocked {
                    break;
                }
                my_len += 1;
                opp_blocked = true;
            }
            Some(s) if s == opp => {
                if opp_blocked {
                    break;
                }
                opp_len += 1;
                my_blocked = true;
            }
            Some(_) if gap_forward == 0 => gap_forward = step,
            Some(_) => {
                match at(step + 1) {
                    Some(s) if (s == me && !my_blocked) || (s == opp && !opp_blocked) => {
                        report.bonus += PEEK_BONUS;
                    }
                    _ => {}
                }
                break;
            }
        }
    }

    // Backward counting resumes from the last stone before the forward gap.
    let (mut my_back, mut opp_back, fwd_my_open, fwd_opp_open) = match gap_forward {
        0 => (my_len, opp_len, false, false),
        1 => (1, 1, true, true),
        gap if !my_blocked => (gap, 1, true, false),
        gap => (1, gap, false, true),
    };
    let my_base = my_back;
    let opp_base = opp_back;

    // Backward, mover first.
    let mut gap_back = 0;
    opp_blocked = false;
    for step in 1..=(6 - my_base) {
        match at(-step) {
            None => break,
            Some(s) if s == me => {
                my_back += 1;
                opp_blocked = true;
            }
            Some(s) if s == opp => break,
            Some(_) if gap_back == 0 => gap_back = step,
            Some(_) => {
                if at(-step - 1) == Some(me) {
                    report.bonus += PEEK_BONUS;
                }
                break;
            }
        }
    }

    if my_back == 5 && (gap_back == 0 || gap_back == 6 - my_base) {
        report.five = true;
        return report;
    }

    if gap_back == 0 {
        my_len += my_back - my_base;
    } else {
        my_len += gap_back - 1;
    }
    let back_my_open = gap_back > 0;

    // Backward, opponent. Skipped when the mover owns the backward side.
    let mut back_opp_open = false;
    if opp_blocked {
        back_opp_open = gap_back == 1;
        gap_back = 0;
    } else {
        gap_back = 0;
        for step in 1..=(6 - opp_base) {
            match at(-step) {
                None => break,
                Some(s) if s == me => break,
                Some(s) if s == opp => opp_back += 1,
                Some(_) if gap_back == 0 => gap_back = step,
                Some(_) => {
                    if at(-step - 1) == Some(opp) {
                        report.bonus += PEEK_BONUS;
                    }
                    break;
                }
            }
        }
        if gap_back == 0 {
            opp_len += opp_back - opp_base;
        } else {
            opp_len += gap_back - 1;
            back_opp_open = true;
        }
    }

    report.block = opp_back == 5 && (gap_back == 0 || gap_back == 6 - opp_base);

    report.hard_fours =
        u32::from(fwd_my_open && my_len == 4) + u32::from(back_my_open && my_back == 4);

    // Lengths of five or more are overlines and contribute nothing.
    for (open, len) in [
        (fwd_my_open, my_len),
        (back_my_open, my_back),
        (fwd_opp_open, opp_len),
        (back_opp_open, opp_back),
    ] {
        if open && len < 5 {
            report.interest += len.pow(4);
        }
    }

    report
}

/// Outcome of scanning the whole board.
#[derive(Debug)]
enum Scan {
    /// A single move the mover must play.
    Forced(Move),
    /// Every empty cell with its interest, in row-major order, plus the
    /// number of high-interest cells.
    Ranked { cells: Vec<(Move, i32)>, high: usize },
}

fn scan(board: &Board, player: Player) -> Scan {
    let me = player.value();
    let mut cells = Vec::with_capacity(CELLS);
    let mut high = 0;
    let mut forced: Option<Move> = None;
    let mut must_block = false;
    let mut winning = false;

    for mv in board.iter_empty() {
        let (row, col) = (mv.row() as i32, mv.col() as i32);
        let mut interest = BASE_INTEREST;
        let mut hard_fours = 0;

        for &dir in &DIRECTIONS {
            let line = scan_line(board, row, col, dir, me);
            if line.five {
                return Scan::Forced(mv);
            }
            interest += line.bonus;
            if line.block {
                forced = Some(mv);
                must_block = true;
            }
            if !must_block {
                hard_fours += line.hard_fours;
                if hard_fours >= 2 {
                    forced = Some(mv);
                    winning = true;
                }
            }
            if !must_block && !winning {
                interest += line.interest;
            }
        }

        if interest > HIGH_INTEREST {
            high += 1;
        }
        let center = CENTER.contains(&(mv.row() as usize)) && CENTER.contains(&(mv.col() as usize));
        cells.push((mv, interest + if center { CENTER_BONUS } else { 0 }));
    }

    match forced {
        Some(mv) => Scan::Forced(mv),
        None => Scan::Ranked { cells, high },
    }
}

/// Generate candidate moves for `player`, best first.
///
/// Returns a single move when the position forces one (win, block, or
/// unstoppable threat). Otherwise returns the `desired` most interesting
/// cells, widened by one per high-interest cell and clamped to
/// `empty_spots_left`. Ties keep row-major order.
pub fn generate_candidates(
    board: &Board,
    empty_spots_left: usize,
    player: Player,
    desired: usize,
) -> Vec<Move> {
    match scan(board, player) {
        Scan::Forced(mv) => {
            trace!(%mv, "forced candidate");
            vec![mv]
        }
        Scan::Ranked { mut cells, high } => {
            let wanted = (desired + high).min(empty_spots_left);
            cells.sort_by(|a, b| b.1.cmp(&a.1));
            cells.truncate(wanted);
            trace!(count = cells.len(), high, "ranked candidates");
            cells.into_iter().map(|(mv, _)| mv).collect()
        }
    }
}
