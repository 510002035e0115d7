//! Built-in pattern evaluator.
//!
//! Counts contiguous line segments for both sides and squashes the
//! difference into `[-1, 1]`. The opponent moves next after the candidate
//! is played, so their patterns weigh more.

use fiverow_core::{BOARD_SIZE, Board, DIRECTIONS, Move, Player};
use tracing::trace;

use super::{EvalError, LeafEvaluator};

/// Segment scores by length and number of open ends.
pub struct PatternScore;

impl PatternScore {
    pub const FIVE: i32 = 1_000_000;
    pub const OPEN_FOUR: i32 = 100_000;
    pub const CLOSED_FOUR: i32 = 50_000;
    pub const OPEN_THREE: i32 = 10_000;
    pub const CLOSED_THREE: i32 = 1_000;
    pub const OPEN_TWO: i32 = 500;
    pub const CLOSED_TWO: i32 = 50;
}

/// Score difference mapped to `tanh(1)`, about 0.76.
const SCALE: f32 = 20_000.0;

/// Opponent patterns are multiplied by `3/2`.
const DEFENSE_NUM: i32 = 3;
const DEFENSE_DEN: i32 = 2;

/// Leaf evaluator built from hand-tuned line patterns.
#[derive(Debug, Default, Clone)]
pub struct PatternEvaluator {
    scratch: Board,
}

impl PatternEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    fn score_candidate(&mut self, player: Player, mv: Move) -> f32 {
        let placed = self.scratch.place(mv, player);
        let mine = evaluate_patterns(&placed, player);
        if mine >= PatternScore::FIVE {
            return 1.0;
        }
        let theirs = evaluate_patterns(&placed, !player);
        let diff = mine - theirs * DEFENSE_NUM / DEFENSE_DEN;
        (diff as f32 / SCALE).tanh()
    }
}

impl LeafEvaluator for PatternEvaluator {
    fn evaluate(
        &mut self,
        board: &Board,
        player: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError> {
        self.scratch.clone_from(board);
        let scores = candidates
            .iter()
            .map(|&mv| self.score_candidate(player, mv))
            .collect();
        trace!(batch = candidates.len(), "pattern evaluation");
        Ok(scores)
    }
}

/// Sum of segment scores for every line of `player`'s stones.
///
/// Each segment is scored once, from the stone that starts it.
pub fn evaluate_patterns(board: &Board, player: Player) -> i32 {
    let stone = player.value();
    let mut score = 0;
    for row in 0..BOARD_SIZE as i32 {
        for col in 0..BOARD_SIZE as i32 {
            if board.probe(row, col) != Some(stone) {
                continue;
            }
            for &dir in &DIRECTIONS {
                score += evaluate_line(board, row, col, dir, stone);
            }
        }
    }
    score
}

fn evaluate_line(board: &Board, row: i32, col: i32, (dr, dc): (i32, i32), stone: i8) -> i32 {
    let before = board.probe(row - dr, col - dc);
    if before == Some(stone) {
        return 0;
    }

    let mut count = 1;
    while board.probe(row + dr * count, col + dc * count) == Some(stone) {
        count += 1;
    }
    let after = board.probe(row + dr * count, col + dc * count);

    let open_ends = [before, after].iter().filter(|&&c| c == Some(0)).count();
    match (count, open_ends) {
        (5, _) => PatternScore::FIVE,
        (4, 2) => PatternScore::OPEN_FOUR,
        (4, 1) => PatternScore::CLOSED_FOUR,
        (3, 2) => PatternScore::OPEN_THREE,
        (3, 1) => PatternScore::CLOSED_THREE,
        (2, 2) => PatternScore::OPEN_TWO,
        (2, 1) => PatternScore::CLOSED_TWO,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(u8, u8, Player)]) -> Board {
        let mut board = Board::new();
        for &(row, col, player) in stones {
            board.set_stone(Move::new(row, col), player);
        }
        board
    }

    #[test]
    fn completing_five_scores_one() {
        let board = board_with(&[
            (7, 3, Player::White),
            (7, 4, Player::White),
            (7, 5, Player::White),
            (7, 6, Player::White),
        ]);
        let mut eval = PatternEvaluator::new();
        let scores = eval.evaluate(&board, Player::White, &[Move::new(7, 7)]).unwrap();
        assert_eq!(scores, vec![1.0]);
    }

    #[test]
    fn overline_is_not_five() {
        let board = board_with(&[
            (7, 1, Player::Black),
            (7, 2, Player::Black),
            (7, 3, Player::Black),
            (7, 4, Player::Black),
            (7, 5, Player::Black),
            (7, 6, Player::Black),
        ]);
        assert_eq!(evaluate_patterns(&board, Player::Black), 0);
    }

    #[test]
    fn segments_counted_once() {
        let board = board_with(&[(7, 6, Player::Black), (7, 7, Player::Black)]);
        // One open two horizontally; single stones elsewhere score nothing.
        assert_eq!(evaluate_patterns(&board, Player::Black), PatternScore::OPEN_TWO);
    }

    #[test]
    fn scores_within_unit_range() {
        let board = board_with(&[
            (7, 7, Player::Black),
            (7, 8, Player::White),
            (8, 8, Player::Black),
            (6, 6, Player::White),
        ]);
        let mut eval = PatternEvaluator::new();
        let candidates: Vec<Move> = board.iter_empty().take(50).collect();
        let scores = eval.evaluate(&board, Player::White, &candidates).unwrap();
        assert_eq!(scores.len(), candidates.len());
        assert!(scores.iter().all(|q| (-1.0..=1.0).contains(q)));
    }

    #[test]
    fn ignoring_an_open_four_scores_badly() {
        let board = board_with(&[
            (7, 5, Player::White),
            (7, 6, Player::White),
            (7, 7, Player::White),
            (7, 8, Player::White),
        ]);
        let mut eval = PatternEvaluator::new();
        let scores = eval
            .evaluate(&board, Player::Black, &[Move::new(0, 0), Move::new(7, 4)])
            .unwrap();
        assert!(scores[0] < -0.99, "ignoring the four: {}", scores[0]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn extending_own_line_beats_far_move() {
        let board = board_with(&[(7, 6, Player::Black), (7, 7, Player::Black)]);
        let mut eval = PatternEvaluator::new();
        let scores = eval
            .evaluate(&board, Player::Black, &[Move::new(7, 8), Move::new(0, 14)])
            .unwrap();
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn input_board_untouched() {
        let board = board_with(&[(7, 7, Player::Black)]);
        let before = board.clone();
        let mut eval = PatternEvaluator::new();
        eval.evaluate(&board, Player::White, &[Move::new(7, 8), Move::new(8, 8)])
            .unwrap();
        assert_eq!(board, before);
    }
}
