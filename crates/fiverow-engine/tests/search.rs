//! Integration tests for prediction and the recursive evaluator.
//!
//! Exercises the public search API end to end: tactical shortcuts, the
//! zero-sum relation between a move and the reply search, cache reuse, and
//! board restoration on every exit path.

use fiverow_core::{Board, CELLS, Move, Player};
use fiverow_engine::{
    EvalError, LeafEvaluator, ModelEvaluator, PatternEvaluator, Planes, Prediction, Searcher,
};

/// Deterministic, cheap scores that differ per cell.
struct ByPosition;

impl LeafEvaluator for ByPosition {
    fn evaluate(
        &mut self,
        _: &Board,
        _: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError> {
        Ok(candidates
            .iter()
            .map(|mv| mv.index() as f32 / CELLS as f32 - 0.5)
            .collect())
    }
}

/// Counts batches and returns a neutral score.
#[derive(Default)]
struct Counting {
    calls: usize,
}

impl LeafEvaluator for Counting {
    fn evaluate(
        &mut self,
        _: &Board,
        _: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError> {
        self.calls += 1;
        Ok(vec![0.0; candidates.len()])
    }
}

/// Always unavailable.
struct Failing;

impl LeafEvaluator for Failing {
    fn evaluate(&mut self, _: &Board, _: Player, _: &[Move]) -> Result<Vec<f32>, EvalError> {
        Err(EvalError::Unavailable {
            reason: "model not loaded".to_string(),
        })
    }
}

fn board_with(stones: &[(u8, u8, Player)]) -> Board {
    let mut board = Board::new();
    for &(row, col, player) in stones {
        board.set_stone(Move::new(row, col), player);
    }
    board
}

fn quiet_board() -> Board {
    board_with(&[
        (7, 7, Player::Black),
        (7, 8, Player::White),
        (8, 6, Player::Black),
    ])
}

fn open_four_board() -> Board {
    board_with(&[
        (7, 5, Player::Black),
        (7, 6, Player::Black),
        (7, 7, Player::Black),
        (7, 8, Player::Black),
    ])
}

fn in_center(mv: Move) -> bool {
    (4..=10).contains(&mv.row()) && (4..=10).contains(&mv.col())
}

// ── Predictions ─────────────────────────────────────────────────────────────

#[test]
fn empty_board_prefers_center() {
    let mut searcher = Searcher::new(PatternEvaluator::new());
    let mut board = Board::new();
    let prediction = searcher.predict(&mut board, Player::Black, 1);
    assert!(!prediction.degraded);
    assert_eq!(prediction.moves.len(), 40);
    let best = prediction.best().unwrap();
    assert!(in_center(best.mv), "best opening move {:?} should be central", best.mv);
}

#[test]
fn winrates_are_probabilities_sorted_descending() {
    let mut searcher = Searcher::new(PatternEvaluator::new());
    let mut board = quiet_board();
    let prediction = searcher.predict(&mut board, Player::White, 1);
    assert!(prediction.moves.iter().all(|m| (0.0..=1.0).contains(&m.winrate)));
    assert!(
        prediction.moves.windows(2).all(|w| w[0].winrate >= w[1].winrate),
        "winrates should be sorted best first"
    );
}

#[test]
fn open_four_is_a_certain_win() {
    let mut searcher = Searcher::new(Counting::default());
    let mut board = open_four_board();
    let prediction = searcher.predict(&mut board, Player::Black, 2);
    assert_eq!(prediction.moves.len(), 1, "completing five is the only candidate");
    let best = prediction.best().unwrap();
    assert!(best.mv == Move::new(7, 4) || best.mv == Move::new(7, 9));
    assert_eq!(best.winrate, 1.0);
    assert_eq!(searcher.evaluator().calls, 0);
}

#[test]
fn must_block_opponent_four() {
    let mut searcher = Searcher::new(ByPosition);
    let mut board = board_with(&[
        (3, 3, Player::White),
        (3, 4, Player::White),
        (3, 5, Player::White),
        (3, 6, Player::White),
        (3, 2, Player::Black),
        (9, 9, Player::Black),
    ]);
    let prediction = searcher.predict(&mut board, Player::Black, 1);
    assert_eq!(prediction.moves.len(), 1);
    assert_eq!(prediction.moves[0].mv, Move::new(3, 7));
}

#[test]
fn full_board_has_no_moves() {
    let mut searcher = Searcher::new(Counting::default());
    let mut board = Board::new();
    for index in 0..CELLS {
        let player = if index % 2 == 0 { Player::Black } else { Player::White };
        board.set_stone(Move::from_index(index), player);
    }
    assert_eq!(searcher.predict(&mut board, Player::Black, 1), Prediction::default());
}

#[test]
fn empty_spots_left_bounds_the_search() {
    let mut searcher = Searcher::new(Counting::default());
    let mut board = Board::new();
    let before = board.clone();

    let prediction = searcher.predict_with_empty_spots(&mut board, 3, Player::Black, 1);
    assert_eq!(prediction.moves.len(), 3);
    assert!(prediction.moves.iter().all(|m| m.winrate == 0.5));

    let none = searcher.predict_with_empty_spots(&mut board, 0, Player::Black, 1);
    assert_eq!(none, Prediction::default());
    assert_eq!(searcher.evaluator().calls, 3, "one reply batch per root candidate");
    assert_eq!(board, before);
}

#[test]
fn model_evaluator_scores_encoded_replies() {
    // Positions where black just moved look good for black, and vice versa.
    let by_flag = |inputs: &[Planes]| -> Result<Vec<f32>, EvalError> {
        Ok(inputs
            .iter()
            .map(|p| if p.plane(2)[7][7] == 1.0 { 0.5 } else { -0.5 })
            .collect())
    };
    let mut searcher = Searcher::new(ModelEvaluator::new(by_flag));
    let mut board = Board::new();
    let prediction = searcher.predict(&mut board, Player::Black, 1);
    assert!(!prediction.degraded);
    assert_eq!(prediction.moves.len(), 40);
    assert!(prediction.moves.iter().all(|m| m.winrate == 0.75), "{prediction:?}");
    assert_eq!(board, Board::new());
}

// ── Search invariants ───────────────────────────────────────────────────────

#[test]
fn move_value_is_negated_reply_value() {
    for level in 0..=1 {
        let board = quiet_board();
        let empty = board.empty_cells();
        let mv = Move::new(6, 6);

        let mut first = Searcher::new(ByPosition);
        let mut a = board.clone();
        let q_move = first
            .single_move_winrate(&mut a, empty, mv, Player::White, level)
            .unwrap();

        let mut second = Searcher::new(ByPosition);
        let mut b = board.clone();
        b.set_stone(mv, Player::White);
        let (_, q_reply) = second
            .best_action_value(&mut b, empty - 1, -2.0, 2.0, Player::Black, level)
            .unwrap();

        assert_eq!(q_move, -q_reply, "zero-sum relation at level {level}");
    }
}

#[test]
fn one_leaf_batch_per_node() {
    let mut searcher = Searcher::new(Counting::default());
    let mut board = Board::new();
    searcher.predict(&mut board, Player::Black, 1);
    let stats = searcher.stats();
    assert_eq!(stats.nodes, 40);
    assert_eq!(stats.leaf_batches, 40);
    assert_eq!(searcher.evaluator().calls, 40);
    assert_eq!(stats.leaf_positions, 40 * 40);
}

#[test]
fn repeated_prediction_is_served_from_cache() {
    let mut searcher = Searcher::new(ByPosition);
    let mut board = quiet_board();
    let first = searcher.predict(&mut board, Player::White, 1);
    let second = searcher.predict(&mut board, Player::White, 1);
    assert_eq!(first, second);
    assert_eq!(searcher.stats().leaf_batches, 0);
    assert!(searcher.stats().cache_hits > 0);
}

#[test]
fn replacing_evaluator_clears_cache() {
    let mut searcher = Searcher::new(Counting::default());
    let mut board = quiet_board();
    searcher.predict(&mut board, Player::White, 1);
    assert!(searcher.cache_len() > 0);
    searcher.set_evaluator(Counting::default());
    assert_eq!(searcher.cache_len(), 0);
}

#[test]
fn boxed_evaluators_can_be_swapped() {
    let evaluator: Box<dyn LeafEvaluator> = Box::new(Failing);
    let mut searcher = Searcher::new(evaluator);
    let mut board = quiet_board();
    assert!(searcher.predict(&mut board, Player::White, 1).degraded);
    searcher.set_evaluator(Box::new(ByPosition));
    assert!(!searcher.predict(&mut board, Player::White, 1).degraded);
}

// ── Board restoration ───────────────────────────────────────────────────────

#[test]
fn board_restored_after_search() {
    let mut searcher = Searcher::new(ByPosition);
    let mut board = quiet_board();
    let before = board.clone();
    searcher.predict(&mut board, Player::White, 2);
    assert_eq!(board, before);
}

#[test]
fn board_restored_after_forced_win() {
    let mut searcher = Searcher::new(ByPosition);
    let mut board = open_four_board();
    let before = board.clone();
    let (_, q) = searcher
        .best_action_value(&mut board, before.empty_cells(), -2.0, 2.0, Player::Black, 1)
        .unwrap();
    assert_eq!(q, 1.0);
    assert_eq!(board, before);
}

#[test]
fn board_restored_after_cache_hit() {
    let mut searcher = Searcher::new(ByPosition);
    let mut board = open_four_board();
    let before = board.clone();
    let empty = before.empty_cells();
    searcher
        .best_action_value(&mut board, empty, -2.0, 2.0, Player::Black, 1)
        .unwrap();
    let (_, q) = searcher
        .best_action_value(&mut board, empty, -2.0, 2.0, Player::Black, 1)
        .unwrap();
    assert_eq!(q, 1.0);
    assert!(searcher.stats().cache_hits > 0);
    assert_eq!(board, before);
}

#[test]
fn evaluator_failure_degrades_and_restores() {
    let mut searcher = Searcher::new(Failing);
    let mut board = quiet_board();
    let before = board.clone();
    let prediction = searcher.predict(&mut board, Player::White, 2);
    assert!(prediction.degraded);
    assert_eq!(prediction.moves.len(), 40);
    assert!(prediction.moves.iter().all(|m| m.winrate == 0.5));
    assert_eq!(board, before);
}

#[test]
fn evaluator_failure_surfaces_as_error() {
    let mut searcher = Searcher::new(Failing);
    let mut board = quiet_board();
    let before = board.clone();
    let err = searcher
        .best_action_value(&mut board, before.empty_cells(), -2.0, 2.0, Player::White, 1)
        .unwrap_err();
    assert!(err.to_string().contains("model not loaded"), "{err}");
    assert_eq!(board, before);
}
