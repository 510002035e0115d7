//! Move search: candidate generation, leveled caching, and recursive evaluation.

pub mod cache;
mod lru;
mod minimax;
pub mod ordering;

use fiverow_core::{
    Board, BoardKey, Move, Player, is_immediate_win, is_imminent_loss, will_win_next_move,
};
use tracing::{debug, info, warn};

use crate::eval::{EvalError, LeafEvaluator};

use cache::{DEFAULT_CAPACITY, LeveledCache};
use ordering::generate_candidates;

/// Tunables for the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Entries held by the leveled cache across all levels.
    pub cache_capacity: usize,
    /// Candidates considered at the root of a prediction.
    pub root_candidates: usize,
    /// Candidates per node while the board is still open.
    pub opening_candidates: usize,
    /// Candidates per node once the board fills up.
    pub candidates: usize,
    /// Empty-cell count above which `opening_candidates` applies.
    pub opening_threshold: usize,
    /// Level used when a request does not name one.
    pub default_level: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            root_candidates: 40,
            opening_candidates: 40,
            candidates: 20,
            opening_threshold: 200,
            default_level: 1,
        }
    }
}

impl SearchConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_root_candidates(mut self, count: usize) -> Self {
        self.root_candidates = count;
        self
    }

    pub fn with_candidates(mut self, opening: usize, late: usize) -> Self {
        self.opening_candidates = opening;
        self.candidates = late;
        self
    }

    pub fn with_default_level(mut self, level: u32) -> Self {
        self.default_level = level;
        self
    }

    /// Desired candidate count for an interior node.
    pub fn candidates_for(&self, empty_spots_left: usize) -> usize {
        if empty_spots_left > self.opening_threshold {
            self.opening_candidates
        } else {
            self.candidates
        }
    }
}

/// Counters gathered during one prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Calls to the recursive evaluator.
    pub nodes: u64,
    /// Values answered by the cache.
    pub cache_hits: u64,
    /// Calls made to the leaf evaluator.
    pub leaf_batches: u64,
    /// Positions sent to the leaf evaluator.
    pub leaf_positions: u64,
}

/// Errors that abort a search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("leaf evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// A root candidate with its estimated winning probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveWinrate {
    pub mv: Move,
    /// Probability in `[0, 1]` that the mover wins after playing `mv`.
    pub winrate: f32,
}

impl MoveWinrate {
    /// Convert a search value in `[-1, 1]` into a probability.
    pub fn from_q(mv: Move, q: f32) -> Self {
        Self {
            mv,
            winrate: (q + 1.0) * 0.5,
        }
    }
}

/// Result of [`Searcher::predict`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    /// Root candidates, best first.
    pub moves: Vec<MoveWinrate>,
    /// The leaf evaluator failed and the values come from tactics alone.
    pub degraded: bool,
}

impl Prediction {
    /// The highest-rated move, if any.
    pub fn best(&self) -> Option<MoveWinrate> {
        self.moves.first().copied()
    }
}

/// Recursive searcher owning a leveled cache and a leaf evaluator.
///
/// The cache is only valid for the evaluator that filled it, so replacing
/// the evaluator clears it.
pub struct Searcher<E> {
    cache: LeveledCache<BoardKey, f32>,
    evaluator: E,
    config: SearchConfig,
    stats: SearchStats,
}

impl<E: LeafEvaluator> Searcher<E> {
    /// Create a searcher with default settings.
    pub fn new(evaluator: E) -> Self {
        Self::with_config(evaluator, SearchConfig::default())
    }

    pub fn with_config(evaluator: E, config: SearchConfig) -> Self {
        Self {
            cache: LeveledCache::new(config.cache_capacity),
            evaluator,
            config,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Counters from the most recent prediction.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Swap in a new leaf evaluator and drop every cached value.
    pub fn set_evaluator(&mut self, evaluator: E) {
        self.evaluator = evaluator;
        self.reset_cache();
    }

    /// Drop every cached value.
    pub fn reset_cache(&mut self) {
        self.cache.clear();
        info!(capacity = self.cache.capacity(), "search cache reset");
    }

    /// Rebuild the cache with a new capacity.
    pub fn resize_cache(&mut self, capacity: usize) {
        self.config.cache_capacity = capacity;
        self.cache = LeveledCache::new(capacity);
        info!(capacity, "search cache resized");
    }

    /// Number of values currently cached.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Rate the root candidates for `player` with `level` plies of search.
    ///
    /// `board` is borrowed mutably for in-place search and is restored
    /// before returning. A leaf evaluator failure yields a degraded
    /// prediction built from tactical checks alone.
    pub fn predict(&mut self, board: &mut Board, player: Player, level: u32) -> Prediction {
        let empty = board.empty_cells();
        self.predict_with_empty_spots(board, empty, player, level)
    }

    /// Like [`Searcher::predict`], with the empty-cell count supplied by the caller.
    ///
    /// `empty_spots_left` bounds the candidate count at every node and ends
    /// the search in a draw when it reaches 0. It must not exceed the
    /// board's empty cells.
    pub fn predict_with_empty_spots(
        &mut self,
        board: &mut Board,
        empty_spots_left: usize,
        player: Player,
        level: u32,
    ) -> Prediction {
        self.stats = SearchStats::default();
        debug!(player = %player, level, empty_spots_left, "predicting\n{}", board.pretty());
        if empty_spots_left == 0 {
            return Prediction::default();
        }

        let candidates =
            generate_candidates(board, empty_spots_left, player, self.config.root_candidates);
        let depth = level.saturating_sub(1);

        let rated = self.rate_candidates(board, empty_spots_left, player, depth, &candidates);
        let prediction = match rated {
            Ok(moves) => Prediction {
                moves,
                degraded: false,
            },
            Err(err) => {
                warn!(%err, "falling back to tactical prediction");
                Prediction {
                    moves: tactical_fallback(board, player, &candidates),
                    degraded: true,
                }
            }
        };

        debug!(
            level,
            candidates = candidates.len(),
            nodes = self.stats.nodes,
            cache_hits = self.stats.cache_hits,
            leaf_batches = self.stats.leaf_batches,
            leaf_positions = self.stats.leaf_positions,
            cached = self.cache.len(),
            "prediction complete"
        );
        prediction
    }

    fn rate_candidates(
        &mut self,
        board: &mut Board,
        empty: usize,
        player: Player,
        level: u32,
        candidates: &[Move],
    ) -> Result<Vec<MoveWinrate>, SearchError> {
        let mut moves = Vec::with_capacity(candidates.len());
        for &mv in candidates {
            let q = self.single_move_winrate(board, empty, mv, player, level)?;
            moves.push(MoveWinrate::from_q(mv, q));
        }
        sort_by_winrate(&mut moves);
        Ok(moves)
    }
}

/// Rate candidates by tactics alone: win 1, loss 0, anything else 0.5.
fn tactical_fallback(board: &mut Board, player: Player, candidates: &[Move]) -> Vec<MoveWinrate> {
    let mut moves: Vec<MoveWinrate> = candidates
        .iter()
        .map(|&mv| {
            let placed = board.place(mv, player);
            let q = if is_immediate_win(&placed, mv, player) {
                1.0
            } else if is_imminent_loss(&placed, player) {
                -1.0
            } else if will_win_next_move(&placed, mv, player) {
                1.0
            } else {
                0.0
            };
            MoveWinrate::from_q(mv, q)
        })
        .collect();
    sort_by_winrate(&mut moves);
    moves
}

/// Sort best first; equal rates keep their candidate order.
fn sort_by_winrate(moves: &mut [MoveWinrate]) {
    moves.sort_by(|a, b| b.winrate.total_cmp(&a.winrate));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_count_depends_on_fill() {
        let config = SearchConfig::default();
        assert_eq!(config.candidates_for(225), 40);
        assert_eq!(config.candidates_for(201), 40);
        assert_eq!(config.candidates_for(200), 20);
        assert_eq!(config.candidates_for(3), 20);
    }

    #[test]
    fn builder_setters() {
        let config = SearchConfig::default()
            .with_cache_capacity(10)
            .with_root_candidates(5)
            .with_candidates(8, 4)
            .with_default_level(3);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.root_candidates, 5);
        assert_eq!(config.candidates_for(225), 8);
        assert_eq!(config.candidates_for(10), 4);
        assert_eq!(config.default_level, 3);
    }

    #[test]
    fn winrate_rescales_q() {
        let mv = Move::new(7, 7);
        assert_eq!(MoveWinrate::from_q(mv, 1.0).winrate, 1.0);
        assert_eq!(MoveWinrate::from_q(mv, -1.0).winrate, 0.0);
        assert_eq!(MoveWinrate::from_q(mv, 0.0).winrate, 0.5);
    }

    #[test]
    fn sort_is_stable_and_descending() {
        let mut moves = vec![
            MoveWinrate::from_q(Move::new(0, 0), 0.0),
            MoveWinrate::from_q(Move::new(0, 1), 1.0),
            MoveWinrate::from_q(Move::new(0, 2), 0.0),
        ];
        sort_by_winrate(&mut moves);
        let order: Vec<Move> = moves.iter().map(|m| m.mv).collect();
        assert_eq!(order, vec![Move::new(0, 1), Move::new(0, 0), Move::new(0, 2)]);
    }

    #[test]
    fn tactical_fallback_spots_the_win() {
        let mut board = Board::new();
        for col in 5..=8 {
            board.set_stone(Move::new(7, col), Player::Black);
        }
        let before = board.clone();
        let moves = tactical_fallback(
            &mut board,
            Player::Black,
            &[Move::new(0, 0), Move::new(7, 4), Move::new(14, 14)],
        );
        assert_eq!(moves[0].mv, Move::new(7, 4));
        assert_eq!(moves[0].winrate, 1.0);
        assert_eq!(moves[1].mv, Move::new(0, 0), "ties keep candidate order");
        assert_eq!(moves[1].winrate, 0.5);
        assert_eq!(board, before);
    }

    #[test]
    fn tactical_fallback_spots_the_loss() {
        let mut board = Board::new();
        for col in 5..=8 {
            board.set_stone(Move::new(7, col), Player::White);
        }
        let moves =
            tactical_fallback(&mut board, Player::Black, &[Move::new(0, 0), Move::new(7, 4)]);
        // Blocking one end of an open four still leaves the other.
        assert!(moves.iter().all(|m| m.winrate == 0.0));
    }

    #[test]
    fn prediction_best() {
        let prediction = Prediction {
            moves: vec![MoveWinrate::from_q(Move::new(3, 3), 0.5)],
            degraded: false,
        };
        assert_eq!(prediction.best().map(|m| m.mv), Some(Move::new(3, 3)));
        assert_eq!(Prediction::default().best(), None);
    }
}
