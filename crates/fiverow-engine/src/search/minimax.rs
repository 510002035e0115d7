//! Recursive evaluator.
//!
//! Values are from the mover's perspective in `[-1, 1]`. The board is
//! mutated in place through [`Board::place`] guards, so every return path,
//! including an evaluator error propagated with `?`, leaves it as found.
//!
//! `alpha` and `beta` are carried through the recursion but do not prune;
//! the only cutoff is a sibling reaching a certain win.

use fiverow_core::{
    Board, BoardKey, Move, Player, is_immediate_win, is_imminent_loss, will_win_next_move,
};
use tracing::trace;

use super::ordering::generate_candidates;
use super::{SearchError, Searcher};
use crate::eval::{LeafEvaluator, validate_scores};

/// Value of a certain win.
const WIN: f32 = 1.0;

/// Value of a certain loss.
const LOSS: f32 = -1.0;

impl<E: LeafEvaluator> Searcher<E> {
    /// Find the best move for `player` and its value.
    ///
    /// `level` is the remaining depth budget: at 0 unknown candidates go to
    /// the leaf evaluator in one batch, above 0 each is searched one ply
    /// deeper. A single forced candidate does not consume depth.
    ///
    /// # Panics
    ///
    /// Panics if `empty_spots_left` is non-zero but the board has no empty cell.
    pub fn best_action_value(
        &mut self,
        board: &mut Board,
        empty_spots_left: usize,
        alpha: f32,
        beta: f32,
        player: Player,
        level: u32,
    ) -> Result<(Move, f32), SearchError> {
        self.stats.nodes += 1;
        if empty_spots_left == 0 {
            return Ok((Move::new(0, 0), 0.0));
        }

        let desired = self.config.candidates_for(empty_spots_left);
        let candidates = generate_candidates(board, empty_spots_left, player, desired);
        assert!(
            !candidates.is_empty(),
            "no candidates with {empty_spots_left} empty cells left"
        );

        if let [mv] = candidates[..] {
            let q = match self.resolve_forced(board, mv, player, level) {
                Some(q) => q,
                None => {
                    self.next_ply_value(board, empty_spots_left, mv, alpha, beta, player, level)?
                }
            };
            trace!(%mv, q, level, "forced move");
            return Ok((mv, q));
        }

        let mut best = (candidates[0], f32::NEG_INFINITY);
        let mut unknown: Vec<(Move, BoardKey)> = Vec::with_capacity(candidates.len());
        for &mv in &candidates {
            let key = board.place(mv, player).key();
            match self.cache.get(&key, level) {
                Some(q) => {
                    self.stats.cache_hits += 1;
                    if q >= WIN {
                        return Ok((mv, q));
                    }
                    if q > best.1 {
                        best = (mv, q);
                    }
                }
                None => unknown.push((mv, key)),
            }
        }

        if unknown.is_empty() {
            return Ok(best);
        }

        if level == 0 {
            let moves: Vec<Move> = unknown.iter().map(|&(mv, _)| mv).collect();
            let scores = self.evaluate_leaves(board, player, &moves)?;

            let mut leaf_best: Option<(Move, f32)> = None;
            for (&(mv, key), &q) in unknown.iter().zip(&scores) {
                self.cache.set(key, q, 0);
                if leaf_best.is_none_or(|(_, top)| q > top) {
                    leaf_best = Some((mv, q));
                }
            }
            if let Some((mv, q)) = leaf_best {
                if q > best.1 {
                    best = (mv, q);
                }
            }
        } else {
            for (mv, key) in unknown {
                let q = self.next_ply_value(
                    board,
                    empty_spots_left,
                    mv,
                    alpha,
                    beta,
                    player,
                    level - 1,
                )?;
                self.cache.set(key, q, level - 1);
                if q > best.1 {
                    best = (mv, q);
                }
                if best.1 >= WIN {
                    break;
                }
            }
        }

        Ok(best)
    }

    /// Value for `player` of playing `mv`, searching the reply at `level`.
    ///
    /// Tactical outcomes are checked before the cache and are not cached.
    pub fn single_move_winrate(
        &mut self,
        board: &mut Board,
        empty_spots_left: usize,
        mv: Move,
        player: Player,
        level: u32,
    ) -> Result<f32, SearchError> {
        let mut placed = board.place(mv, player);
        if is_immediate_win(&placed, mv, player) {
            return Ok(WIN);
        }
        if is_imminent_loss(&placed, player) {
            return Ok(LOSS);
        }
        if will_win_next_move(&placed, mv, player) {
            return Ok(WIN);
        }
        if let Some(q) = self.cache.get(&placed.key(), level) {
            self.stats.cache_hits += 1;
            return Ok(q);
        }

        let (_, q) =
            self.best_action_value(&mut placed, empty_spots_left - 1, -2.0, 2.0, !player, level)?;
        Ok(-q)
    }

    /// Settle a forced move from the cache or tactics, caching what tactics decide.
    fn resolve_forced(
        &mut self,
        board: &mut Board,
        mv: Move,
        player: Player,
        level: u32,
    ) -> Option<f32> {
        let placed = board.place(mv, player);
        let key = placed.key();
        if let Some(q) = self.cache.get(&key, level) {
            self.stats.cache_hits += 1;
            return Some(q);
        }

        let q = if is_immediate_win(&placed, mv, player) {
            WIN
        } else if is_imminent_loss(&placed, player) {
            LOSS
        } else if will_win_next_move(&placed, mv, player) {
            WIN
        } else {
            return None;
        };
        self.cache.set(key, q, level);
        Some(q)
    }

    /// Play `mv` and return the negated value of the opponent's best reply.
    #[allow(clippy::too_many_arguments)]
    fn next_ply_value(
        &mut self,
        board: &mut Board,
        empty_spots_left: usize,
        mv: Move,
        alpha: f32,
        beta: f32,
        player: Player,
        level: u32,
    ) -> Result<f32, SearchError> {
        let mut placed = board.place(mv, player);
        let (_, q) =
            self.best_action_value(&mut placed, empty_spots_left - 1, alpha, beta, !player, level)?;
        Ok(-q)
    }

    fn evaluate_leaves(
        &mut self,
        board: &Board,
        player: Player,
        moves: &[Move],
    ) -> Result<Vec<f32>, SearchError> {
        self.stats.leaf_batches += 1;
        self.stats.leaf_positions += moves.len() as u64;
        let raw = self.evaluator.evaluate(board, player, moves)?;
        Ok(validate_scores(raw, moves.len())?)
    }
}
