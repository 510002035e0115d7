//! Leaf evaluation: scoring candidate moves at the bottom of the search.
//!
//! The search hands a whole batch of candidates to the evaluator at once so
//! that a batched model can score them in a single call.

pub mod model;
pub mod pattern;
pub mod planes;

use fiverow_core::{Board, Move, Player};

pub use self::model::{BatchModel, ModelEvaluator};
pub use self::pattern::PatternEvaluator;
pub use self::planes::Planes;

/// Errors reported by a [`LeafEvaluator`] or found while validating its output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The evaluator could not produce scores at all.
    #[error("leaf evaluator unavailable: {reason}")]
    Unavailable { reason: String },
    /// The evaluator returned the wrong number of scores.
    #[error("leaf evaluator returned {found} scores for {expected} candidates")]
    Malformed { expected: usize, found: usize },
    /// A score was NaN or infinite.
    #[error("leaf evaluator returned a non-finite score for candidate {index}")]
    NonFinite { index: usize },
}

/// Scores candidate moves for the side to move.
///
/// For each candidate, the returned value estimates the outcome for
/// `player` after playing it, in `[-1, 1]`: `1` is a certain win, `-1` a
/// certain loss. Values outside that range are clamped by the search.
pub trait LeafEvaluator {
    fn evaluate(
        &mut self,
        board: &Board,
        player: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError>;
}

impl<E: LeafEvaluator + ?Sized> LeafEvaluator for Box<E> {
    fn evaluate(
        &mut self,
        board: &Board,
        player: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError> {
        (**self).evaluate(board, player, candidates)
    }
}

/// Check an evaluator's output against its batch and clamp it to `[-1, 1]`.
pub fn validate_scores(scores: Vec<f32>, expected: usize) -> Result<Vec<f32>, EvalError> {
    if scores.len() != expected {
        return Err(EvalError::Malformed {
            expected,
            found: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|q| !q.is_finite()) {
        return Err(EvalError::NonFinite { index });
    }
    Ok(scores.into_iter().map(|q| q.clamp(-1.0, 1.0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_wrong_length() {
        assert_eq!(
            validate_scores(vec![0.0, 0.5], 3),
            Err(EvalError::Malformed {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn validate_rejects_nan() {
        assert_eq!(
            validate_scores(vec![0.0, f32::NAN], 2),
            Err(EvalError::NonFinite { index: 1 })
        );
        assert_eq!(
            validate_scores(vec![f32::INFINITY], 1),
            Err(EvalError::NonFinite { index: 0 })
        );
    }

    #[test]
    fn validate_clamps() {
        assert_eq!(validate_scores(vec![1.5, -3.0, 0.25], 3), Ok(vec![1.0, -1.0, 0.25]));
    }

    #[test]
    fn boxed_evaluator_delegates() {
        struct Half;
        impl LeafEvaluator for Half {
            fn evaluate(
                &mut self,
                _: &Board,
                _: Player,
                c: &[Move],
            ) -> Result<Vec<f32>, EvalError> {
                Ok(vec![0.5; c.len()])
            }
        }
        let mut boxed: Box<dyn LeafEvaluator> = Box::new(Half);
        let scores = boxed
            .evaluate(&Board::new(), Player::Black, &[Move::new(7, 7), Move::new(7, 8)])
            .unwrap();
        assert_eq!(scores, vec![0.5, 0.5]);
    }

    #[test]
    fn error_display() {
        let err = EvalError::Malformed { expected: 4, found: 1 };
        assert_eq!(format!("{err}"), "leaf evaluator returned 1 scores for 4 candidates");
    }
}
