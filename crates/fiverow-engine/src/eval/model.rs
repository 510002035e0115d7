//! Leaf evaluation backed by a batched position model.
//!
//! Each candidate is encoded as [`Planes`] and the whole batch is scored in
//! one call, so an inference backend sees one request per search node.

use fiverow_core::{Board, Move, Player};
use tracing::trace;

use super::{EvalError, LeafEvaluator, Planes};

/// A model scoring encoded positions.
///
/// Scores are for the side whose stone was just added in plane 0, in input
/// order, nominally in `[-1, 1]`.
pub trait BatchModel {
    fn score(&mut self, inputs: &[Planes]) -> Result<Vec<f32>, EvalError>;
}

impl<F> BatchModel for F
where
    F: FnMut(&[Planes]) -> Result<Vec<f32>, EvalError>,
{
    fn score(&mut self, inputs: &[Planes]) -> Result<Vec<f32>, EvalError> {
        self(inputs)
    }
}

/// [`LeafEvaluator`] that encodes candidates for a [`BatchModel`].
#[derive(Debug, Clone)]
pub struct ModelEvaluator<M> {
    model: M,
}

impl<M: BatchModel> ModelEvaluator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: BatchModel> LeafEvaluator for ModelEvaluator<M> {
    fn evaluate(
        &mut self,
        board: &Board,
        player: Player,
        candidates: &[Move],
    ) -> Result<Vec<f32>, EvalError> {
        let inputs = Planes::encode_batch(board, player, candidates);
        trace!(batch = inputs.len(), "scoring encoded batch");
        self.model.score(&inputs)
    }
}
