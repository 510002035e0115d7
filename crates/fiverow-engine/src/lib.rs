//! Move search and leaf evaluation for fiverow.

pub mod eval;
pub mod search;

pub use eval::{BatchModel, EvalError, LeafEvaluator, ModelEvaluator, PatternEvaluator, Planes};
pub use search::cache::LeveledCache;
pub use search::ordering::generate_candidates;
pub use search::{MoveWinrate, Prediction, SearchConfig, SearchError, SearchStats, Searcher};
