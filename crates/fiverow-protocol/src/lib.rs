//! Line-oriented text protocol for the fiverow engine.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, EngineOption, GoParams, PositionInfo, parse_command};
pub use engine::{EngineConfig, ProtocolEngine, format_bestmove, format_prediction};
pub use error::ProtocolError;
