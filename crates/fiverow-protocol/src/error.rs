//! Protocol errors.

use fiverow_core::BoardError;

/// Errors that can occur while handling protocol input.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The `position` command has an unexpected token.
    #[error("malformed position command near {token:?}")]
    MalformedPosition {
        /// The token that could not be placed.
        token: String,
    },

    /// A history entry is not of the form `row,col,player`.
    #[error("invalid move: {token}")]
    InvalidMove {
        /// The offending entry.
        token: String,
    },

    /// The history parsed but does not describe a legal board.
    #[error("invalid history: {0}")]
    InvalidHistory(#[from] BoardError),

    /// `setoption` named an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as received.
        name: String,
    },

    /// A parameter was given without its value.
    #[error("missing value for {param}")]
    MissingValue {
        /// The parameter name.
        param: String,
    },

    /// A parameter value could not be parsed.
    #[error("invalid value for {param}: {value}")]
    InvalidValue {
        /// The parameter name.
        param: String,
        /// The value that failed to parse.
        value: String,
    },

    /// An I/O error occurred while reading from stdin.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
