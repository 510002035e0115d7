//! Protocol command parsing.

use fiverow_core::{Board, CELLS, Player};

use crate::error::ProtocolError;

/// Deepest accepted search level. Deeper searches end at the full board anyway.
pub const MAX_LEVEL: u32 = CELLS as u32;

/// A position to search, with the side to move.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    pub board: Board,
    /// The player whose move is being predicted.
    pub player: Player,
    /// `225 - history length`.
    pub empty_spots_left: usize,
}

impl Default for PositionInfo {
    fn default() -> Self {
        Self {
            board: Board::new(),
            player: Player::Black,
            empty_spots_left: CELLS,
        }
    }
}

/// Parameters for the `go` command.
///
/// A bare `go` searches at the configured level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Search level for this request only.
    pub level: Option<u32>,
}

/// Options adjustable with `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOption {
    /// Cache capacity in entries.
    CacheSize(usize),
    /// Default search level.
    Level(u32),
}

/// A parsed protocol command.
#[derive(Debug)]
pub enum Command {
    /// `isready` -- synchronization ping.
    IsReady,
    /// `status` -- report whether a search is running.
    Status,
    /// `newgame` -- clear the position.
    NewGame,
    /// `position` -- set the board from a move history.
    Position(PositionInfo),
    /// `go` -- predict moves for the current position.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(EngineOption),
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (ignored).
    Unknown(String),
}

/// Parse a single line of input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "isready" => Ok(Command::IsReady),
        "status" => Ok(Command::Status),
        "newgame" => Ok(Command::NewGame),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports `position [playing 1|2] [moves r,c,p r,c,p ...]`. Without
/// `playing`, black moves after an even number of moves.
fn parse_position(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let mut rest = tokens;

    let mut player = None;
    if rest.first() == Some(&"playing") {
        let id: u8 = parse_value(rest.get(1), "playing")?;
        player = Some(Player::from_external_id(id).ok_or_else(|| ProtocolError::InvalidValue {
            param: "playing".to_string(),
            value: id.to_string(),
        })?);
        rest = &rest[2..];
    }

    let mut history = Vec::new();
    match rest.first() {
        None => {}
        Some(&"moves") => {
            for token in &rest[1..] {
                history.push(parse_history_entry(token)?);
            }
        }
        Some(token) => {
            return Err(ProtocolError::MalformedPosition {
                token: token.to_string(),
            });
        }
    }

    let board = Board::from_external_history(&history)?;
    let player = player.unwrap_or(if history.len() % 2 == 0 {
        Player::Black
    } else {
        Player::White
    });

    Ok(Command::Position(PositionInfo {
        board,
        player,
        empty_spots_left: CELLS - history.len(),
    }))
}

/// Parse one `row,col,player` history entry.
fn parse_history_entry(token: &str) -> Result<(u32, u32, u32), ProtocolError> {
    let invalid = || ProtocolError::InvalidMove {
        token: token.to_string(),
    };
    let mut parts = token.split(',').map(|part| part.parse::<u32>().map_err(|_| invalid()));
    let row = parts.next().ok_or_else(invalid)??;
    let col = parts.next().ok_or_else(invalid)??;
    let id = parts.next().ok_or_else(invalid)??;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((row, col, id))
}

/// Parse the `go` command arguments. Unknown tokens are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "level" => {
                params.level = Some(parse_level(tokens.get(i + 1), "level")?);
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <Name> value <N>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, ProtocolError> {
    if tokens.first() != Some(&"name") {
        return Err(ProtocolError::MissingValue {
            param: "name".to_string(),
        });
    }
    let name = tokens.get(1).ok_or_else(|| ProtocolError::MissingValue {
        param: "name".to_string(),
    })?;
    let value = match tokens.get(2) {
        Some(&"value") => tokens.get(3),
        _ => None,
    };

    let option = if name.eq_ignore_ascii_case("cachesize") {
        EngineOption::CacheSize(parse_value(value, "CacheSize")?)
    } else if name.eq_ignore_ascii_case("level") {
        EngineOption::Level(parse_level(value, "Level")?)
    } else {
        return Err(ProtocolError::UnknownOption {
            name: name.to_string(),
        });
    };
    Ok(Command::SetOption(option))
}

/// Parse a search level, rejecting anything above [`MAX_LEVEL`].
fn parse_level(token: Option<&&str>, param: &str) -> Result<u32, ProtocolError> {
    let level: u32 = parse_value(token, param)?;
    if level > MAX_LEVEL {
        return Err(ProtocolError::InvalidValue {
            param: param.to_string(),
            value: level.to_string(),
        });
    }
    Ok(level)
}

/// Parse a parameter value from a token.
fn parse_value<T: std::str::FromStr>(
    token: Option<&&str>,
    param: &str,
) -> Result<T, ProtocolError> {
    let value = token.ok_or_else(|| ProtocolError::MissingValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| ProtocolError::InvalidValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
