//! Event-driven protocol engine.
//!
//! The main thread owns the position and answers commands; each `go` moves
//! the searcher onto a worker thread, which hands it back with the
//! prediction when done.

use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::mpsc;

use tracing::{debug, info, warn};

use fiverow_core::Player;
use fiverow_engine::{LeafEvaluator, Prediction, SearchConfig, Searcher};

use crate::command::{Command, EngineOption, GoParams, PositionInfo, parse_command};
use crate::error::ProtocolError;

/// Configuration knobs adjustable via `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cache capacity in entries.
    pub cache_size: usize,
    /// Level used by `go` without an explicit level.
    pub level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for EngineConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            cache_size: config.cache_capacity,
            level: config.default_level,
        }
    }
}

/// Whether a search thread currently owns the searcher.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent<E> {
    Command(Result<Command, ProtocolError>),
    SearchDone(SearchDone<E>),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone<E> {
    prediction: Prediction,
    player: Player,
    searcher: Searcher<E>,
}

/// The protocol engine, holding the current position and the searcher.
pub struct ProtocolEngine<E> {
    position: PositionInfo,
    searcher: Option<Searcher<E>>,
    state: EngineState,
    config: EngineConfig,
    /// Cache capacity to apply when the search thread returns the searcher.
    pending_resize: Option<usize>,
}

impl<E: LeafEvaluator + Send + 'static> ProtocolEngine<E> {
    /// Create an engine with default search settings and an empty board.
    pub fn new(evaluator: E) -> Self {
        Self::with_config(evaluator, SearchConfig::default())
    }

    pub fn with_config(evaluator: E, search: SearchConfig) -> Self {
        Self {
            position: PositionInfo::default(),
            config: EngineConfig::from(&search),
            searcher: Some(Searcher::with_config(evaluator, search)),
            state: EngineState::Idle,
            pending_resize: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the event loop on stdin and stdout until `quit` or input closes.
    pub fn run(self) -> Result<(), ProtocolError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(BufReader::new(io::stdin()), &mut out)
    }

    /// Run the event loop on arbitrary input and output.
    ///
    /// Input is read on its own thread. A search still running when input
    /// ends or `quit` arrives is waited for, and its result is written.
    pub fn run_with<R, W>(mut self, input: R, out: &mut W) -> Result<(), ProtocolError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (tx, rx) = mpsc::channel::<EngineEvent<E>>();

        let input_tx = tx.clone();
        std::thread::spawn(move || {
            for line in input.lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received command");
                        if input_tx.send(EngineEvent::Command(parse_command(trimmed))).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = input_tx.send(EngineEvent::Command(Err(e.into())));
                        break;
                    }
                }
            }
            let _ = input_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::Command(Ok(cmd)) => match cmd {
                    Command::IsReady => {
                        writeln!(out, "readyok")?;
                        out.flush()?;
                    }
                    Command::Status => {
                        let status = match self.state {
                            EngineState::Idle => "idle",
                            EngineState::Searching => "busy",
                        };
                        writeln!(out, "status {status}")?;
                        out.flush()?;
                    }
                    Command::NewGame => self.position = PositionInfo::default(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption(opt) => self.handle_setoption(opt),
                    Command::Quit => break,
                    Command::Unknown(name) => debug!(%name, "ignoring unknown command"),
                },
                EngineEvent::Command(Err(e)) => {
                    warn!(error = %e, "protocol parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done, out)?,
                EngineEvent::InputClosed => break,
            }
        }

        if matches!(self.state, EngineState::Searching) {
            for event in &rx {
                if let EngineEvent::SearchDone(done) = event {
                    self.finish_search(done, out)?;
                    break;
                }
            }
        }

        info!("fiverow shutting down");
        Ok(())
    }

    fn handle_position(&mut self, info: PositionInfo) {
        debug!(
            player = info.player.external_id(),
            empty = info.empty_spots_left,
            "position set"
        );
        self.position = info;
    }

    fn handle_setoption(&mut self, option: EngineOption) {
        match option {
            EngineOption::CacheSize(size) => {
                self.config.cache_size = size;
                if let Some(ref mut searcher) = self.searcher {
                    searcher.resize_cache(size);
                } else {
                    // Search thread owns the searcher; resize when it comes back
                    self.pending_resize = Some(size);
                }
            }
            EngineOption::Level(level) => {
                self.config.level = level;
                info!(level, "default level set");
            }
        }
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent<E>>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while searching, ignoring");
            return;
        }
        let Some(mut searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return;
        };

        let level = params.level.unwrap_or(self.config.level);
        let player = self.position.player;
        let empty_spots_left = self.position.empty_spots_left;
        let mut board = self.position.board.clone();
        let tx = tx.clone();
        debug!(level, player = player.external_id(), "starting search");

        std::thread::spawn(move || {
            let prediction =
                searcher.predict_with_empty_spots(&mut board, empty_spots_left, player, level);
            let _ = tx.send(EngineEvent::SearchDone(SearchDone {
                prediction,
                player,
                searcher,
            }));
        });

        self.state = EngineState::Searching;
    }

    fn finish_search<W: Write>(
        &mut self,
        done: SearchDone<E>,
        out: &mut W,
    ) -> Result<(), ProtocolError> {
        let mut searcher = done.searcher;
        if let Some(size) = self.pending_resize.take() {
            searcher.resize_cache(size);
        }
        self.searcher = Some(searcher);
        self.state = EngineState::Idle;

        writeln!(out, "{}", format_prediction(done.player, &done.prediction))?;
        writeln!(out, "{}", format_bestmove(&done.prediction))?;
        out.flush()?;
        Ok(())
    }
}

/// Format a prediction as `prediction playing <p> [degraded] moves r,c,prob ...`.
pub fn format_prediction(player: Player, prediction: &Prediction) -> String {
    let mut line = format!("prediction playing {}", player.external_id());
    if prediction.degraded {
        line.push_str(" degraded");
    }
    line.push_str(" moves");
    for m in &prediction.moves {
        let _ = write!(line, " {},{:.4}", m.mv, m.winrate);
    }
    line
}

/// Format the best move as `bestmove r,c`, or `bestmove none` without moves.
pub fn format_bestmove(prediction: &Prediction) -> String {
    match prediction.best() {
        Some(best) => format!("bestmove {}", best.mv),
        None => "bestmove none".to_string(),
    }
}
