//! Engine control surface: the small set of operations a UCI-style caller
//! drives (position setup, option changes, search start/stop) wrapped
//! around a background search thread so those calls stay responsive while a
//! search is running.
//!
//! Single-threaded by design: a stop flag plus a joinable thread, with no
//! SMP or ponder machinery.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::board::error::{FenError, MoveParseError};
use crate::board::eval::{ClassicalEvaluator, Evaluator};
use crate::board::Board;
use crate::config::{ConfigError, EngineConfig};
use crate::search::{self, SearchInfoCallback, SearchResult, SearchState};
use crate::time::TimeControl;

const SEARCH_STACK_SIZE: usize = 16 * 1024 * 1024;

/// The five error categories a control-surface call can report, mirroring
/// the recovery policy: invalid input is rejected without side effects,
/// resource requests degrade instead of failing, and an internal
/// consistency failure is surfaced rather than silently ignored.
#[derive(Debug, Clone)]
pub enum EngineError {
    InvalidFen(FenError),
    IllegalMove(String),
    ResourceDegraded(String),
    InternalInconsistency(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            EngineError::IllegalMove(notation) => write!(f, "illegal move: {notation}"),
            EngineError::ResourceDegraded(msg) => write!(f, "resource degraded: {msg}"),
            EngineError::InternalInconsistency(msg) => write!(f, "internal inconsistency: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::InvalidFen(e)
    }
}

/// Static identity reported to a caller asking "who are you" before any
/// position has been set.
pub struct EngineIdentity {
    pub name: &'static str,
    pub author: &'static str,
}

pub const IDENTITY: EngineIdentity = EngineIdentity { name: "corvid", author: "corvid contributors" };

/// A running background search: the stop flag a caller can signal, and the
/// join handle kept by the [`Engine`] so it can block on completion without
/// needing the [`SearchHandle`] the caller may have already consumed.
struct SearchJob {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SearchJob {
    fn stop_and_wait(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }

    fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A handle to a search in progress: `wait()` blocks on the result channel,
/// and `signal_stop()` requests early termination, independent of the
/// [`Engine`] that started it.
pub struct SearchHandle {
    stop: Arc<AtomicBool>,
    receiver: mpsc::Receiver<SearchResult>,
}

impl SearchHandle {
    /// Block until the search finishes and return its result.
    #[must_use]
    pub fn wait(self) -> SearchResult {
        self.receiver.recv().unwrap_or_default()
    }

    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// The engine's control surface: a current position, persisted search
/// state (transposition table, ordering tables), a configured evaluator,
/// and at most one in-flight search.
pub struct Engine {
    board: Board,
    config: EngineConfig,
    state: Arc<Mutex<SearchState>>,
    evaluator: Arc<Evaluator>,
    job: Option<SearchJob>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let hash_mb = config.hash_mb;
        let contempt_cp = config.contempt_cp;
        Engine {
            board: Board::starting_position(),
            config,
            state: Arc::new(Mutex::new(SearchState::new(hash_mb))),
            evaluator: Arc::new(Evaluator::Classical(ClassicalEvaluator::new(contempt_cp))),
            job: None,
        }
    }

    #[must_use]
    pub fn identify(&self) -> EngineIdentity {
        IDENTITY
    }

    /// Always ready once constructed: there is no asynchronous warm-up step.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        true
    }

    /// Reset to the starting position and clear all cross-search tables.
    pub fn newgame(&mut self) {
        #[cfg(feature = "logging")]
        log::info!("newgame: resetting board and clearing search state");
        self.stop_search();
        self.board = Board::starting_position();
        self.state.lock().new_game();
    }

    /// Set the position from a FEN string and play `moves` (UCI long
    /// algebraic) against it. On any error the engine's position is left
    /// unchanged.
    pub fn set_position(&mut self, fen: &str, moves: &[String]) -> Result<(), EngineError> {
        self.stop_search();

        let mut board: Board = fen.parse().map_err(EngineError::InvalidFen)?;
        for uci in moves {
            board.make_uci_move(uci).map_err(|e: MoveParseError| EngineError::IllegalMove(format!("{e} ('{uci}')")))?;
        }

        self.board = board;
        Ok(())
    }

    pub fn set_option_hash_mb(&mut self, requested_mb: usize) -> Result<(), EngineError> {
        self.stop_search();
        let result = self.config.set_hash_mb(requested_mb);
        self.state.lock().resize_tt(self.config.hash_mb);
        result.map_err(|e: ConfigError| {
            #[cfg(feature = "logging")]
            log::warn!("{e}");
            EngineError::ResourceDegraded(e.to_string())
        })
    }

    pub fn set_option_contempt(&mut self, contempt_cp: i32) {
        self.config.set_contempt_cp(contempt_cp);
        self.evaluator = Arc::new(Evaluator::Classical(ClassicalEvaluator::new(contempt_cp)));
    }

    pub fn set_option_threads(&mut self, threads: usize) {
        self.config.set_threads(threads);
    }

    pub fn set_option_tablebase_path(&mut self, path: Option<String>) {
        self.config.set_tablebase_path(path);
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Stop any running search and block until its thread has exited,
    /// discarding the result.
    pub fn stop(&mut self) {
        self.stop_search();
    }

    /// Signal a running search to stop without waiting for it to exit.
    pub fn signal_stop(&self) {
        if let Some(job) = &self.job {
            job.signal_stop();
        }
    }

    fn stop_search(&mut self) {
        if let Some(job) = self.job.take() {
            #[cfg(feature = "logging")]
            log::debug!("stopping in-flight search");
            job.stop_and_wait();
        }
    }

    /// Start a search on the current position in a background thread,
    /// returning a handle the caller can poll, stop, or block on.
    pub fn search(&mut self, time_control: TimeControl, max_depth: u32, info_callback: Option<SearchInfoCallback>) -> SearchHandle {
        self.stop_search();

        #[cfg(feature = "logging")]
        log::debug!("search: max_depth={max_depth}, infinite={}", time_control.infinite);

        let mut board = self.board.clone();
        let state = Arc::clone(&self.state);
        let evaluator = Arc::clone(&self.evaluator);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("search".to_owned())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let mut guard = state.lock();
                let result = search::search(search::SearchRequest {
                    board: &mut board,
                    state: &mut guard,
                    evaluator: evaluator.as_ref(),
                    time_control,
                    max_depth,
                    stop: stop_for_thread,
                    info_callback,
                });
                let _ = sender.send(result);
            })
            .expect("failed to spawn search thread");

        self.job = Some(SearchJob { stop: Arc::clone(&stop), handle });
        SearchHandle { stop, receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engine_starts_at_the_starting_position() {
        let engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.board().to_fen().split_whitespace().next(), Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"));
    }

    #[test]
    fn set_position_rejects_invalid_fen_without_mutating_state() {
        let mut engine = Engine::new(EngineConfig::default());
        let before = engine.board().to_fen();
        let result = engine.set_position("not a fen", &[]);
        assert!(result.is_err());
        assert_eq!(engine.board().to_fen(), before);
    }

    #[test]
    fn set_position_applies_moves_in_order() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &["e2e4".to_owned(), "e7e5".to_owned()]).unwrap();
        assert_eq!(engine.board().side_to_move(), crate::types::Color::White);
    }

    #[test]
    fn set_position_rejects_illegal_move_without_mutating_state() {
        let mut engine = Engine::new(EngineConfig::default());
        let before = engine.board().to_fen();
        let result = engine.set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &["e2e5".to_owned()]);
        assert!(result.is_err());
        assert_eq!(engine.board().to_fen(), before);
    }

    #[test]
    fn out_of_range_hash_reports_resource_degraded() {
        let mut engine = Engine::new(EngineConfig::default());
        let result = engine.set_option_hash_mb(999_999);
        assert!(matches!(result, Err(EngineError::ResourceDegraded(_))));
    }

    #[test]
    fn search_returns_a_move_for_the_starting_position() {
        let mut engine = Engine::new(EngineConfig::default());
        let handle = engine.search(TimeControl::movetime(50), 4, None);
        let result = handle.wait();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn signal_stop_lets_an_infinite_search_terminate() {
        let mut engine = Engine::new(EngineConfig::default());
        let handle = engine.search(TimeControl::infinite(), 64, None);
        handle.signal_stop();
        let result = handle.wait();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn newgame_resets_the_board_and_clears_state() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &["e2e4".to_owned()]).unwrap();
        engine.newgame();
        assert_eq!(engine.board().side_to_move(), crate::types::Color::White);
    }
}
