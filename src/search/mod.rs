//! Iterative-deepening PVS search over [`Board`](crate::board::Board):
//! aspiration windows at the root, null-move/ProbCut/futility/history
//! pruning and late-move reductions inside the tree, quiescence search at
//! the horizon, all feeding and fed by the transposition table and the
//! killer/counter/followup/history ordering tables.
//!
//! Split across submodules: the node-level alpha-beta/PVS core, pruning and
//! extension heuristics, quiescence at the horizon, and the iterative
//! driver that ties them together.

mod alpha_beta;
mod extensions;
mod iterative;
mod pruning;
mod quiescence;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::board::eval::PositionEvaluator;
use crate::board::Board;
use crate::ordering::OrderingContext;
use crate::time::{TimeControl, TimeManager};
use crate::tt::TranspositionTable;
use crate::types::{Move, Piece};

use iterative::run_iterative_deepening;

/// Maximum search ply depth any fixed-size per-ply table needs to index.
pub const MAX_PLY: usize = 128;

/// Scores at or above this magnitude represent a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;
/// The mate score at ply 0; actual mate scores are offset by ply so closer
/// mates sort ahead of farther ones.
pub const MATE_SCORE: i32 = MATE_THRESHOLD + MAX_PLY as i32;
/// Sentinel alpha/beta bound wider than any real evaluation or mate score.
pub const SCORE_INFINITE: i32 = 30_000;

/// Tunable margins and thresholds for the search's pruning and reduction
/// heuristics, factored out of the recursive search so they can be swapped
/// without touching control flow.
#[derive(Clone, Debug)]
pub struct SearchParams {
    pub null_move_min_depth: u32,
    pub null_move_base_reduction: u32,
    pub null_move_verification_depth: u32,
    pub probcut_min_depth: u32,
    pub probcut_margin: i32,
    pub reverse_futility_max_depth: u32,
    pub reverse_futility_margin_per_depth: i32,
    pub futility_max_depth: u32,
    pub futility_base_margin: i32,
    pub futility_margin_per_depth: i32,
    pub history_pruning_max_depth: u32,
    pub singular_min_depth: u32,
    pub singular_margin_per_depth: i32,
    pub internal_iterative_reduction_min_depth: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            null_move_min_depth: 3,
            null_move_base_reduction: 2,
            null_move_verification_depth: 12,
            probcut_min_depth: 8,
            probcut_margin: 350,
            reverse_futility_max_depth: 8,
            reverse_futility_margin_per_depth: 120,
            futility_max_depth: 7,
            futility_base_margin: 150,
            futility_margin_per_depth: 175,
            history_pruning_max_depth: 4,
            singular_min_depth: 6,
            singular_margin_per_depth: 3,
            internal_iterative_reduction_min_depth: 4,
        }
    }
}

/// Search result: the chosen move and, if requested, the move the engine
/// expects to ponder on while the opponent is to move.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
}

/// Per-iteration progress, suitable for forwarding to a UCI `info` line.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub score: i32,
    pub mate_in: Option<i32>,
    pub pv: Vec<Move>,
    pub tt_hits: u64,
}

pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Cross-search state: transposition table, move-ordering tables, and the
/// TT generation counter, all reused across searches within one game and
/// cleared together on `newgame`.
pub struct SearchState {
    pub tt: TranspositionTable,
    pub ordering: OrderingContext,
    pub generation: u16,
    pub params: SearchParams,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_size_mb: usize) -> Self {
        SearchState { tt: TranspositionTable::new(tt_size_mb), ordering: OrderingContext::new(MAX_PLY), generation: 0, params: SearchParams::default() }
    }

    /// Clear all cross-search tables, as on a `newgame` command.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.ordering.clear();
        self.generation = 0;
    }

    /// Resize the transposition table, discarding its contents.
    pub fn resize_tt(&mut self, size_mb: usize) {
        self.tt = TranspositionTable::new(size_mb);
    }
}

/// Everything a single `search()` call needs beyond the persisted
/// [`SearchState`]: the board to search from, the evaluator to score
/// leaves, the time control, and the cooperative stop flag.
pub struct SearchRequest<'a> {
    pub board: &'a mut Board,
    pub state: &'a mut SearchState,
    pub evaluator: &'a dyn PositionEvaluator,
    pub time_control: TimeControl,
    pub max_depth: u32,
    pub stop: Arc<AtomicBool>,
    pub info_callback: Option<SearchInfoCallback>,
}

/// Mutable per-call search context threaded through the recursive search
/// functions: everything in [`SearchState`] plus counters and per-ply
/// scratch space that only make sense for the duration of one search.
pub(crate) struct SearchContext<'a> {
    pub board: &'a mut Board,
    pub tt: &'a mut TranspositionTable,
    pub ordering: &'a mut OrderingContext,
    pub evaluator: &'a dyn PositionEvaluator,
    pub params: &'a SearchParams,
    pub time: &'a mut TimeManager,
    pub stop: &'a AtomicBool,
    pub generation: u16,
    pub nodes: u64,
    pub seldepth: u32,
    pub tt_hits: u64,
    pub initial_depth: u32,
    pub static_eval: [i32; MAX_PLY],
    pub previous_move: [Move; MAX_PLY],
    pub previous_piece: [Option<Piece>; MAX_PLY],
}

impl SearchContext<'_> {
    #[inline]
    pub(crate) fn should_stop(&self) -> bool {
        use std::sync::atomic::Ordering;
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        self.time.should_stop(self.initial_depth, self.nodes)
    }

    #[inline]
    pub(crate) fn evaluate(&self) -> i32 {
        self.evaluator.evaluate(self.board)
    }
}

/// Run a full iterative-deepening search and return the chosen move (plus a
/// ponder suggestion extracted from the transposition table).
pub fn search(request: SearchRequest<'_>) -> SearchResult {
    let SearchRequest { board, state, evaluator, time_control, max_depth, stop, info_callback } = request;

    state.generation = state.generation.wrapping_add(1);

    let legal_moves = board.generate_legal_moves();
    if legal_moves.is_empty() {
        #[cfg(feature = "logging")]
        log::warn!("search() called on a position with no legal moves");
        return SearchResult::default();
    }
    if legal_moves.len() == 1 {
        return SearchResult { best_move: Some(legal_moves.as_slice()[0]), ponder_move: None };
    }

    let phase_fraction = f64::from(board.phase()) / f64::from(crate::board::eval::tables::TOTAL_PHASE);
    let complexity = crate::time::complexity_from_move_count(legal_moves.len());
    let material_imbalance = crate::time::material_imbalance_factor(evaluator.evaluate(board));
    let mut time = TimeManager::new(&time_control, phase_fraction, complexity, material_imbalance);

    let mut ctx = SearchContext {
        board,
        tt: &mut state.tt,
        ordering: &mut state.ordering,
        evaluator,
        params: &state.params,
        time: &mut time,
        stop: &stop,
        generation: state.generation,
        nodes: 0,
        seldepth: 0,
        tt_hits: 0,
        initial_depth: 1,
        static_eval: [0; MAX_PLY],
        previous_move: [Move::null(); MAX_PLY],
        previous_piece: [None; MAX_PLY],
    };

    let best_move = run_iterative_deepening(&mut ctx, max_depth, info_callback.as_ref());

    let ponder_move = best_move.and_then(|mv| {
        ctx.board.make_move(mv);
        let reply = ctx.tt.probe(ctx.board.hash()).and_then(|e| e.best_move());
        ctx.board.unmake_move();
        reply
    });

    SearchResult { best_move, ponder_move }
}
