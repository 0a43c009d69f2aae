//! Iterative-deepening driver: widens an aspiration window around each
//! iteration's previous score, falls back to a full window when the window
//! keeps failing, and extracts the principal variation from the
//! transposition table to report via the info callback.
//!
//! Widen-and-retry aspiration loop with PV extraction (and cycle detection,
//! since the transposition table can point into a loop) wired onto
//! [`TimeManager`](crate::time::TimeManager) for iteration stop decisions.

use crate::types::Move;

use super::{SearchContext, SearchInfoCallback, SearchIterationInfo, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, SCORE_INFINITE};
use crate::time::IterationOutcome;

const INITIAL_DELTA: i32 = 35;
const SHALLOW_INITIAL_DELTA: i32 = 20;
const SHALLOW_DELTA_DEPTH: u32 = 6;
const MAX_DELTA: i32 = 800;

/// Run iterative deepening from depth 1 up to `max_depth` (or until the time
/// manager says to stop), returning the best move found by the last fully
/// or partially completed iteration.
pub(crate) fn run_iterative_deepening(ctx: &mut SearchContext, max_depth: u32, info_callback: Option<&SearchInfoCallback>) -> Option<Move> {
    let mut best_move = None;
    let mut previous_score = 0;

    for depth in 1..=max_depth.max(1) {
        let start_nodes = ctx.nodes;
        let iteration_start = ctx.time.elapsed();

        let (score, completed) = aspiration_search(ctx, depth, previous_score);
        if !completed && ctx.should_stop() && depth > 1 {
            break;
        }

        let iteration_move = ctx.tt.probe(ctx.board.hash()).and_then(|e| e.best_move());
        let best_move_changed = iteration_move.is_some() && iteration_move != best_move;
        if iteration_move.is_some() {
            best_move = iteration_move;
        }
        previous_score = score;

        ctx.time.record_iteration(IterationOutcome { depth, score, best_move_changed });

        if let Some(callback) = info_callback {
            let elapsed_ms = ctx.time.elapsed().as_millis() as u64;
            let node_delta = ctx.nodes - start_nodes;
            let iteration_ms = (ctx.time.elapsed() - iteration_start).as_millis().max(1) as u64;
            let nps = node_delta * 1000 / iteration_ms;
            let mate_in = mate_distance_in_moves(score);
            let pv = extract_pv(ctx, depth);
            callback(&SearchIterationInfo { depth, seldepth: ctx.seldepth, nodes: ctx.nodes, nps, time_ms: elapsed_ms, score, mate_in, pv, tt_hits: ctx.tt_hits });
        }

        if ctx.should_stop() {
            break;
        }
        if score.abs() >= MATE_SCORE - MAX_PLY as i32 {
            break;
        }
    }

    best_move
}

/// Search one depth with an aspiration window around `previous_score`,
/// widening (and eventually falling back to a full window) on fail-high or
/// fail-low.
fn aspiration_search(ctx: &mut SearchContext, depth: u32, previous_score: i32) -> (i32, bool) {
    if depth <= 2 {
        let score = ctx.alphabeta(depth, -SCORE_INFINITE, SCORE_INFINITE, true, 0, Move::null());
        return (score, !ctx.should_stop());
    }

    let mut delta = if depth <= SHALLOW_DELTA_DEPTH { SHALLOW_INITIAL_DELTA } else { INITIAL_DELTA };
    let mut alpha = (previous_score - delta).max(-SCORE_INFINITE);
    let mut beta = (previous_score + delta).min(SCORE_INFINITE);

    loop {
        let score = ctx.alphabeta(depth, alpha, beta, true, 0, Move::null());
        if ctx.should_stop() {
            return (score, false);
        }

        if score <= alpha {
            delta = (delta * 2).min(MAX_DELTA);
            alpha = (previous_score - delta).max(-SCORE_INFINITE);
            if delta >= MAX_DELTA {
                alpha = -SCORE_INFINITE;
            }
        } else if score >= beta {
            delta = (delta * 2).min(MAX_DELTA);
            beta = (previous_score + delta).min(SCORE_INFINITE);
            if delta >= MAX_DELTA {
                beta = SCORE_INFINITE;
            }
        } else {
            return (score, true);
        }

        if alpha == -SCORE_INFINITE && beta == SCORE_INFINITE {
            let score = ctx.alphabeta(depth, -SCORE_INFINITE, SCORE_INFINITE, true, 0, Move::null());
            return (score, !ctx.should_stop());
        }
    }
}

/// Walk the transposition table's best moves from the root, stopping at a
/// missing entry, a non-PV bound, or a repeated position (a TT cycle).
fn extract_pv(ctx: &mut SearchContext, max_len: u32) -> Vec<Move> {
    let mut pv = Vec::with_capacity(max_len as usize);
    let mut seen_hashes = Vec::with_capacity(max_len as usize);

    for _ in 0..max_len.max(1) {
        let hash = ctx.board.hash();
        if seen_hashes.contains(&hash) {
            break;
        }
        seen_hashes.push(hash);

        let Some(mv) = ctx.tt.probe(hash).and_then(|e| e.best_move()) else {
            break;
        };

        let legal = ctx.board.generate_legal_moves();
        if !legal.as_slice().contains(&mv) {
            break;
        }

        ctx.board.make_move(mv);
        pv.push(mv);
    }

    for _ in 0..pv.len() {
        ctx.board.unmake_move();
    }

    pv
}

fn mate_distance_in_moves(score: i32) -> Option<i32> {
    if score >= MATE_THRESHOLD {
        Some((MATE_SCORE - score + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        Some(-((MATE_SCORE + score + 1) / 2))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::eval::ClassicalEvaluator;
    use crate::board::Board;
    use crate::ordering::OrderingContext;
    use crate::time::{TimeControl, TimeManager};
    use crate::tt::TranspositionTable;
    use std::sync::atomic::AtomicBool;

    fn run(fen: &str, max_depth: u32) -> Option<Move> {
        let mut board: Board = fen.parse().unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(MAX_PLY);
        let evaluator = ClassicalEvaluator::default();
        let params = super::super::SearchParams::default();
        let mut time = TimeManager::new(&TimeControl::infinite(), 1.0, 1.0, 1.0);
        let stop = AtomicBool::new(false);
        let mut ctx = SearchContext {
            board: &mut board,
            tt: &mut tt,
            ordering: &mut ordering,
            evaluator: &evaluator,
            params: &params,
            time: &mut time,
            stop: &stop,
            generation: 1,
            nodes: 0,
            seldepth: 0,
            tt_hits: 0,
            initial_depth: 1,
            static_eval: [0; MAX_PLY],
            previous_move: [Move::null(); MAX_PLY],
            previous_piece: [None; MAX_PLY],
        };
        run_iterative_deepening(&mut ctx, max_depth, None)
    }

    #[test]
    fn finds_a_move_in_a_quiet_middlegame() {
        let mv = run("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3", 3);
        assert!(mv.is_some());
    }

    #[test]
    fn finds_forced_mate_in_one() {
        let mv = run("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 3);
        assert!(mv.is_some());
    }

    #[test]
    fn mate_distance_conversion_is_symmetric() {
        let white_mate = mate_distance_in_moves(MATE_SCORE - 3).unwrap();
        let black_mate = mate_distance_in_moves(-(MATE_SCORE - 3)).unwrap();
        assert_eq!(white_mate, -black_mate);
    }
}
