//! Quiescence search: extends the tree past the nominal horizon along
//! capturing and check-evading lines only, so the static evaluator is never
//! asked to score a position with a capture hanging.
//!
//! Stand-pat with phase-scaled delta pruning: the delta margin and
//! per-capture SEE threshold scale with the position's game-phase fraction
//! rather than sitting at fixed constants.

use crate::board::eval::tables::TOTAL_PHASE;
use crate::ordering::mvv_lva_score_by_values;
use crate::types::{Move, Piece};

use super::{SearchContext, MATE_SCORE, MAX_PLY, SCORE_INFINITE};

const MAX_QUIESCENCE_PLY: usize = MAX_PLY;

/// Search captures (and, when in check, all evasions) until the position is
/// quiet, returning a score from the side-to-move's perspective.
pub(crate) fn quiesce(ctx: &mut SearchContext, mut alpha: i32, beta: i32, ply: usize) -> i32 {
    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply as u32 + 1);

    if ctx.should_stop() || ply >= MAX_QUIESCENCE_PLY {
        return ctx.evaluate();
    }

    let side_to_move = ctx.board.side_to_move();
    let in_check = ctx.board.is_in_check(side_to_move);

    let stand_pat = if in_check { -SCORE_INFINITE } else { ctx.evaluate() };

    if !in_check {
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let phase_fraction = f64::from(ctx.board.phase()) / f64::from(TOTAL_PHASE);
        let delta_margin = 75.0 + 150.0 * phase_fraction;
        if f64::from(stand_pat) + delta_margin < f64::from(alpha) {
            return alpha;
        }
    }

    let candidates = if in_check { ctx.board.generate_legal_moves() } else { ctx.board.generate_legal_captures() };
    if candidates.is_empty() {
        return if in_check { -MATE_SCORE + ply as i32 } else { alpha };
    }

    let mut scored: Vec<(Move, i32)> = candidates
        .as_slice()
        .iter()
        .filter(|&&m| in_check || m.is_capture() || m.is_promotion())
        .map(|&m| (m, score_candidate(ctx, m)))
        .collect();
    scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));

    let mut best = stand_pat;
    let mut searched_any = false;

    for (m, _) in scored {
        if !in_check && !passes_capture_filter(ctx, m, stand_pat, alpha) {
            continue;
        }

        ctx.board.make_move(m);
        searched_any = true;
        let score = -quiesce(ctx, -beta, -alpha, ply + 1);
        ctx.board.unmake_move();

        if ctx.should_stop() {
            return best.max(alpha);
        }

        if score > best {
            best = score;
            if score > alpha {
                alpha = score;
            }
            if score >= beta {
                return score;
            }
        }
    }

    if in_check && !searched_any {
        return -MATE_SCORE + ply as i32;
    }

    best
}

fn score_candidate(ctx: &SearchContext, m: Move) -> i32 {
    let victim = if m.is_en_passant() { Some(Piece::Pawn) } else { ctx.board.piece_at(m.to()).map(|(_, p)| p) };
    let attacker = ctx.board.piece_at(m.from()).map(|(_, p)| p);
    let mut score = mvv_lva_score_by_values(victim, attacker);
    if m.promotion_piece() == Some(Piece::Queen) {
        score += 10_000;
    }
    score
}

/// Filters out losing captures from quiescence once the stand-pat score is
/// already close to alpha: queen promotions always search, underpromotions
/// need a clear SEE margin, and ordinary captures need to clear a margin
/// that shrinks as the position is further below alpha.
fn passes_capture_filter(ctx: &mut SearchContext, m: Move, stand_pat: i32, alpha: i32) -> bool {
    if m.promotion_piece() == Some(Piece::Queen) {
        return true;
    }
    if m.is_promotion() {
        return ctx.board.see_ge(m.from(), m.to(), -50);
    }
    if !m.is_capture() {
        return true;
    }
    let threshold = -25 - (stand_pat - alpha).max(0);
    ctx.board.see_ge(m.from(), m.to(), threshold)
}
