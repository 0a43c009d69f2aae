//! The recursive alpha-beta/PVS core: node setup, node-level pruning,
//! singular extension probing, the ordered move loop, and cutoff handling.
//!
//! Split into `alphabeta`, `search_moves`, `probe_tt_for_cutoff`, and
//! `handle_beta_cutoff` so each concern stays readable on its own.

use crate::ordering::{self, PriorMoveKey};
use crate::tt::BoundType;
use crate::types::Move;

use super::extensions;
use super::pruning;
use super::quiescence::quiesce;
use super::{SearchContext, MATE_SCORE, MATE_THRESHOLD, MAX_PLY};

impl SearchContext<'_> {
    /// Full-width alpha-beta search with PVS, returning a score from the
    /// side-to-move's perspective. `excluded_move`, when not null, is
    /// skipped in the move loop (used by the singular-extension probe).
    pub fn alphabeta(&mut self, depth: u32, mut alpha: i32, mut beta: i32, allow_null: bool, ply: usize, excluded_move: Move) -> i32 {
        let is_root = ply == 0;
        let is_pv = beta > alpha + 1;
        let excluded_active = !excluded_move.is_null();

        if !is_root && self.board.repetition_count() > 1 {
            return -self.evaluator.contempt();
        }
        if depth == 0 {
            return quiesce(self, alpha, beta, ply);
        }

        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply as u32 + 1);

        if self.should_stop() {
            return 0;
        }

        let in_check = self.board.is_in_check(self.board.side_to_move());

        if !is_root {
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        let (tt_move, tt_score, tt_bound, tt_cutoff) = self.probe_tt_for_cutoff(depth, alpha, beta, is_pv, excluded_active, in_check);
        if let Some(score) = tt_cutoff {
            self.tt_hits += 1;
            return score;
        }

        let moves = self.board.generate_legal_moves();
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { -self.evaluator.contempt() };
        }

        let eval = if in_check { -SCORE_INFINITE_LOCAL } else { self.evaluate() };
        if ply < MAX_PLY {
            self.static_eval[ply] = eval;
        }
        let improving = ply < 2 || eval > self.static_eval[ply - 2];

        if !is_pv && !in_check && !excluded_active {
            if let Some(score) = pruning::prune_before_move_loop(self, depth, beta, eval, ply, allow_null, improving) {
                return score;
            }
        }

        let mut singular_extension = 0u32;
        if !excluded_active && !is_root && depth >= self.params.singular_min_depth && !tt_move.is_null() && tt_score.abs() < MATE_THRESHOLD && matches!(tt_bound, BoundType::LowerBound | BoundType::Exact) {
            let margin = self.params.singular_margin_per_depth * depth as i32;
            let singular_beta = tt_score - margin;
            let singular_depth = (depth - 1) / 2;
            let probe_score = self.alphabeta(singular_depth, singular_beta - 1, singular_beta, false, ply, tt_move);
            if probe_score < singular_beta {
                singular_extension = 1;
            }
        }

        let search_depth = if tt_move.is_null() && depth >= self.params.internal_iterative_reduction_min_depth && !excluded_active { depth - 1 } else { depth };

        self.search_moves(ply, search_depth, alpha, beta, is_pv, in_check, improving, excluded_move, tt_move, singular_extension, &moves)
    }

    #[allow(clippy::too_many_arguments)]
    fn search_moves(
        &mut self,
        ply: usize,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        is_pv: bool,
        in_check: bool,
        improving: bool,
        excluded_move: Move,
        tt_move: Move,
        singular_extension: u32,
        moves: &crate::types::MoveList,
    ) -> i32 {
        let prev_move = if ply > 0 { self.previous_move[ply - 1] } else { Move::null() };
        let two_plies_back = if ply > 1 { self.previous_move[ply - 2] } else { Move::null() };
        let prev_key = prior_key(self, prev_move);
        let two_back_key = prior_key(self, two_plies_back);

        let mut ordered: Vec<Move> = moves.as_slice().to_vec();
        ordering::order_moves(self.ordering, self.board, &mut ordered, ply, Some(tt_move).filter(|m| !m.is_null()), prev_key, two_back_key);

        let legal_move_count = ordered.len();
        let mut best_score = -super::SCORE_INFINITE;
        let mut best_move = Move::null();
        let mut raised_alpha = false;
        let mut moves_tried = 0u32;
        let mut quiets_tried: Vec<Move> = Vec::with_capacity(legal_move_count);

        for (i, &m) in ordered.iter().enumerate() {
            if m == excluded_move || self.should_stop() {
                continue;
            }

            let is_quiet = m.is_quiet();
            let moving_piece = self.board.piece_at(m.from()).map(|(_, p)| p);

            self.board.make_move(m);
            let gives_check = self.board.is_in_check(self.board.side_to_move());
            if ply < MAX_PLY {
                self.previous_move[ply] = m;
                self.previous_piece[ply] = moving_piece;
            }
            moves_tried += 1;
            if is_quiet {
                quiets_tried.push(m);
            }

            if pruning::should_skip_late_quiet(self, depth, alpha, eval_or(self, ply), is_pv, in_check, is_quiet, gives_check, improving, m) {
                self.board.unmake_move();
                moves_tried -= 1;
                if is_quiet {
                    quiets_tried.pop();
                }
                continue;
            }

            let reduction =
                if i > 2 && is_quiet && !is_pv && !in_check && !gives_check { pruning::lmr_reduction(self, depth, legal_move_count, improving, i, moving_piece, m) } else { 0 };

            let extension = extensions::total_extension(self, ply, depth, gives_check, m == tt_move, singular_extension, m);
            let new_depth = if moves_tried == 1 { depth.saturating_add(extension) } else { (depth - 1).saturating_add(extension) };

            let mut score;
            if i > 0 {
                score = -self.alphabeta(new_depth.saturating_sub(reduction), -alpha - 1, -alpha, true, ply + 1, Move::null());
                if reduction > 0 && score > alpha {
                    score = -self.alphabeta(new_depth, -alpha - 1, -alpha, true, ply + 1, Move::null());
                }
                if score > alpha && score < beta {
                    score = -self.alphabeta(new_depth, -beta, -alpha, true, ply + 1, Move::null());
                }
            } else {
                score = -self.alphabeta(new_depth, -beta, -alpha, true, ply + 1, Move::null());
            }

            self.board.unmake_move();
            if self.should_stop() {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    if score >= beta {
                        self.handle_beta_cutoff(m, ply, depth, score, &quiets_tried, prev_key);
                        return score;
                    }
                    alpha = score;
                    raised_alpha = true;
                }
            }
        }

        if moves_tried == 0 {
            return if in_check { -MATE_SCORE + ply as i32 } else { -self.evaluator.contempt() };
        }

        self.store_tt(depth, best_score, raised_alpha, best_move);
        best_score
    }

    fn handle_beta_cutoff(&mut self, m: Move, ply: usize, depth: u32, score: i32, quiets_tried: &[Move], prev_key: PriorMoveKey) {
        if m.is_quiet() {
            self.ordering.record_killer(ply, m);
            if let Some((color, piece)) = self.last_mover_of(m) {
                self.ordering.record_history(color, piece, m.from(), m.to(), depth, 10);
                for &quiet in quiets_tried {
                    if quiet != m {
                        if let Some(qp) = self.board.piece_at(quiet.from()).map(|(_, p)| p) {
                            self.ordering.record_history(color, qp, quiet.from(), quiet.to(), depth, -10);
                        }
                    }
                }
            }
            self.ordering.record_counter_move(prev_key, m);
        }
        for &quiet in quiets_tried {
            self.ordering.record_butterfly_attempt(quiet.from(), quiet.to());
        }
        if !self.should_stop() {
            self.tt.store(self.board.hash(), depth, score, BoundType::LowerBound, Some(m), self.generation);
        }
    }

    fn store_tt(&mut self, depth: u32, score: i32, raised_alpha: bool, best_move: Move) {
        if self.should_stop() || best_move.is_null() {
            return;
        }
        let bound = if raised_alpha { BoundType::Exact } else { BoundType::UpperBound };
        self.tt.store(self.board.hash(), depth, score, bound, Some(best_move), self.generation);
    }

    #[allow(clippy::too_many_arguments)]
    fn probe_tt_for_cutoff(&mut self, depth: u32, alpha: i32, beta: i32, is_pv: bool, excluded_active: bool, in_check: bool) -> (Move, i32, BoundType, Option<i32>) {
        let _ = in_check;
        let Some(entry) = self.tt.probe(self.board.hash()) else {
            return (Move::null(), 0, BoundType::Exact, None);
        };
        let tt_move = entry.best_move().unwrap_or_else(Move::null);
        let tt_score = entry.score();
        let tt_bound = entry.bound_type();

        if !excluded_active && entry.depth() >= depth && self.board.repetition_count() <= 1 {
            let cutoff = match tt_bound {
                BoundType::Exact => {
                    if !is_pv || (tt_score > alpha && tt_score < beta) {
                        Some(tt_score)
                    } else {
                        None
                    }
                }
                BoundType::LowerBound if tt_score >= beta => Some(tt_score),
                BoundType::UpperBound if tt_score <= alpha => Some(tt_score),
                _ => None,
            };
            return (tt_move, tt_score, tt_bound, cutoff);
        }

        (tt_move, tt_score, tt_bound, None)
    }

    fn last_mover_of(&self, m: Move) -> Option<(crate::types::Color, crate::types::Piece)> {
        self.board.piece_at(m.from())
    }
}

fn prior_key(ctx: &SearchContext<'_>, mv: Move) -> PriorMoveKey {
    if mv.is_null() {
        return PriorMoveKey::none();
    }
    // `mv` was already made and unmade by the time we reach this point in
    // the caller's ply, so the piece now sitting on `to` is the one that
    // moved there.
    match ctx.board.piece_at(mv.to()) {
        Some((_, piece)) => PriorMoveKey::new(piece, mv.to()),
        None => PriorMoveKey::none(),
    }
}

fn eval_or(ctx: &SearchContext<'_>, ply: usize) -> i32 {
    if ply < MAX_PLY {
        ctx.static_eval[ply]
    } else {
        0
    }
}

const SCORE_INFINITE_LOCAL: i32 = super::SCORE_INFINITE;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SCORE_INFINITE;
    use crate::board::eval::{ClassicalEvaluator, PositionEvaluator};
    use crate::board::Board;
    use crate::ordering::OrderingContext;
    use crate::time::{TimeControl, TimeManager};
    use crate::tt::TranspositionTable;
    use std::sync::atomic::AtomicBool;

    fn run_fixed_depth(fen: &str, depth: u32) -> i32 {
        let mut board: Board = fen.parse().unwrap();
        let mut tt = TranspositionTable::new(1);
        let mut ordering = OrderingContext::new(super::MAX_PLY);
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
            initial_depth: depth,
            static_eval: [0; MAX_PLY],
            previous_move: [Move::null(); MAX_PLY],
            previous_piece: [None; MAX_PLY],
        };
        ctx.alphabeta(depth, -SCORE_INFINITE, SCORE_INFINITE, true, 0, Move::null())
    }

    #[test]
    fn finds_mate_in_one() {
        let score = run_fixed_depth("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 3);
        assert!(score.abs() >= MATE_THRESHOLD, "score: {score}");
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let score = run_fixed_depth("7k/8/6Q1/8/8/8/8/6K1 b - - 0 1", 1);
        assert_eq!(score, 0);
    }

    #[test]
    fn prefers_winning_material() {
        let score = run_fixed_depth("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", 4);
        assert!(score.abs() < MATE_THRESHOLD);
    }
}
