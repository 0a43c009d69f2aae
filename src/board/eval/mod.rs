//! Tapered static evaluation: material and piece-square tables are
//! maintained incrementally on [`Board`](super::Board) as pieces move; the
//! positional terms in this module are computed on demand and blended by
//! game phase.

mod endgame;
mod imbalances;
mod king_safety;
mod masks;
mod mobility;
mod nn;
mod passed_pawns;
mod pawn_structure;
mod rooks;
pub mod tables;
mod tropism;

pub use nn::NnueNetwork;

use super::Board;

/// Bonus for the side to move, offsetting the first-move advantage baked
/// into most positional evaluation.
const TEMPO_BONUS: i32 = 10;

/// A pluggable position evaluator, so search code can swap the classical
/// hand-written evaluator for a neural network without changing callers.
pub trait PositionEvaluator: Send + Sync {
    /// Score `board` in centipawns from the side-to-move's perspective:
    /// positive favors the side to move.
    fn evaluate(&self, board: &Board) -> i32;

    /// Centipawn penalty the search applies to a drawn position it detects
    /// directly (repetition, stalemate), from whichever side's perspective
    /// is asking. Zero by default; only the classical evaluator carries a
    /// configurable contempt.
    fn contempt(&self) -> i32 {
        0
    }
}

/// The evaluator backends available to the engine.
pub enum Evaluator {
    /// Hand-written material, piece-square-table, and positional terms.
    Classical(ClassicalEvaluator),
    /// NNUE-shaped network (see [`nn`] for the caveat that it ships untrained).
    Nn(NnueNetwork),
    /// Classical evaluation blended with the network, weighted by game phase.
    Hybrid(ClassicalEvaluator, NnueNetwork),
}

impl PositionEvaluator for Evaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        match self {
            Evaluator::Classical(eval) => eval.evaluate(board),
            Evaluator::Nn(net) => net.evaluate(board),
            Evaluator::Hybrid(eval, net) => {
                let classical = eval.evaluate(board);
                let nn = net.evaluate(board);
                let phase = board.phase();
                (classical * (tables::TOTAL_PHASE - phase) + nn * phase) / tables::TOTAL_PHASE
            }
        }
    }

    fn contempt(&self) -> i32 {
        match self {
            Evaluator::Classical(eval) => eval.contempt(),
            Evaluator::Nn(_) => 0,
            Evaluator::Hybrid(eval, _) => eval.contempt(),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::Classical(ClassicalEvaluator { contempt: 0 })
    }
}

/// The classical hand-tuned evaluator: tapered material/PST plus mobility,
/// pawn structure, king safety, passed pawns, rook activity, tropism, and
/// material imbalances.
pub struct ClassicalEvaluator {
    /// Centipawn bonus applied in the side to move's favor in drawish
    /// positions, discouraging the engine from steering into draws against
    /// weaker opposition. Zero is neutral.
    pub contempt: i32,
}

impl Default for ClassicalEvaluator {
    fn default() -> Self {
        ClassicalEvaluator { contempt: 0 }
    }
}

impl ClassicalEvaluator {
    #[must_use]
    pub fn new(contempt: i32) -> Self {
        ClassicalEvaluator { contempt }
    }
}

impl PositionEvaluator for ClassicalEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        board.evaluate_classical(self.contempt)
    }

    fn contempt(&self) -> i32 {
        self.contempt
    }
}

impl Board {
    /// Full classical static evaluation from the side-to-move's perspective.
    #[must_use]
    pub fn evaluate_classical(&self, contempt: i32) -> i32 {
        let (material_mg, material_eg) = self.tapered_material_pst();
        let (mob_mg, mob_eg) = self.eval_mobility();
        let (pawn_mg, pawn_eg) = self.eval_pawn_structure();
        let (passed_mg, passed_eg) = self.eval_passed_pawns();
        let (king_mg, king_eg) = self.eval_king_safety();
        let (shield_mg, shield_eg) = self.eval_king_shield();
        let (rook_mg, rook_eg) = self.eval_rooks();
        let (imbalance_mg, imbalance_eg) = self.eval_imbalances();
        let tropism_mg = self.eval_tropism();
        let endgame_eg = self.eval_endgame_patterns();

        let mg = material_mg + mob_mg + pawn_mg + passed_mg + king_mg + shield_mg + rook_mg + imbalance_mg + tropism_mg;
        let eg = material_eg + mob_eg + pawn_eg + passed_eg + king_eg + shield_eg + rook_eg + imbalance_eg + endgame_eg;

        let phase = self.phase();
        let tapered = (mg * phase + eg * (tables::TOTAL_PHASE - phase)) / tables::TOTAL_PHASE;

        let white_score = tapered + self.contempt_adjustment(contempt);
        let side_relative = if self.side_to_move().is_white() { white_score } else { -white_score };
        side_relative + TEMPO_BONUS
    }

    /// Contempt nudges a drawn-looking position (no pawns or very low
    /// material difference near the endgame) toward the side to move,
    /// discouraging draws against weaker opposition; it is a no-op at zero.
    fn contempt_adjustment(&self, contempt: i32) -> i32 {
        if contempt == 0 || self.is_insufficient_material() {
            return 0;
        }
        if self.side_to_move().is_white() {
            contempt
        } else {
            -contempt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_near_zero_plus_tempo() {
        let board = Board::starting_position();
        let score = board.evaluate_classical(0);
        assert!((score - TEMPO_BONUS).abs() < 30, "score: {score}");
    }

    #[test]
    fn material_advantage_is_reflected() {
        let board: Board = "4k3/8/8/8/8/8/8/QQQQK3 w - - 0 1".parse().unwrap();
        assert!(board.evaluate_classical(0) > 500);
    }

    #[test]
    fn evaluation_is_symmetric_under_color_flip() {
        let white_up: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let black_up: Board = "4k3/8/8/8/8/8/8/r3K3 b - - 0 1".parse().unwrap();
        assert_eq!(white_up.evaluate_classical(0), black_up.evaluate_classical(0));
    }

    #[test]
    fn evaluator_enum_dispatches_to_classical() {
        let evaluator = Evaluator::default();
        let board = Board::starting_position();
        assert_eq!(evaluator.evaluate(&board), board.evaluate_classical(0));
    }

    #[test]
    fn hybrid_with_zeroed_network_stays_close_to_classical_in_middlegame() {
        let evaluator = Evaluator::Hybrid(ClassicalEvaluator::default(), NnueNetwork::zeroed());
        let board = Board::starting_position();
        let classical = board.evaluate_classical(0);
        let hybrid = evaluator.evaluate(&board);
        assert!((classical - hybrid).abs() <= classical.abs() + 1);
    }
}
