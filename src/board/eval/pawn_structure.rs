//! Pawn structure: doubled, isolated, backward, phalanx and defended pawns.

use crate::types::{Bitboard, Color, Piece};

use super::masks::{fill_forward, relative_rank, ADJACENT_FILES, PAWN_SUPPORT_MASK};
use super::super::Board;
use super::tables::{
    BACKWARD_OPEN_EG, BACKWARD_OPEN_MG, BACKWARD_PAWN_EG, BACKWARD_PAWN_MG, DEFENDED_BONUS_EG, DEFENDED_BONUS_MG,
    DOUBLED_PAWN_EG, DOUBLED_PAWN_MG, ISOLATED_OPEN_EG, ISOLATED_OPEN_MG, ISOLATED_PAWN_EG, ISOLATED_PAWN_MG,
    PHALANX_BONUS_EG, PHALANX_BONUS_MG,
};

impl Board {
    /// Pawn structure score, `(middlegame, endgame)`, white minus black.
    #[must_use]
    pub fn eval_pawn_structure(&self) -> (i32, i32) {
        let mut mg = 0;
        let mut eg = 0;

        for color in [Color::White, Color::Black] {
            let sign = if color.is_white() { 1 } else { -1 };
            let own_pawns = self.pieces_of(color, Piece::Pawn);
            let enemy_pawns = self.pieces_of(color.opponent(), Piece::Pawn);

            for sq in own_pawns.iter() {
                let file = sq.file();
                let rank = sq.rank();
                let rel_rank = relative_rank(sq, color);

                let ahead = fill_forward(Bitboard::from_square(sq), color);
                if ahead.intersects(own_pawns) {
                    mg += sign * DOUBLED_PAWN_MG;
                    eg += sign * DOUBLED_PAWN_EG;
                }

                let support_mask = PAWN_SUPPORT_MASK[color.index()][sq.as_index()];
                let is_supported = support_mask.intersects(own_pawns);

                if is_supported {
                    let adjacent = ADJACENT_FILES[file];
                    let same_rank = Bitboard::rank_mask(rank);
                    let phalanx = (adjacent & same_rank).intersects(own_pawns);
                    if phalanx {
                        mg += sign * PHALANX_BONUS_MG[rel_rank];
                        eg += sign * PHALANX_BONUS_EG[rel_rank];
                    } else {
                        mg += sign * DEFENDED_BONUS_MG[rel_rank];
                        eg += sign * DEFENDED_BONUS_EG[rel_rank];
                    }
                } else {
                    let adjacent = ADJACENT_FILES[file];
                    let has_adjacent_pawn = adjacent.intersects(own_pawns);
                    let is_open = !ahead.intersects(enemy_pawns);

                    if has_adjacent_pawn {
                        let behind = fill_forward(Bitboard::from_square(sq), color.opponent());
                        let support_behind = (adjacent & behind).intersects(own_pawns);
                        if !support_behind {
                            mg += sign * BACKWARD_PAWN_MG;
                            eg += sign * BACKWARD_PAWN_EG;
                            if is_open {
                                mg += sign * BACKWARD_OPEN_MG;
                                eg += sign * BACKWARD_OPEN_EG;
                            }
                        }
                    } else {
                        mg += sign * ISOLATED_PAWN_MG;
                        eg += sign * ISOLATED_PAWN_EG;
                        if is_open {
                            mg += sign * ISOLATED_OPEN_MG;
                            eg += sign * ISOLATED_OPEN_EG;
                        }
                    }
                }
            }
        }

        (mg, eg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    #[test]
    fn doubled_pawns_are_penalized() {
        let b = board("8/8/8/8/4P3/8/4P3/8 w - - 0 1");
        let (mg, _) = b.eval_pawn_structure();
        assert!(mg < 0, "mg: {mg}");
    }

    #[test]
    fn isolated_pawn_is_penalized() {
        let b = board("8/8/8/8/8/8/4P3/8 w - - 0 1");
        let (mg, eg) = b.eval_pawn_structure();
        assert!(mg < 0 || eg < 0, "mg: {mg} eg: {eg}");
    }

    #[test]
    fn phalanx_pawns_are_rewarded() {
        let b = board("8/8/8/8/3PP3/8/8/8 w - - 0 1");
        let (mg, _) = b.eval_pawn_structure();
        assert!(mg > 0, "mg: {mg}");
    }

    #[test]
    fn defended_pawn_is_rewarded() {
        let b = board("8/8/8/8/4P3/3P4/8/8 w - - 0 1");
        let (mg, _) = b.eval_pawn_structure();
        assert!(mg > 0, "mg: {mg}");
    }

    #[test]
    fn symmetric_structure_is_balanced() {
        let b = Board::starting_position();
        let (mg, eg) = b.eval_pawn_structure();
        assert_eq!(mg, 0);
        assert_eq!(eg, 0);
    }
}
