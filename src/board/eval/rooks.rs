//! Rook activity: open/semi-open files, 7th rank, trapped and connected rooks.

use crate::types::{Color, Piece};

use super::masks::{FILES, RANK_7TH};
use super::super::{attack_tables, Board};
use super::tables::{
    CONNECTED_ROOKS_EG, CONNECTED_ROOKS_MG, ROOK_7TH_EG, ROOK_7TH_MG, ROOK_OPEN_FILE_EG, ROOK_OPEN_FILE_MG,
    ROOK_SEMI_OPEN_EG, ROOK_SEMI_OPEN_MG, TRAPPED_ROOK_MG,
};

impl Board {
    /// Rook activity score, `(middlegame, endgame)`, white minus black.
    #[must_use]
    pub fn eval_rooks(&self) -> (i32, i32) {
        let mut mg = 0;
        let mut eg = 0;

        for color in [Color::White, Color::Black] {
            let sign = if color.is_white() { 1 } else { -1 };
            let our_pawns = self.pieces_of(color, Piece::Pawn);
            let enemy_pawns = self.pieces_of(color.opponent(), Piece::Pawn);
            let rooks = self.pieces_of(color, Piece::Rook);

            for sq in rooks.iter() {
                let file_mask = FILES[sq.file()];
                let ours_on_file = file_mask.intersects(our_pawns);
                let theirs_on_file = file_mask.intersects(enemy_pawns);

                if !ours_on_file {
                    if theirs_on_file {
                        mg += sign * ROOK_SEMI_OPEN_MG;
                        eg += sign * ROOK_SEMI_OPEN_EG;
                    } else {
                        mg += sign * ROOK_OPEN_FILE_MG;
                        eg += sign * ROOK_OPEN_FILE_EG;
                    }
                }

                if RANK_7TH[color.index()].contains(sq) {
                    mg += sign * ROOK_7TH_MG;
                    eg += sign * ROOK_7TH_EG;
                }
            }

            if let Some(king_sq) = self.pieces_of(color, Piece::King).lsb() {
                let back_rank = if color.is_white() { 0 } else { 7 };
                if king_sq.rank() == back_rank {
                    for rook_sq in rooks.iter() {
                        if rook_sq.rank() != back_rank {
                            continue;
                        }
                        let king_file = king_sq.file();
                        let rook_file = rook_sq.file();
                        let kingside_trap = (king_file == 5 || king_file == 6) && (rook_file == 6 || rook_file == 7);
                        let queenside_trap = (king_file == 1 || king_file == 2) && (rook_file == 0 || rook_file == 1);
                        if kingside_trap || queenside_trap {
                            mg += sign * TRAPPED_ROOK_MG;
                        }
                    }
                }
            }

            if rooks.popcount() >= 2 {
                if let Some(r1) = rooks.lsb() {
                    let attacks = attack_tables::rook_attacks(r1, self.all_occupied());
                    if attacks.intersects(rooks) {
                        mg += sign * CONNECTED_ROOKS_MG;
                        eg += sign * CONNECTED_ROOKS_EG;
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
    fn rook_on_open_file_is_rewarded() {
        let b = board("8/8/8/8/8/8/8/R3K3 w - - 0 1");
        let (mg, _) = b.eval_rooks();
        assert!(mg > 0, "mg: {mg}");
    }

    #[test]
    fn rook_on_seventh_rank_is_rewarded() {
        let b = board("8/R7/8/8/8/8/8/4K3 w - - 0 1");
        let (mg, _) = b.eval_rooks();
        assert!(mg > 0, "mg: {mg}");
    }

    #[test]
    fn connected_rooks_on_open_rank_are_rewarded() {
        let connected = board("8/8/8/8/8/8/8/R3K2R w - - 0 1");
        let (mg, _) = connected.eval_rooks();
        assert!(mg > 0, "mg: {mg}");
    }

    #[test]
    fn symmetric_position_has_no_rook_score() {
        let b = Board::starting_position();
        let (mg, eg) = b.eval_rooks();
        assert_eq!(mg, 0);
        assert_eq!(eg, 0);
    }
}
