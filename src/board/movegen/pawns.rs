use crate::types::{Move, MoveList, Square, PROMOTION_PIECES};

use super::super::Board;

impl Board {
    pub(crate) fn generate_pawn_moves(&self, from: Square, out: &mut MoveList) {
        let white = self.side_to_move.is_white();
        let start_rank = if white { 1 } else { 6 };
        let promotion_rank = if white { 7 } else { 0 };

        if let Some(one_forward) = from.forward(white) {
            if self.is_empty(one_forward) {
                if one_forward.rank() == promotion_rank {
                    for &piece in &PROMOTION_PIECES {
                        out.push(Move::promotion(from, one_forward, piece));
                    }
                } else {
                    out.push(Move::quiet(from, one_forward));
                    if from.rank() == start_rank {
                        if let Some(two_forward) = one_forward.forward(white) {
                            if self.is_empty(two_forward) {
                                out.push(Move::double_pawn_push(from, two_forward));
                            }
                        }
                    }
                }
            }
            self.generate_pawn_captures(from, one_forward, promotion_rank, out);
        }
    }

    pub(crate) fn generate_pawn_tactical_moves(&self, from: Square, out: &mut MoveList) {
        let white = self.side_to_move.is_white();
        let promotion_rank = if white { 7 } else { 0 };

        if let Some(one_forward) = from.forward(white) {
            if one_forward.rank() == promotion_rank && self.is_empty(one_forward) {
                for &piece in &PROMOTION_PIECES {
                    out.push(Move::promotion(from, one_forward, piece));
                }
            }
            self.generate_pawn_captures(from, one_forward, promotion_rank, out);
        }
    }

    fn generate_pawn_captures(&self, from: Square, one_forward: Square, promotion_rank: usize, out: &mut MoveList) {
        let us = self.side_to_move;
        let rank = one_forward.rank();
        for df in [-1i32, 1] {
            let file = one_forward.file() as i32 + df;
            if !(0..8).contains(&file) {
                continue;
            }
            let target = Square::new(rank, file as usize);
            if let Some((color, _)) = self.piece_at(target) {
                if color != us {
                    if rank == promotion_rank {
                        for &piece in &PROMOTION_PIECES {
                            out.push(Move::promotion_capture(from, target, piece));
                        }
                    } else {
                        out.push(Move::capture(from, target));
                    }
                }
            } else if Some(target) == self.en_passant {
                out.push(Move::en_passant(from, target));
            }
        }
    }
}
