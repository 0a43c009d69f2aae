use crate::types::{Move, MoveList, Square};

use super::super::attack_tables;
use super::super::Board;

impl Board {
    pub(crate) fn generate_knight_moves(&self, from: Square, out: &mut MoveList) {
        let own_occ = self.occupied[self.side_to_move.index()];
        let targets = attack_tables::knight_attacks(from) & !own_occ;
        for to in targets.iter() {
            self.push_leaper_move(from, to, out);
        }
    }

    pub(crate) fn push_leaper_move(&self, from: Square, to: Square, out: &mut MoveList) {
        if self.piece_at(to).is_some() {
            out.push(Move::capture(from, to));
        } else {
            out.push(Move::quiet(from, to));
        }
    }
}
