use crate::types::{MoveList, Square};

use super::super::attack_tables;
use super::super::Board;

impl Board {
    pub(crate) fn generate_bishop_moves(&self, from: Square, out: &mut MoveList) {
        self.generate_slider_moves(from, attack_tables::bishop_attacks(from, self.all_occupied), out);
    }

    pub(crate) fn generate_rook_moves(&self, from: Square, out: &mut MoveList) {
        self.generate_slider_moves(from, attack_tables::rook_attacks(from, self.all_occupied), out);
    }

    pub(crate) fn generate_queen_moves(&self, from: Square, out: &mut MoveList) {
        self.generate_slider_moves(from, attack_tables::queen_attacks(from, self.all_occupied), out);
    }

    fn generate_slider_moves(&self, from: Square, raw_targets: crate::types::Bitboard, out: &mut MoveList) {
        let own_occ = self.occupied[self.side_to_move.index()];
        let targets = raw_targets & !own_occ;
        for to in targets.iter() {
            self.push_leaper_move(from, to, out);
        }
    }
}
