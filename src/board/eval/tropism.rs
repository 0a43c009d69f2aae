//! King tropism: bonus for queens and rooks standing close to the enemy king.

use crate::types::Piece;

use super::super::Board;
use super::tables::{QUEEN_TROPISM_MG, ROOK_TROPISM_MG};

impl Board {
    /// King tropism score, middlegame only, white minus black.
    #[must_use]
    pub fn eval_tropism(&self) -> i32 {
        let mut score = 0;

        for color in [crate::types::Color::White, crate::types::Color::Black] {
            let sign = if color.is_white() { 1 } else { -1 };
            let Some(enemy_king) = self.pieces_of(color.opponent(), Piece::King).lsb() else { continue };

            for sq in self.pieces_of(color, Piece::Queen).iter() {
                let distance = sq.rank().abs_diff(enemy_king.rank()) + sq.file().abs_diff(enemy_king.file());
                score += sign * ((14 - distance as i32) * QUEEN_TROPISM_MG) / 7;
            }
            for sq in self.pieces_of(color, Piece::Rook).iter() {
                let distance = sq.rank().abs_diff(enemy_king.rank()) + sq.file().abs_diff(enemy_king.file());
                score += sign * ((14 - distance as i32) * ROOK_TROPISM_MG) / 7;
            }
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    #[test]
    fn queen_near_enemy_king_scores_higher_than_far_queen() {
        let near = board("4k3/3Q4/8/8/8/8/8/4K3 w - - 0 1");
        let far = board("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        assert!(near.eval_tropism() > far.eval_tropism());
    }

    #[test]
    fn symmetric_position_has_zero_tropism() {
        assert_eq!(Board::starting_position().eval_tropism(), 0);
    }
}
