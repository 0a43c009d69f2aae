//! Precomputed attack tables: knight/king/pawn leapers and magic-bitboard
//! sliders for bishops and rooks (queen = bishop | rook).

mod magic;

use once_cell::sync::Lazy;

use crate::types::{Bitboard, Color, Square};

static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut table = [Bitboard::EMPTY; 64];
    const DELTAS: [(i32, i32); 8] = [(2, 1), (1, 2), (-1, 2), (-2, 1), (-2, -1), (-1, -2), (1, -2), (2, -1)];
    for sq in 0..64 {
        table[sq] = leaper_attacks(sq, &DELTAS);
    }
    table
});

static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut table = [Bitboard::EMPTY; 64];
    const DELTAS: [(i32, i32); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];
    for sq in 0..64 {
        table[sq] = leaper_attacks(sq, &DELTAS);
    }
    table
});

static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for sq in 0..64 {
        table[Color::White.index()][sq] = leaper_attacks(sq, &[(1, -1), (1, 1)]);
        table[Color::Black.index()][sq] = leaper_attacks(sq, &[(-1, -1), (-1, 1)]);
    }
    table
});

fn leaper_attacks(sq: usize, deltas: &[(i32, i32)]) -> Bitboard {
    let r = (sq / 8) as i32;
    let f = (sq % 8) as i32;
    let mut bb = Bitboard::EMPTY;
    for &(dr, df) in deltas {
        let (nr, nf) = (r + dr, f + df);
        if (0..8).contains(&nr) && (0..8).contains(&nf) {
            bb.set(Square::new(nr as usize, nf as usize));
        }
    }
    bb
}

/// Knight attack set from `sq`.
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.as_index()]
}

/// King attack set from `sq`.
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.as_index()]
}

/// Pawn capture targets for a pawn of `color` standing on `sq`.
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.as_index()]
}

/// Bishop attacks given the current total occupancy, via magic-bitboard lookup.
#[must_use]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    magic::bishop_attacks(sq, occ)
}

/// Rook attacks given the current total occupancy, via magic-bitboard lookup.
#[must_use]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    magic::rook_attacks(sq, occ)
}

/// Queen attacks: the union of the bishop and rook attack sets.
#[must_use]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    bishop_attacks(sq, occ) | rook_attacks(sq, occ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_in_corner_has_two_targets() {
        assert_eq!(knight_attacks(Square::A1).popcount(), 2);
    }

    #[test]
    fn king_in_center_has_eight_targets() {
        assert_eq!(king_attacks(Square::new(3, 3)).popcount(), 8);
    }

    #[test]
    fn white_pawn_attacks_diagonally_forward() {
        let attacks = pawn_attacks(Color::White, Square::new(1, 4));
        assert!(attacks.contains(Square::new(2, 3)));
        assert!(attacks.contains(Square::new(2, 5)));
        assert_eq!(attacks.popcount(), 2);
    }

    #[test]
    fn rook_attacks_stop_at_first_blocker() {
        let occ = Bitboard::from_square(Square::new(0, 3));
        let attacks = rook_attacks(Square::new(0, 0), occ);
        assert!(attacks.contains(Square::new(0, 3)));
        assert!(!attacks.contains(Square::new(0, 4)));
    }

    #[test]
    fn bishop_attacks_match_naive_ray_walk_for_all_blockers() {
        for sq in 0..64 {
            let square = Square::from_index(sq);
            let mask = magic::bishop_relevant_mask(square);
            for occ in magic::subsets(mask) {
                let expected = magic::naive_bishop_attacks(square, occ);
                assert_eq!(bishop_attacks(square, occ), expected, "sq={sq} occ={occ:?}");
            }
        }
    }

    #[test]
    fn rook_attacks_match_naive_ray_walk_for_all_blockers() {
        for sq in 0..64 {
            let square = Square::from_index(sq);
            let mask = magic::rook_relevant_mask(square);
            for occ in magic::subsets(mask) {
                let expected = magic::naive_rook_attacks(square, occ);
                assert_eq!(rook_attacks(square, occ), expected, "sq={sq} occ={occ:?}");
            }
        }
    }
}
