//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes for the
//! transposition table and repetition detection, plus a pawn-only hash
//! used by the pawn structure cache.

use once_cell::sync::Lazy;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::types::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece][color][square]`
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move_key: u64,
    /// `castling_keys[color][kingside=0/queenside=1]`
    castling_keys: [[u64; 2]; 2],
    /// Indexed by en passant target file.
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0xC0DE_1234_5678_9ABC);
        let mut piece_keys = [[[0u64; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move_key = rng.gen();
        let mut castling_keys = [[0u64; 2]; 2];
        for color in &mut castling_keys {
            for key in color.iter_mut() {
                *key = rng.gen();
            }
        }
        let mut en_passant_keys = [0u64; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys { piece_keys, black_to_move_key, castling_keys, en_passant_keys }
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[piece.index()][color.index()][sq.as_index()]
}

#[inline]
pub(crate) fn side_to_move_key() -> u64 {
    ZOBRIST.black_to_move_key
}

#[inline]
pub(crate) fn castling_key(color: Color, kingside: bool) -> u64 {
    ZOBRIST.castling_keys[color.index()][usize::from(!kingside)]
}

#[inline]
pub(crate) fn en_passant_key(file: usize) -> u64 {
    ZOBRIST.en_passant_keys[file]
}

/// Pawn-only hash terms, used by the pawn structure cache in
/// [`crate::pawn_hash`]. Sharing the same piece keys as the full position
/// hash keeps them trivially consistent; only pawns ever contribute.
#[inline]
pub(crate) fn pawn_key(color: Color, sq: Square) -> u64 {
    piece_key(color, Piece::Pawn, sq)
}
