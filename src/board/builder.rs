//! Fluent builder for constructing positions without writing a FEN string.
//!
//! # Example
//! ```
//! use corvid_core::board::builder::BoardBuilder;
//! use corvid_core::types::{Color, Piece, Square};
//!
//! let board = BoardBuilder::new()
//!     .piece(Square::new(0, 4), Color::White, Piece::King)
//!     .piece(Square::new(7, 4), Color::Black, Piece::King)
//!     .piece(Square::new(1, 0), Color::White, Piece::Pawn)
//!     .side_to_move(Color::White)
//!     .build();
//! ```

use crate::types::{CastlingRights, Color, Piece, Square};

use super::Board;

/// A fluent builder for constructing [`Board`] positions piece by piece.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    pieces: Vec<(Square, Color, Piece)>,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardBuilder {
    #[must_use]
    pub fn new() -> Self {
        BoardBuilder {
            pieces: Vec::new(),
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    #[must_use]
    pub fn starting_position() -> Self {
        let mut builder = Self::new();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            builder.pieces.push((Square::new(0, file), Color::White, piece));
            builder.pieces.push((Square::new(7, file), Color::Black, piece));
            builder.pieces.push((Square::new(1, file), Color::White, Piece::Pawn));
            builder.pieces.push((Square::new(6, file), Color::Black, Piece::Pawn));
        }
        builder.castling = CastlingRights::all();
        builder
    }

    #[must_use]
    pub fn piece(mut self, square: Square, color: Color, piece: Piece) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self.pieces.push((square, color, piece));
        self
    }

    #[must_use]
    pub fn clear(mut self, square: Square) -> Self {
        self.pieces.retain(|(sq, _, _)| *sq != square);
        self
    }

    #[must_use]
    pub const fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    #[must_use]
    pub const fn castling(mut self, rights: CastlingRights) -> Self {
        self.castling = rights;
        self
    }

    #[must_use]
    pub fn castle_kingside(mut self, color: Color) -> Self {
        self.castling.set(color, true);
        self
    }

    #[must_use]
    pub fn castle_queenside(mut self, color: Color) -> Self {
        self.castling.set(color, false);
        self
    }

    #[must_use]
    pub const fn all_castling_rights(mut self) -> Self {
        self.castling = CastlingRights::all();
        self
    }

    #[must_use]
    pub const fn no_castling_rights(mut self) -> Self {
        self.castling = CastlingRights::none();
        self
    }

    #[must_use]
    pub const fn en_passant(mut self, target: Square) -> Self {
        self.en_passant = Some(target);
        self
    }

    #[must_use]
    pub const fn clear_en_passant(mut self) -> Self {
        self.en_passant = None;
        self
    }

    #[must_use]
    pub const fn halfmove_clock(mut self, clock: u32) -> Self {
        self.halfmove_clock = clock;
        self
    }

    #[must_use]
    pub const fn fullmove_number(mut self, number: u32) -> Self {
        self.fullmove_number = number;
        self
    }

    /// Build the final position. Does not validate king counts; callers
    /// constructing arbitrary test positions are responsible for that.
    #[must_use]
    pub fn build(self) -> Board {
        let mut board = Board::empty();
        for (square, color, piece) in self.pieces {
            board.put_piece(color, piece, square);
        }
        board.side_to_move = self.side_to_move;
        board.castling = self.castling;
        board.en_passant = self.en_passant;
        board.halfmove_clock = self.halfmove_clock;
        board.fullmove_number = self.fullmove_number;
        board.hash = board.compute_hash_from_scratch();
        board.hash_history.push(board.hash);
        board
    }
}
