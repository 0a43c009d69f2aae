//! FEN parsing/serialization and UCI long-algebraic move parsing.

use std::str::FromStr;

use crate::types::{file_to_index, rank_to_index, Color, Move, Piece, Square};

use super::error::{FenError, MoveParseError};
use super::Board;

impl Board {
    /// Parse a board position from Forsyth-Edwards Notation.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::InvalidRank { rank: rank_idx });
            }
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let color = if c.is_uppercase() { Color::White } else { Color::Black };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles { rank: rank_idx, files: file + 1 });
                    }
                    board.put_piece(color, piece, Square::new(7 - rank_idx, file));
                    file += 1;
                }
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = board.pieces_of(color, Piece::King).popcount();
            if kings == 0 {
                return Err(FenError::MissingKing { color });
            }
            if kings > 1 {
                return Err(FenError::MultipleKings { color });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove { found: other.to_owned() }),
        };

        for c in parts[2].chars() {
            match c {
                'K' => board.castling.set(Color::White, true),
                'Q' => board.castling.set(Color::White, false),
                'k' => board.castling.set(Color::Black, true),
                'q' => board.castling.set(Color::Black, false),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        board.en_passant = if parts[3] == "-" {
            None
        } else {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() == 2 && ('a'..='h').contains(&chars[0]) && ('1'..='8').contains(&chars[1]) {
                Some(Square::new(rank_to_index(chars[1]), file_to_index(chars[0])))
            } else {
                return Err(FenError::InvalidEnPassant { found: parts[3].to_owned() });
            }
        };

        if parts.len() >= 5 {
            board.halfmove_clock = parts[4].parse().unwrap_or(0);
        }
        if parts.len() >= 6 {
            board.fullmove_number = parts[5].parse().unwrap_or(1);
        }

        board.hash = board.compute_hash_from_scratch();
        board.hash_history.push(board.hash);
        Ok(board)
    }

    /// Parse a FEN string, panicking on malformed input.
    ///
    /// # Panics
    /// Panics if `fen` is not valid FEN. Use [`Board::try_from_fen`] to
    /// handle untrusted input.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("invalid FEN string")
    }

    /// Serialize the current position to FEN.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                if let Some((color, piece)) = self.piece_at(sq) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = if self.side_to_move.is_white() { "w" } else { "b" };
        let mut castling = String::new();
        if self.castling.has(Color::White, true) {
            castling.push('K');
        }
        if self.castling.has(Color::White, false) {
            castling.push('Q');
        }
        if self.castling.has(Color::Black, true) {
            castling.push('k');
        }
        if self.castling.has(Color::Black, false) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self.en_passant.map_or_else(|| "-".to_owned(), |sq| sq.to_string());

        format!("{} {} {} {} {} {}", rows.join("/"), active, castling, ep, self.halfmove_clock, self.fullmove_number)
    }

    /// Parse a UCI long-algebraic move (`e2e4`, `e7e8q`) against the
    /// current legal move list.
    pub fn parse_uci_move(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }
        let from: Square = uci[0..2].parse().map_err(|_: crate::board::error::SquareError| MoveParseError::InvalidSquare { notation: uci.to_owned() })?;
        let to: Square = uci[2..4].parse().map_err(|_: crate::board::error::SquareError| MoveParseError::InvalidSquare { notation: uci.to_owned() })?;

        let promotion = if uci.len() == 5 {
            let c = uci.as_bytes()[4] as char;
            let piece = Piece::from_char(c).ok_or(MoveParseError::InvalidPromotion { char: c })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: c });
            }
            Some(piece)
        } else {
            None
        };

        let legal = self.generate_legal_moves();
        for mv in &legal {
            if mv.from() == from && mv.to() == to && mv.promotion_piece() == promotion {
                return Ok(*mv);
            }
        }
        Err(MoveParseError::IllegalMove { notation: uci.to_owned() })
    }

    /// Parse and immediately play a UCI move.
    pub fn make_uci_move(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_uci_move(uci)?;
        self.make_move(mv);
        Ok(mv)
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}
