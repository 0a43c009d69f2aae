//! Error types for board-level parsing and move operations.

use std::fmt;

/// FEN parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    InvalidEnPassant { found: String },
    InvalidRank { rank: usize },
    TooManyFiles { rank: usize, files: usize },
    MissingKing { color: crate::types::Color },
    MultipleKings { color: crate::types::Color },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => write!(f, "FEN must have at least 4 parts, found {found}"),
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in FEN"),
            FenError::InvalidCastling { char } => write!(f, "invalid castling character '{char}' in FEN"),
            FenError::InvalidSideToMove { found } => write!(f, "invalid side to move '{found}', expected 'w' or 'b'"),
            FenError::InvalidEnPassant { found } => write!(f, "invalid en passant square '{found}'"),
            FenError::InvalidRank { rank } => write!(f, "invalid rank index {rank} in FEN"),
            FenError::TooManyFiles { rank, files } => write!(f, "too many files ({files}) in rank {rank}"),
            FenError::MissingKing { color } => write!(f, "FEN has no {color} king"),
            FenError::MultipleKings { color } => write!(f, "FEN has more than one {color} king"),
        }
    }
}

impl std::error::Error for FenError {}

/// Long-algebraic move parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    InvalidLength { len: usize },
    InvalidSquare { notation: String },
    InvalidPromotion { char: char },
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => write!(f, "move must be 4-5 characters, found {len}"),
            MoveParseError::InvalidSquare { notation } => write!(f, "invalid square notation in '{notation}'"),
            MoveParseError::InvalidPromotion { char } => write!(f, "invalid promotion piece '{char}'"),
            MoveParseError::IllegalMove { notation } => write!(f, "illegal move '{notation}'"),
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Algebraic-square parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    RankOutOfBounds { rank: usize },
    FileOutOfBounds { file: usize },
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => write!(f, "rank {rank} out of bounds (must be 0-7)"),
            SquareError::FileOutOfBounds { file } => write!(f, "file {file} out of bounds (must be 0-7)"),
            SquareError::InvalidNotation { notation } => write!(f, "invalid square notation '{notation}'"),
        }
    }
}

impl std::error::Error for SquareError {}

/// SAN (Standard Algebraic Notation) parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    Empty,
    InvalidPiece { char: char },
    InvalidSquare { notation: String },
    AmbiguousMove { san: String },
    NoMatchingMove { san: String },
    InvalidPromotion { char: char },
    InvalidCastling { notation: String },
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty SAN string"),
            SanError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in SAN"),
            SanError::InvalidSquare { notation } => write!(f, "invalid square in SAN '{notation}'"),
            SanError::AmbiguousMove { san } => write!(f, "ambiguous move '{san}'"),
            SanError::NoMatchingMove { san } => write!(f, "no legal move matches '{san}'"),
            SanError::InvalidPromotion { char } => write!(f, "invalid promotion piece '{char}'"),
            SanError::InvalidCastling { notation } => write!(f, "invalid castling notation '{notation}'"),
        }
    }
}

impl std::error::Error for SanError {}
