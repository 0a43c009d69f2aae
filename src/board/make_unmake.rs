//! Make/unmake move execution.
//!
//! Every mutation goes through [`Board::put_piece`]/[`Board::remove_piece`]
//! so the incremental material/PST accumulators stay correct automatically;
//! this module's job is just to drive those calls in the right order and
//! record enough state in an [`UndoRecord`] to reverse them exactly.

use crate::types::{Color, Move, Piece, Square};
use crate::zobrist;

use super::Board;

/// Snapshot of everything [`Board::make_move`] changes, needed to reverse
/// it in [`Board::unmake_move`]. Holds a copy of the static evaluation
/// accumulators rather than re-deriving them, so search can also cache a
/// full static eval here instead of recomputing it on every node.
#[derive(Clone, Debug)]
pub struct UndoRecord {
    mv: Move,
    captured: Option<Piece>,
    previous_en_passant: Option<Square>,
    previous_castling: crate::types::CastlingRights,
    previous_halfmove_clock: u32,
    previous_fullmove_number: u32,
    previous_hash: u64,
    previous_eval_mg: [i32; 2],
    previous_eval_eg: [i32; 2],
    previous_game_phase: [i32; 2],
    /// Full static evaluation of the position *before* this move, cached by
    /// search so repeated probes of the same node never recompute it.
    pub static_eval: Option<i32>,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct NullUndo {
    previous_en_passant: Option<Square>,
    previous_hash: u64,
}

fn en_passant_capture_square(to: Square, mover: Color) -> Square {
    if mover.is_white() {
        Square::new(to.rank() - 1, to.file())
    } else {
        Square::new(to.rank() + 1, to.file())
    }
}

fn castling_rook_squares(to: Square) -> (Square, Square) {
    if to.file() == 6 {
        (Square::new(to.rank(), 7), Square::new(to.rank(), 5))
    } else {
        (Square::new(to.rank(), 0), Square::new(to.rank(), 3))
    }
}

impl Board {
    pub fn make_move(&mut self, mv: Move) {
        let previous_hash = self.hash;
        let previous_en_passant = self.en_passant;
        let previous_castling = self.castling;
        let previous_halfmove_clock = self.halfmove_clock;
        let previous_fullmove_number = self.fullmove_number;
        let previous_eval_mg = self.eval_mg;
        let previous_eval_eg = self.eval_eg;
        let previous_game_phase = self.game_phase;

        let us = self.side_to_move;
        let them = us.opponent();
        let (_, moving_piece) = self.piece_at(mv.from()).expect("make_move: empty source square");

        let mut hash = self.hash;
        hash ^= zobrist::side_to_move_key();
        if let Some(ep) = previous_en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }

        let captured = if mv.is_en_passant() {
            let cap_sq = en_passant_capture_square(mv.to(), us);
            hash ^= zobrist::piece_key(them, Piece::Pawn, cap_sq);
            self.remove_piece(them, Piece::Pawn, cap_sq);
            Some(Piece::Pawn)
        } else if mv.is_castle() {
            None
        } else if let Some((_, captured_piece)) = self.piece_at(mv.to()) {
            hash ^= zobrist::piece_key(them, captured_piece, mv.to());
            self.remove_piece(them, captured_piece, mv.to());
            Some(captured_piece)
        } else {
            None
        };

        hash ^= zobrist::piece_key(us, moving_piece, mv.from());
        self.remove_piece(us, moving_piece, mv.from());

        if mv.is_castle() {
            hash ^= zobrist::piece_key(us, Piece::King, mv.to());
            self.put_piece(us, Piece::King, mv.to());
            let (rook_from, rook_to) = castling_rook_squares(mv.to());
            hash ^= zobrist::piece_key(us, Piece::Rook, rook_from);
            hash ^= zobrist::piece_key(us, Piece::Rook, rook_to);
            self.remove_piece(us, Piece::Rook, rook_from);
            self.put_piece(us, Piece::Rook, rook_to);
        } else {
            let placed = mv.promotion_piece().unwrap_or(moving_piece);
            hash ^= zobrist::piece_key(us, placed, mv.to());
            self.put_piece(us, placed, mv.to());
        }

        self.en_passant = None;
        if mv.is_double_pawn_push() {
            let ep_sq = Square::new((mv.from().rank() + mv.to().rank()) / 2, mv.from().file());
            self.en_passant = Some(ep_sq);
            hash ^= zobrist::en_passant_key(ep_sq.file());
        }

        if moving_piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        hash ^= self.update_castling_rights_hash(mv, moving_piece, us, captured);

        self.side_to_move = them;
        self.hash = hash;
        self.hash_history.push(hash);

        self.undo_stack.push(UndoRecord {
            mv,
            captured,
            previous_en_passant,
            previous_castling,
            previous_halfmove_clock,
            previous_fullmove_number,
            previous_hash,
            previous_eval_mg,
            previous_eval_eg,
            previous_game_phase,
            static_eval: None,
        });
    }

    fn update_castling_rights_hash(&mut self, mv: Move, moving_piece: Piece, us: Color, captured: Option<Piece>) -> u64 {
        let mut delta = 0u64;
        let before = self.castling;
        self.castling.clear_touched(mv.from());
        self.castling.clear_touched(mv.to());
        if moving_piece == Piece::King {
            self.castling.remove(us, true);
            self.castling.remove(us, false);
        }
        let _ = captured;
        for color in [Color::White, Color::Black] {
            for kingside in [true, false] {
                if before.has(color, kingside) != self.castling.has(color, kingside) {
                    delta ^= zobrist::castling_key(color, kingside);
                }
            }
        }
        delta
    }

    pub fn unmake_move(&mut self) {
        let undo = self.undo_stack.pop().expect("unmake_move: no move to undo");
        self.hash_history.pop();

        self.side_to_move = self.side_to_move.opponent();
        let us = self.side_to_move;
        let them = us.opponent();
        let mv = undo.mv;

        if mv.is_castle() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to());
            self.remove_piece(us, Piece::Rook, rook_to);
            self.put_piece(us, Piece::Rook, rook_from);
            self.remove_piece(us, Piece::King, mv.to());
            self.put_piece(us, Piece::King, mv.from());
        } else {
            let placed = mv.promotion_piece().unwrap_or_else(|| self.piece_at(mv.to()).expect("unmake_move: destination empty").1);
            self.remove_piece(us, placed, mv.to());
            let original = if mv.promotion_piece().is_some() { Piece::Pawn } else { placed };
            self.put_piece(us, original, mv.from());

            if let Some(captured_piece) = undo.captured {
                if mv.is_en_passant() {
                    let cap_sq = en_passant_capture_square(mv.to(), us);
                    self.put_piece(them, captured_piece, cap_sq);
                } else {
                    self.put_piece(them, captured_piece, mv.to());
                }
            }
        }

        self.en_passant = undo.previous_en_passant;
        self.castling = undo.previous_castling;
        self.halfmove_clock = undo.previous_halfmove_clock;
        self.fullmove_number = undo.previous_fullmove_number;
        self.hash = undo.previous_hash;
        self.eval_mg = undo.previous_eval_mg;
        self.eval_eg = undo.previous_eval_eg;
        self.game_phase = undo.previous_game_phase;
    }

    /// Make a null move: flip side to move without moving a piece, used by
    /// null-move pruning. Not legal if the side to move is in check; callers
    /// must check [`Board::is_in_check`] first.
    pub fn make_null_move(&mut self) {
        let previous_en_passant = self.en_passant;
        let previous_hash = self.hash;
        let mut hash = self.hash;
        hash ^= zobrist::side_to_move_key();
        if let Some(ep) = previous_en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = None;
        self.side_to_move = self.side_to_move.opponent();
        self.hash = hash;
        self.null_undo_stack.push(NullUndo { previous_en_passant, previous_hash });
    }

    pub fn unmake_null_move(&mut self) {
        let undo = self.null_undo_stack.pop().expect("unmake_null_move: no null move to undo");
        self.side_to_move = self.side_to_move.opponent();
        self.en_passant = undo.previous_en_passant;
        self.hash = undo.previous_hash;
    }

    /// Cache a static evaluation on the most recent [`UndoRecord`], so a
    /// re-probe of the same node (e.g. in `unmake_move`'s caller) can reuse
    /// it instead of recomputing.
    pub(crate) fn cache_static_eval(&mut self, eval: i32) {
        if let Some(top) = self.undo_stack.last_mut() {
            top.static_eval = Some(eval);
        }
    }
}
