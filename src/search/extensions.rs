//! Search extensions: additions to a move's remaining depth for checks,
//! recaptures on the tt move, and pawn pushes onto the seventh rank, folded
//! together with the singular-extension result the caller already probed.
//!
//! Collapsed into one combinator so the move loop has a single call site.

use crate::types::{Move, Piece};

use super::{SearchContext, MAX_PLY};

const MAX_EXTENSION: u32 = 2;

/// Total extension, in plies, for the move just made: the singular-extension
/// result already computed by the caller, plus check, tt-move-recapture, and
/// advanced-pawn-push extensions, capped at [`MAX_EXTENSION`].
pub(super) fn total_extension(ctx: &SearchContext, ply: usize, depth: u32, gives_check: bool, is_tt_move: bool, singular_extension: u32, m: Move) -> u32 {
    let mut extension = singular_extension.min(1);

    if gives_check {
        extension += 1;
    }
    if is_tt_move && depth >= 6 && is_recapture_on_tt_square(ctx, ply, m) {
        extension += 1;
    }
    if is_advanced_pawn_push(ctx, ply, m) {
        extension += 1;
    }

    extension.min(MAX_EXTENSION)
}

fn is_recapture_on_tt_square(ctx: &SearchContext, ply: usize, m: Move) -> bool {
    if ply == 0 || ply > MAX_PLY {
        return false;
    }
    let prev = ctx.previous_move[ply - 1];
    !prev.is_null() && prev.is_capture() && m.is_capture() && prev.to() == m.to()
}

fn is_advanced_pawn_push(ctx: &SearchContext, ply: usize, m: Move) -> bool {
    if ply >= MAX_PLY || m.is_capture() || ctx.previous_piece[ply] != Some(Piece::Pawn) {
        return false;
    }
    matches!(m.to().rank(), 1 | 6)
}
