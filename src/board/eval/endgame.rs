//! Endgame-specific knowledge: generic king centralization and rook
//! cutting off the enemy king once material has thinned out, plus
//! specialized handlers for the material signatures KPK, KBN vs K, and
//! KR vs KP that return 0 unless their exact signature matches.

use crate::types::{Color, Piece};

use super::super::Board;

const KING_CENTER_EG: i32 = 8;
const ROOK_CUT_OFF_EG: i32 = 15;
const KPK_ADVANCE_EG: i32 = 40;
const KPK_KING_SUPPORT_EG: i32 = 4;
const KPK_KING_CUTOFF_EG: i32 = 3;
const KBN_CORNER_EG: i32 = 20;
const KBN_KING_DISTANCE_EG: i32 = 10;
const KR_VS_KP_EG: i32 = 250;
const KR_VS_KP_CUTOFF_EG: i32 = 12;

/// Exact non-king piece counts for one side, used to gate the specialized
/// endgame handlers on their precise material signature.
struct Signature {
    pawns: u32,
    knights: u32,
    bishops: u32,
    rooks: u32,
    queens: u32,
}

impl Signature {
    fn of(board: &Board, color: Color) -> Self {
        Signature {
            pawns: board.pieces_of(color, Piece::Pawn).popcount(),
            knights: board.pieces_of(color, Piece::Knight).popcount(),
            bishops: board.pieces_of(color, Piece::Bishop).popcount(),
            rooks: board.pieces_of(color, Piece::Rook).popcount(),
            queens: board.pieces_of(color, Piece::Queen).popcount(),
        }
    }

    fn is_bare_king(&self) -> bool {
        self.pawns == 0 && self.knights == 0 && self.bishops == 0 && self.rooks == 0 && self.queens == 0
    }

    fn is_lone_pawn(&self) -> bool {
        self.pawns == 1 && self.knights == 0 && self.bishops == 0 && self.rooks == 0 && self.queens == 0
    }

    fn is_bishop_and_knight(&self) -> bool {
        self.pawns == 0 && self.knights == 1 && self.bishops == 1 && self.rooks == 0 && self.queens == 0
    }

    fn is_lone_rook(&self) -> bool {
        self.pawns == 0 && self.knights == 0 && self.bishops == 0 && self.rooks == 1 && self.queens == 0
    }
}

impl Board {
    /// Endgame pattern score, white minus black. Checks the three
    /// specialized material signatures first; each of those returns 0
    /// unless it matches exactly, falling back to the generic
    /// king-centralization/rook-cutoff terms otherwise.
    #[must_use]
    pub fn eval_endgame_patterns(&self) -> i32 {
        if let Some(score) = self.eval_signature_endgame() {
            return score;
        }
        self.eval_endgame_for_color(Color::White) - self.eval_endgame_for_color(Color::Black)
    }

    fn eval_signature_endgame(&self) -> Option<i32> {
        let white = Signature::of(self, Color::White);
        let black = Signature::of(self, Color::Black);

        if white.is_lone_pawn() && black.is_bare_king() {
            return Some(self.eval_kpk(Color::White));
        }
        if black.is_lone_pawn() && white.is_bare_king() {
            return Some(-self.eval_kpk(Color::Black));
        }
        if white.is_bishop_and_knight() && black.is_bare_king() {
            return Some(self.eval_kbn_vs_k(Color::White));
        }
        if black.is_bishop_and_knight() && white.is_bare_king() {
            return Some(-self.eval_kbn_vs_k(Color::Black));
        }
        if white.is_lone_rook() && black.is_lone_pawn() {
            return Some(self.eval_kr_vs_kp(Color::White));
        }
        if black.is_lone_rook() && white.is_lone_pawn() {
            return Some(-self.eval_kr_vs_kp(Color::Black));
        }
        None
    }

    /// King and pawn vs bare king: the pawn's distance to promotion plus
    /// how well its own king supports it and cuts off the defending king.
    fn eval_kpk(&self, color: Color) -> i32 {
        let pawn_sq = self.pieces_of(color, Piece::Pawn).lsb().expect("lone-pawn signature");
        let king_sq = self.pieces_of(color, Piece::King).lsb().expect("a king is always on the board");
        let enemy_king_sq = self.pieces_of(color.opponent(), Piece::King).lsb().expect("a king is always on the board");

        let promotion_rank = match color {
            Color::White => 7,
            Color::Black => 0,
        };
        let advance = (6 - pawn_sq.rank().abs_diff(promotion_rank) as i32).max(0) * KPK_ADVANCE_EG;

        let support = (14 - king_sq.file().abs_diff(pawn_sq.file()) as i32 - king_sq.rank().abs_diff(pawn_sq.rank()) as i32).max(0);
        let cutoff = enemy_king_sq.file().abs_diff(pawn_sq.file()) as i32 + enemy_king_sq.rank().abs_diff(promotion_rank) as i32;

        advance + support * KPK_KING_SUPPORT_EG + cutoff * KPK_KING_CUTOFF_EG
    }

    /// Bishop and knight vs bare king: the classic corner-drive mate, where
    /// the defending king must be herded into the corner matching the
    /// bishop's square color and the attacking king must close the distance.
    fn eval_kbn_vs_k(&self, color: Color) -> i32 {
        let bishop_sq = self.pieces_of(color, Piece::Bishop).lsb().expect("bishop-and-knight signature");
        let king_sq = self.pieces_of(color, Piece::King).lsb().expect("a king is always on the board");
        let enemy_king_sq = self.pieces_of(color.opponent(), Piece::King).lsb().expect("a king is always on the board");

        let light_squared = (bishop_sq.rank() + bishop_sq.file()) % 2 == 1;
        let (corner_a, corner_b) = if light_squared { ((7, 0), (0, 7)) } else { ((7, 7), (0, 0)) };
        let dist_a = enemy_king_sq.rank().abs_diff(corner_a.0) + enemy_king_sq.file().abs_diff(corner_a.1);
        let dist_b = enemy_king_sq.rank().abs_diff(corner_b.0) + enemy_king_sq.file().abs_diff(corner_b.1);
        let corner_distance = dist_a.min(dist_b) as i32;

        let king_distance = (king_sq.rank().abs_diff(enemy_king_sq.rank()) + king_sq.file().abs_diff(enemy_king_sq.file())) as i32;

        (14 - corner_distance) * KBN_CORNER_EG - king_distance * KBN_KING_DISTANCE_EG
    }

    /// Rook vs pawn: a flat material bonus for the rook side, reduced the
    /// closer the pawn is to promoting and the further the rook's king is
    /// from cutting the pawn off.
    fn eval_kr_vs_kp(&self, color: Color) -> i32 {
        let pawn_color = color.opponent();
        let pawn_sq = self.pieces_of(pawn_color, Piece::Pawn).lsb().expect("lone-pawn signature");
        let king_sq = self.pieces_of(color, Piece::King).lsb().expect("a king is always on the board");

        let promotion_rank = match pawn_color {
            Color::White => 7,
            Color::Black => 0,
        };
        let pawn_advance = (6 - pawn_sq.rank().abs_diff(promotion_rank) as i32).max(0);
        let king_cutoff = (14 - king_sq.file().abs_diff(pawn_sq.file()) as i32 - king_sq.rank().abs_diff(pawn_sq.rank()) as i32).max(0);

        KR_VS_KP_EG - pawn_advance * (KR_VS_KP_EG / 6) + king_cutoff * KR_VS_KP_CUTOFF_EG
    }

    fn eval_endgame_for_color(&self, color: Color) -> i32 {
        let mut eg = 0;

        if let Some(king_sq) = self.pieces_of(color, Piece::King).lsb() {
            let file_dist = king_sq.file().abs_diff(3).min(king_sq.file().abs_diff(4));
            let rank_dist = king_sq.rank().abs_diff(3).min(king_sq.rank().abs_diff(4));
            eg += (6 - (file_dist + rank_dist) as i32) * KING_CENTER_EG;
        }

        let rooks = self.pieces_of(color, Piece::Rook);
        if let Some(enemy_king) = self.pieces_of(color.opponent(), Piece::King).lsb() {
            for rook in rooks.iter() {
                match color {
                    Color::White if rook.rank() > enemy_king.rank() && rook.rank() < 7 => eg += ROOK_CUT_OFF_EG,
                    Color::Black if rook.rank() < enemy_king.rank() && rook.rank() > 0 => eg += ROOK_CUT_OFF_EG,
                    _ => {}
                }
            }
        }

        eg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    #[test]
    fn centralized_king_beats_corner_king() {
        let center = board("8/8/8/3K4/8/8/8/7k w - - 0 1");
        let corner = board("K7/8/8/8/8/8/8/7k w - - 0 1");
        assert!(center.eval_endgame_patterns() > corner.eval_endgame_patterns());
    }

    #[test]
    fn rook_cutting_off_enemy_king_is_rewarded() {
        let cutting = board("8/8/4R3/8/4k3/8/8/4K3 w - - 0 1");
        let not_cutting = board("8/8/8/8/4k3/8/4R3/4K3 w - - 0 1");
        assert!(cutting.eval_endgame_patterns() > not_cutting.eval_endgame_patterns());
    }

    #[test]
    fn kpk_signature_rewards_an_advanced_supported_pawn() {
        let advanced = board("8/8/4K3/4P3/8/8/8/4k3 w - - 0 1");
        let unadvanced = board("4k3/8/8/8/4P3/4K3/8/8 w - - 0 1");
        assert!(advanced.eval_endgame_patterns() > unadvanced.eval_endgame_patterns());
    }

    #[test]
    fn kpk_signature_does_not_fire_with_extra_material() {
        let board = board("8/8/4K3/4P3/8/8/8/3Nk3 w - - 0 1");
        // A black knight breaks the bare-king side of the KPK signature, so
        // this falls back to the generic king/rook terms instead.
        assert_eq!(board.eval_endgame_patterns(), board.eval_endgame_for_color(Color::White) - board.eval_endgame_for_color(Color::Black));
    }

    #[test]
    fn kbn_vs_k_rewards_driving_the_defender_toward_the_bishop_corner() {
        let near_corner = board("7k/8/8/8/8/2BNK3/8/8 w - - 0 1");
        let center = board("3k4/8/8/8/8/2BNK3/8/8 w - - 0 1");
        assert!(near_corner.eval_endgame_patterns() > center.eval_endgame_patterns());
    }

    #[test]
    fn kr_vs_kp_favors_the_rook_side() {
        let board = board("8/8/4K3/8/8/4k3/4p3/4R3 w - - 0 1");
        assert!(board.eval_endgame_patterns() > 0);
    }
}
