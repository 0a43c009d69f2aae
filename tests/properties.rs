//! Property-based tests over the public board and evaluation surface.

use corvid_core::board::eval::{ClassicalEvaluator, Evaluator, PositionEvaluator};
use corvid_core::board::Board;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=20usize
}

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Mirrors a FEN across the board's horizontal midline: ranks reverse order,
/// piece case swaps, side to move flips, castling rights swap white/black,
/// and an en passant square's rank flips.
fn mirror_fen(fen: &str) -> String {
    let mut fields = fen.split_whitespace();
    let board = fields.next().unwrap();
    let stm = fields.next().unwrap();
    let castling = fields.next().unwrap();
    let ep = fields.next().unwrap();
    let halfmove = fields.next().unwrap();
    let fullmove = fields.next().unwrap();

    let mirrored_board: Vec<String> = board
        .split('/')
        .rev()
        .map(|rank| {
            rank.chars()
                .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c.to_ascii_uppercase() })
                .collect()
        })
        .collect();

    let mirrored_stm = if stm == "w" { "b" } else { "w" };

    let mirrored_castling: String = if castling == "-" {
        "-".to_owned()
    } else {
        castling
            .chars()
            .map(|c| match c {
                'K' => 'k',
                'Q' => 'q',
                'k' => 'K',
                'q' => 'Q',
                other => other,
            })
            .collect()
    };

    let mirrored_ep = if ep == "-" {
        "-".to_owned()
    } else {
        let mut chars = ep.chars();
        let file = chars.next().unwrap();
        let rank: u32 = chars.as_str().parse().unwrap();
        format!("{file}{}", 9 - rank)
    };

    format!("{} {} {} {} {} {}", mirrored_board.join("/"), mirrored_stm, mirrored_castling, mirrored_ep, halfmove, fullmove)
}

proptest! {
    /// P1: make_move followed by unmake_move restores hash and FEN exactly.
    #[test]
    fn prop_make_unmake_round_trips(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::starting_position();
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_hash = board.hash();
        let initial_fen = board.to_fen();

        let mut played = Vec::new();
        for _ in 0..num_moves {
            let moves = board.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            let mv = moves.as_slice()[idx];
            board.make_move(mv);
            played.push(mv);
        }

        for _ in played {
            board.unmake_move();
        }

        prop_assert_eq!(board.hash(), initial_hash);
        prop_assert_eq!(board.to_fen(), initial_fen);
    }

    /// P2 (external proxy): a hash is a pure function of position, so
    /// re-parsing a reached position's own FEN must reproduce its hash.
    #[test]
    fn prop_hash_is_a_function_of_fen(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::starting_position();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = board.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            board.make_move(moves.as_slice()[idx]);
        }

        let reparsed: Board = board.to_fen().parse().unwrap();
        prop_assert_eq!(board.hash(), reparsed.hash());
    }

    /// P3: per-color and per-piece occupancy bitboards partition the board
    /// exactly, with no square claimed by more than one piece or color.
    #[test]
    fn prop_occupancy_is_consistent(seed in seed_strategy(), num_moves in move_count_strategy()) {
        use corvid_core::types::{Color, Piece};

        let mut board = Board::starting_position();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = board.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            board.make_move(moves.as_slice()[idx]);
        }

        let white = board.occupied_by(Color::White);
        let black = board.occupied_by(Color::Black);
        prop_assert_eq!(white & black, Default::default());
        prop_assert_eq!(white | black, board.all_occupied());

        let pieces = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];
        for color in [Color::White, Color::Black] {
            let mut union = corvid_core::types::Bitboard::default();
            for piece in pieces {
                let bb = board.pieces_of(color, piece);
                prop_assert_eq!(bb & union, Default::default());
                union |= bb;
            }
            prop_assert_eq!(union, board.occupied_by(color));
        }
    }

    /// P6: the classical evaluator scores a position and its color-mirrored
    /// twin identically, since both are expressed from the side to move's
    /// perspective.
    #[test]
    fn prop_evaluator_is_symmetric_under_mirroring(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::starting_position();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = board.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            board.make_move(moves.as_slice()[idx]);
        }

        let fen = board.to_fen();
        let mirrored: Board = mirror_fen(&fen).parse().unwrap();

        let evaluator = Evaluator::Classical(ClassicalEvaluator::default());
        prop_assert_eq!(evaluator.evaluate(&board), evaluator.evaluate(&mirrored));
    }
}
