//! Move-generation correctness via perft node counts, cross-checked against
//! the standard reference positions (start position, Kiwipete).

use corvid_core::board::Board;

struct PerftCase {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const CASES: &[PerftCase] = &[
    PerftCase {
        name: "start position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281)],
    },
    PerftCase {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862), (4, 4_085_603)],
    },
];

#[test]
fn perft_matches_reference_node_counts() {
    for case in CASES {
        let mut board: Board = case.fen.parse().expect("valid fen");
        for &(depth, expected) in case.depths {
            let nodes = board.perft(depth);
            assert_eq!(nodes, expected, "{} at depth {depth}", case.name);
        }
    }
}

/// Start-position depth-5/6 and Kiwipete depth-5 counts, run to full depth.
/// These visit hundreds of millions of leaves and are excluded from the
/// default test run.
#[test]
#[ignore = "expensive: visits hundreds of millions of nodes"]
fn perft_matches_reference_node_counts_at_full_depth() {
    let mut start: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".parse().unwrap();
    assert_eq!(start.perft(5), 4_865_609);
    assert_eq!(start.perft(6), 119_060_324);

    let mut kiwipete: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".parse().unwrap();
    assert_eq!(kiwipete.perft(5), 193_690_690);
}
