//! Magic-bitboard sliding attack tables.
//!
//! Magic numbers are not hand-transcribed constants: they are found once,
//! at process start, by the same randomized-search technique a magic
//! generator tool would use (sparse random 64-bit candidates, validated by
//! checking for index collisions across every blocker subset of the
//! square's relevant-occupancy mask). Each table is additionally checked
//! against a naive ray-walking attack generator in the unit tests in
//! `mod.rs`.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;

use crate::types::{Bitboard, Square};

const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    table: Vec<Bitboard>,
}

impl MagicEntry {
    #[inline]
    fn lookup(&self, occ: Bitboard) -> Bitboard {
        let blockers = (occ & self.mask).0;
        let index = (blockers.wrapping_mul(self.magic) >> self.shift) as usize;
        self.table[index]
    }
}

struct MagicTables {
    rook: [MagicEntry; 64],
    bishop: [MagicEntry; 64],
}

/// Relevant-occupancy mask for a rook on `sq`: its rays, excluding the
/// board edge (edge squares never change whether a piece blocks the ray).
pub(super) fn rook_relevant_mask(sq: Square) -> Bitboard {
    ray_mask(sq, &ROOK_DIRS, true)
}

pub(super) fn bishop_relevant_mask(sq: Square) -> Bitboard {
    ray_mask(sq, &BISHOP_DIRS, true)
}

fn ray_mask(sq: Square, dirs: &[(i32, i32)], trim_edge: bool) -> Bitboard {
    let r = sq.rank() as i32;
    let f = sq.file() as i32;
    let mut mask = Bitboard::EMPTY;
    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        while (0..8).contains(&nr) && (0..8).contains(&nf) {
            let at_edge = trim_edge && (nr == 0 || nr == 7 || nf == 0 || nf == 7);
            let next_in_bounds = (0..8).contains(&(nr + dr)) && (0..8).contains(&(nf + df));
            if at_edge && !next_in_bounds {
                break;
            }
            mask.set(Square::new(nr as usize, nf as usize));
            nr += dr;
            nf += df;
        }
    }
    mask
}

fn ray_walk_attacks(sq: Square, occ: Bitboard, dirs: &[(i32, i32)]) -> Bitboard {
    let r = sq.rank() as i32;
    let f = sq.file() as i32;
    let mut attacks = Bitboard::EMPTY;
    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        while (0..8).contains(&nr) && (0..8).contains(&nf) {
            let target = Square::new(nr as usize, nf as usize);
            attacks.set(target);
            if occ.contains(target) {
                break;
            }
            nr += dr;
            nf += df;
        }
    }
    attacks
}

pub(super) fn naive_rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    ray_walk_attacks(sq, occ, &ROOK_DIRS)
}

pub(super) fn naive_bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    ray_walk_attacks(sq, occ, &BISHOP_DIRS)
}

/// Every occupancy subset of `mask`, via the standard Carry-Rippler trick.
pub(super) fn subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut result = Vec::with_capacity(1usize << mask.popcount());
    let mut subset: u64 = 0;
    loop {
        result.push(Bitboard(subset));
        subset = subset.wrapping_sub(mask.0) & mask.0;
        if subset == 0 {
            break;
        }
    }
    result
}

fn random_sparse_u64(rng: &mut StdRng) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

fn find_magic(mask: Bitboard, blockers: &[Bitboard], attacks: &[Bitboard], shift: u32, rng: &mut StdRng) -> (u64, Vec<Bitboard>) {
    loop {
        let magic = random_sparse_u64(rng);
        // Reject magics that spread the high bits too thin; a quick filter,
        // not required for correctness.
        if ((mask.0.wrapping_mul(magic)) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        let mut seen: HashMap<usize, Bitboard> = HashMap::new();
        let mut ok = true;
        for (&b, &a) in blockers.iter().zip(attacks.iter()) {
            let index = (b.0.wrapping_mul(magic) >> shift) as usize;
            match seen.get(&index) {
                Some(&existing) if existing != a => {
                    ok = false;
                    break;
                }
                _ => {
                    seen.insert(index, a);
                }
            }
        }
        if ok {
            let size = 1usize << (64 - shift);
            let mut table = vec![Bitboard::EMPTY; size];
            for (&b, &a) in blockers.iter().zip(attacks.iter()) {
                let index = (b.0.wrapping_mul(magic) >> shift) as usize;
                table[index] = a;
            }
            return (magic, table);
        }
    }
}

fn build_entry(sq: Square, dirs: &[(i32, i32)], rng: &mut StdRng) -> MagicEntry {
    let mask = ray_mask(sq, dirs, true);
    let bits = mask.popcount();
    let shift = 64 - bits;
    let blockers = subsets(mask);
    let attacks: Vec<Bitboard> = blockers.iter().map(|&occ| ray_walk_attacks(sq, occ, dirs)).collect();
    let (magic, table) = find_magic(mask, &blockers, &attacks, shift, rng);
    MagicEntry { mask, magic, shift, table }
}

static TABLES: Lazy<MagicTables> = Lazy::new(|| {
    // Fixed seed: magic numbers differ from run to run only in which valid
    // candidate is found first, never in correctness (every candidate is
    // validated against the full blocker set before being accepted).
    let mut rng = StdRng::seed_from_u64(0x5EED_C0FF_EE00_1234);
    let rook = std::array::from_fn(|i| build_entry(Square::from_index(i), &ROOK_DIRS, &mut rng));
    let bishop = std::array::from_fn(|i| build_entry(Square::from_index(i), &BISHOP_DIRS, &mut rng));
    MagicTables { rook, bishop }
});

pub(super) fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    TABLES.rook[sq.as_index()].lookup(occ)
}

pub(super) fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    TABLES.bishop[sq.as_index()].lookup(occ)
}
