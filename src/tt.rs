//! Transposition table: a 4-way bucketed hash table of search results keyed
//! by Zobrist hash, with depth-preferred and generation-aged replacement.

use std::mem;

use crate::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// Score is the exact minimax value.
    Exact,
    /// Score is at least this value (the search failed low against alpha).
    LowerBound,
    /// Score is at most this value (the search failed high against beta).
    UpperBound,
}

#[derive(Clone, Debug)]
pub(crate) struct TTEntry {
    hash: u64,
    depth: u32,
    score: i32,
    bound_type: BoundType,
    best_move: Option<Move>,
    generation: u16,
}

impl TTEntry {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

/// A hash table of search results, organized as `entries / 4` buckets of 4
/// slots each. Probing scans a bucket's slots for a matching full 64-bit
/// key; no indexing bits are reused as part of the stored key, so collisions
/// are detected exactly rather than probabilistically.
pub struct TranspositionTable {
    table: Vec<[Option<TTEntry>; 4]>,
    mask: usize,
    occupied: usize,
}

impl TranspositionTable {
    /// Build a table sized approximately `size_mb` megabytes, rounded down
    /// to a power-of-two bucket count.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<[Option<TTEntry>; 4]>();
        let mut num_buckets = (size_mb * 1024 * 1024) / entry_size;

        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        #[cfg(feature = "logging")]
        log::info!("transposition table sized to {size_mb} MB ({num_buckets} buckets)");

        TranspositionTable { table: vec![[None, None, None, None]; num_buckets], mask: num_buckets - 1, occupied: 0 }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Look up `hash`, returning the entry only if the full key matches.
    pub(crate) fn probe(&self, hash: u64) -> Option<&TTEntry> {
        let index = self.index(hash);
        let bucket = &self.table[index];
        bucket.iter().flatten().find(|entry| entry.hash == hash)
    }

    /// Store a result for `hash`. An existing entry for the same key is
    /// always overwritten. Otherwise an empty slot in the bucket is used if
    /// available; failing that, the slot with the lowest `depth*2 - age`
    /// priority is evicted, preferring to keep deep, recent entries.
    pub(crate) fn store(&mut self, hash: u64, depth: u32, score: i32, bound_type: BoundType, best_move: Option<Move>, generation: u16) {
        let index = self.index(hash);
        let bucket = &mut self.table[index];

        for slot in bucket.iter_mut() {
            if let Some(existing) = slot {
                if existing.hash == hash {
                    *slot = Some(TTEntry { hash, depth, score, bound_type, best_move, generation });
                    return;
                }
            }
        }

        for slot in bucket.iter_mut() {
            if slot.is_none() {
                *slot = Some(TTEntry { hash, depth, score, bound_type, best_move, generation });
                self.occupied += 1;
                return;
            }
        }

        let mut replace_idx = 0;
        let mut worst_priority = i32::MAX;
        for (idx, slot) in bucket.iter().enumerate() {
            if let Some(entry) = slot {
                let age = generation.wrapping_sub(entry.generation);
                let priority = entry.depth.saturating_mul(2) as i32 - i32::from(age);
                if idx == 0 || priority < worst_priority {
                    replace_idx = idx;
                    worst_priority = priority;
                }
            }
        }

        bucket[replace_idx] = Some(TTEntry { hash, depth, score, bound_type, best_move, generation });
    }

    /// Per-mille occupancy, used for the UCI `hashfull` field.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let total_slots = self.table.len().saturating_mul(4);
        if total_slots == 0 {
            return 0;
        }
        ((self.occupied as u64 * 1000) / total_slots as u64) as u32
    }

    /// Drop every stored entry without resizing the table.
    pub fn clear(&mut self) {
        for bucket in &mut self.table {
            *bucket = [None, None, None, None];
        }
        self.occupied = 0;
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_probe_round_trips() {
        let mut tt = TranspositionTable::new(1);
        tt.store(42, 5, 100, BoundType::Exact, None, 0);
        let entry = tt.probe(42).expect("entry present");
        assert_eq!(entry.depth(), 5);
        assert_eq!(entry.score(), 100);
        assert_eq!(entry.bound_type(), BoundType::Exact);
    }

    #[test]
    fn probe_miss_returns_none() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(7).is_none());
    }

    #[test]
    fn same_key_overwrites_in_place() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 3, 10, BoundType::LowerBound, None, 0);
        tt.store(1, 9, 20, BoundType::Exact, None, 0);
        let entry = tt.probe(1).unwrap();
        assert_eq!(entry.depth(), 9);
        assert_eq!(entry.score(), 20);
    }

    #[test]
    fn bucket_prefers_deeper_entries_on_overflow() {
        let mut tt = TranspositionTable::new(1);
        let mask = tt.mask as u64;
        let base = mask + 1;
        for i in 0..4 {
            tt.store(base * (i + 1), 1, 0, BoundType::Exact, None, 0);
        }
        tt.store(base * 5, 20, 0, BoundType::Exact, None, 0);
        assert!(tt.probe(base * 5).is_some());
    }

    #[test]
    fn clear_empties_the_table() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 1, 1, BoundType::Exact, None, 0);
        tt.clear();
        assert!(tt.probe(1).is_none());
        assert_eq!(tt.hashfull_per_mille(), 0);
    }

    #[test]
    fn hashfull_reflects_occupancy() {
        let mut tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
        tt.store(1, 1, 1, BoundType::Exact, None, 0);
        assert!(tt.hashfull_per_mille() > 0);
    }
}
