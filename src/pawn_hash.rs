//! Pawn hash table for caching pawn structure evaluation.
//!
//! Pawn structure only depends on pawn positions, so it can be cached using
//! a pawn-only Zobrist hash. This gives a significant speedup because pawn
//! structure evaluation runs on nearly every node but pawns move rarely.

use std::sync::atomic::{AtomicU64, Ordering};

/// Entry returned from a pawn hash table probe.
#[derive(Clone, Copy, Debug)]
pub struct PawnHashEntry {
    pub mg: i32,
    pub eg: i32,
}

#[inline]
fn pack_entry(mg: i32, eg: i32) -> u64 {
    (mg as u32 as u64) | ((eg as u32 as u64) << 32)
}

#[inline]
fn unpack_entry(data: u64) -> PawnHashEntry {
    let mg = data as u32 as i32;
    let eg = (data >> 32) as u32 as i32;
    PawnHashEntry { mg, eg }
}

/// A single slot using the XOR lockless-hashing technique: a racing
/// reader/writer pair can tear a read, but `key_xor ^ data` will then fail
/// to reproduce `hash`, so the probe is simply discarded rather than
/// returning garbage.
#[repr(C)]
struct PawnSlot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl PawnSlot {
    fn new() -> Self {
        PawnSlot { key_xor: AtomicU64::new(0), data: AtomicU64::new(0) }
    }

    fn store(&self, hash: u64, packed: u64) {
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    fn probe(&self, hash: u64) -> Option<PawnHashEntry> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        if data != 0 && key_xor ^ data == hash {
            Some(unpack_entry(data))
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.data.load(Ordering::Relaxed) == 0
    }
}

const BUCKET_SIZE: usize = 2;

#[repr(C)]
struct PawnBucket {
    slots: [PawnSlot; BUCKET_SIZE],
}

impl PawnBucket {
    fn new() -> Self {
        PawnBucket { slots: [PawnSlot::new(), PawnSlot::new()] }
    }
}

/// Thread-safe pawn hash table, shareable without locking across search
/// workers.
pub struct PawnHashTable {
    buckets: Vec<PawnBucket>,
    mask: usize,
}

impl PawnHashTable {
    /// Build a table sized in kilobytes (rounded down to a power-of-two
    /// bucket count).
    #[must_use]
    pub fn new(size_kb: usize) -> Self {
        let bucket_size = std::mem::size_of::<PawnBucket>();
        let mut num_buckets = (size_kb * 1024) / bucket_size;
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }
        let buckets = (0..num_buckets).map(|_| PawnBucket::new()).collect();
        PawnHashTable { buckets, mask: num_buckets - 1 }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    #[must_use]
    pub fn probe(&self, pawn_hash: u64) -> Option<PawnHashEntry> {
        let bucket = &self.buckets[self.index(pawn_hash)];
        bucket.slots.iter().find_map(|slot| slot.probe(pawn_hash))
    }

    pub fn store(&self, pawn_hash: u64, mg: i32, eg: i32) {
        let packed = pack_entry(mg, eg);
        let bucket = &self.buckets[self.index(pawn_hash)];
        for slot in &bucket.slots {
            if slot.is_empty() || slot.probe(pawn_hash).is_some() {
                slot.store(pawn_hash, packed);
                return;
            }
        }
        bucket.slots[0].store(pawn_hash, packed);
    }

    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.key_xor.store(0, Ordering::Relaxed);
                slot.data.store(0, Ordering::Relaxed);
            }
        }
    }
}

impl Default for PawnHashTable {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrips() {
        for (mg, eg) in [(100, 200), (-500, 300), (0, 0), (i32::MAX, i32::MIN)] {
            let packed = pack_entry(mg, eg);
            let unpacked = unpack_entry(packed);
            assert_eq!(unpacked.mg, mg);
            assert_eq!(unpacked.eg, eg);
        }
    }

    #[test]
    fn store_then_probe_returns_value() {
        let table = PawnHashTable::new(64);
        table.store(0x1234_5678_9ABC_DEF0, 150, -50);
        let entry = table.probe(0x1234_5678_9ABC_DEF0).expect("entry present");
        assert_eq!(entry.mg, 150);
        assert_eq!(entry.eg, -50);
    }

    #[test]
    fn distinct_hashes_do_not_collide() {
        let table = PawnHashTable::new(64);
        table.store(0x1234_5678_9ABC_DEF0, 100, 200);
        assert!(table.probe(0xFEDC_BA98_7654_3210).is_none());
    }

    #[test]
    fn store_overwrites_existing_entry() {
        let table = PawnHashTable::new(64);
        table.store(0x1234_5678_9ABC_DEF0, 100, 200);
        table.store(0x1234_5678_9ABC_DEF0, 300, 400);
        let entry = table.probe(0x1234_5678_9ABC_DEF0).expect("entry present");
        assert_eq!(entry.mg, 300);
        assert_eq!(entry.eg, 400);
    }

    #[test]
    fn clear_removes_all_entries() {
        let table = PawnHashTable::new(64);
        table.store(0x1234_5678_9ABC_DEF0, 100, 200);
        table.clear();
        assert!(table.probe(0x1234_5678_9ABC_DEF0).is_none());
    }
}
