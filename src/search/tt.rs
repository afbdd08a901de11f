//! Transposition table: a fixed-size, direct-mapped, depth-preferred cache
//! keyed by the position's Zobrist hash.

use crate::moves::types::Move;

/// Mate scores are encoded as `±(MATE_SCORE - distance_from_root)`; any
/// score past this threshold is a forced mate rather than a material
/// evaluation, and must be ply-adjusted on TT store/probe.
pub const MATE_SCORE: i32 = 20000;
pub const MATE_THRESHOLD: i32 = 19000;

/// log2 of the table's entry count. Fixed rather than size-in-MB configurable,
/// per the single-threaded, single-process concurrency model.
const DEFAULT_CAPACITY_LOG2: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeType {
    Exact = 0,
    LowerBound = 1,
    UpperBound = 2,
}

#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    pub key: u64,
    pub best_move: Option<Move>,
    pub score: i16,
    pub depth: u8,
    pub bound: u8,
    pub generation: u8,
}

const EMPTY_ENTRY: TTEntry =
    TTEntry { key: 0, best_move: None, score: 0, depth: 0, bound: 0, generation: 0 };

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    pub generation: u8,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::with_capacity_log2(DEFAULT_CAPACITY_LOG2)
    }

    /// Test/tooling constructor for a smaller power-of-two table.
    pub fn with_capacity_log2(log2: u32) -> Self {
        let capacity = 1usize << log2;
        Self { entries: vec![EMPTY_ENTRY; capacity], generation: 0 }
    }

    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = EMPTY_ENTRY;
        }
        self.generation = 0;
    }

    pub fn save(&mut self, key: u64, mv: Option<Move>, score: i32, depth: u8, bound: u8) {
        let score_i16 = score.clamp(-32000, 32000) as i16;
        let index = (key as usize) & (self.entries.len() - 1);
        let entry = &mut self.entries[index];

        if entry.key == 0 || depth >= entry.depth || entry.generation != self.generation {
            let best_move = if mv.is_some() { mv } else { entry.best_move };
            *entry = TTEntry {
                key,
                best_move,
                score: score_i16,
                depth,
                bound,
                generation: self.generation,
            };
        }
    }

    pub fn probe(&self, key: u64) -> Option<(Option<Move>, i32, u8, u8)> {
        let index = (key as usize) & (self.entries.len() - 1);
        let entry = &self.entries[index];
        if entry.key == key {
            Some((entry.best_move, entry.score as i32, entry.depth, entry.bound))
        } else {
            None
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_probe_roundtrips() {
        let mut tt = TranspositionTable::with_capacity_log2(10);
        tt.save(12345, None, 57, 4, NodeType::Exact as u8);
        let (mv, score, depth, bound) = tt.probe(12345).unwrap();
        assert_eq!(mv, None);
        assert_eq!(score, 57);
        assert_eq!(depth, 4);
        assert_eq!(bound, NodeType::Exact as u8);
    }

    #[test]
    fn shallower_entry_does_not_overwrite_deeper() {
        let mut tt = TranspositionTable::with_capacity_log2(10);
        tt.save(1, None, 100, 8, NodeType::Exact as u8);
        tt.save(1, None, 1, 2, NodeType::Exact as u8);
        let (_, score, depth, _) = tt.probe(1).unwrap();
        assert_eq!(depth, 8);
        assert_eq!(score, 100);
    }

    #[test]
    fn new_generation_allows_shallower_overwrite() {
        let mut tt = TranspositionTable::with_capacity_log2(10);
        tt.save(1, None, 100, 8, NodeType::Exact as u8);
        tt.new_search();
        tt.save(1, None, 1, 2, NodeType::Exact as u8);
        let (_, _, depth, _) = tt.probe(1).unwrap();
        assert_eq!(depth, 2);
    }
}
