use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use ahash::AHashMap;
use nn_energy::Semiring;
use nn_structure::Complex;

use crate::block::Block;

/// Whether a cached block only ever populated its upper triangle (a
/// single canonical rotation was evaluated) or was promoted to treat the
/// full square as live (multiple rotations of the same complex share one
/// block, so reads can land below the diagonal too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    UpperTriangle,
    FullSquare,
}

struct Entry<R: Semiring> {
    block: Arc<Block<R>>,
    mode: StorageMode,
}

/// LRU cache of evaluated DP blocks, keyed by a complex's canonical
/// (lexicographically-smallest-rotation) form so that rotations of the
/// same complex share one evaluation.
pub struct BlockCache<R: Semiring> {
    capacity: usize,
    entries: RwLock<AHashMap<String, Entry<R>>>,
    order: Mutex<VecDeque<String>>,
}

impl<R: Semiring> BlockCache<R> {
    pub fn new(capacity: usize) -> Self {
        BlockCache {
            capacity,
            entries: RwLock::new(AHashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn key_for(complex: &Complex) -> String {
        complex.canonical_form()
            .strands()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("+")
    }

    pub fn get(&self, key: &str) -> Option<Arc<Block<R>>> {
        let hit = self.entries.read().unwrap().get(key).map(|e| e.block.clone());
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    pub fn mode_of(&self, key: &str) -> Option<StorageMode> {
        self.entries.read().unwrap().get(key).map(|e| e.mode)
    }

    pub fn insert(&self, key: String, block: Arc<Block<R>>, mode: StorageMode) {
        {
            let mut entries = self.entries.write().unwrap();
            entries.insert(key.clone(), Entry { block, mode });
        }
        let mut order = self.order.lock().unwrap();
        order.retain(|k| k != &key);
        order.push_back(key);
        while order.len() > self.capacity {
            if let Some(evict) = order.pop_front() {
                self.entries.write().unwrap().remove(&evict);
            }
        }
    }

    /// Mark an existing entry as promoted to full-square storage, e.g.
    /// because a second rotation of the same complex now reads cells
    /// below the diagonal of the original evaluation.
    pub fn promote(&self, key: &str) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.mode = StorageMode::FullSquare;
        }
    }

    fn touch(&self, key: &str) {
        let mut order = self.order.lock().unwrap();
        if let Some(pos) = order.iter().position(|k| k == key) {
            let k = order.remove(pos).unwrap();
            order.push_back(k);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
