//! Leveled transposition cache.
//!
//! Values are stored at a search level: the remaining depth they were
//! computed with. Higher levels are more trustworthy and take priority on
//! lookup. A single capacity bounds the entries across all levels, and when
//! it is reached the least recently used entry of the lowest non-empty level
//! is evicted.

use std::hash::Hash;

use tracing::debug;

use super::lru::LruLevel;

/// Default number of entries held across all levels.
pub const DEFAULT_CAPACITY: usize = 2_000_000;

/// Bounded multi-level LRU cache.
pub struct LeveledCache<K, V> {
    levels: Vec<LruLevel<K, V>>,
    size: usize,
    capacity: usize,
}

impl<K: Copy + Eq + Hash, V: Copy> LeveledCache<K, V> {
    /// Create an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: `set` does nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            levels: vec![LruLevel::new()],
            size: 0,
            capacity,
        }
    }

    /// Find `key` at the highest level `>= min_level`.
    ///
    /// A hit is marked most recently used within its level.
    pub fn get(&mut self, key: &K, min_level: u32) -> Option<V> {
        let min = min_level as usize;
        if min >= self.levels.len() {
            return None;
        }
        self.levels[min..].iter_mut().rev().find_map(|level| level.get(key))
    }

    /// Store `value` for `key` at `level`.
    ///
    /// Storing a key that already exists at that level refreshes it in place.
    /// Otherwise, at capacity, one entry is evicted from the lowest level
    /// that has any.
    pub fn set(&mut self, key: K, value: V, level: u32) {
        if self.capacity == 0 {
            return;
        }
        let level = level as usize;
        if level >= self.levels.len() {
            self.levels.resize_with(level + 1, LruLevel::new);
        }

        if !self.levels[level].contains(&key) {
            if self.size >= self.capacity {
                self.evict_lowest();
            } else {
                self.size += 1;
            }
        }
        self.levels[level].insert(key, value);
    }

    fn evict_lowest(&mut self) {
        if let Some((depth, level)) = self
            .levels
            .iter_mut()
            .enumerate()
            .find(|(_, level)| !level.is_empty())
        {
            level.pop_lru();
            debug!(level = depth, "cache full, evicted oldest entry");
        }
    }

    /// Number of entries across all levels.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest level written so far.
    #[cfg(test)]
    fn max_level(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    /// Number of entries stored at `level`.
    #[cfg(test)]
    fn level_len(&self, level: u32) -> usize {
        self.levels.get(level as usize).map_or(0, LruLevel::len)
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.levels.truncate(1);
        self.levels[0].clear();
        self.size = 0;
    }
}
