//! Bounded memoization of legal-move queries.
//!
//! Keys combine the full position notation (deploy segment included) with
//! the filter parameters, so any state change produces a different key and
//! a stale hit is impossible even without invalidation. Invalidation still
//! runs on every committed mutation to keep the cache from serving an
//! unbounded mix of dead positions; the make/unmake probing inside the
//! legality filter never touches it.

use crate::move_generation::moves::Move;

#[derive(Debug, Clone)]
pub struct MoveCache {
    capacity: usize,
    entries: Vec<(String, Vec<Move>)>,
}

impl MoveCache {
    pub fn new(capacity: usize) -> Self {
        MoveCache {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<Move>> {
        self.entries
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, moves)| moves.clone())
    }

    /// Inserts a result, evicting the oldest entry once full.
    pub fn insert(&mut self, key: String, moves: Vec<Move>) {
        if self.entries.iter().any(|(stored, _)| *stored == key) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((key, moves));
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut cache = MoveCache::new(2);
        cache.insert("a".to_string(), Vec::new());
        cache.insert("b".to_string(), Vec::new());
        cache.insert("c".to_string(), Vec::new());
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut cache = MoveCache::new(4);
        cache.insert("a".to_string(), Vec::new());
        cache.invalidate();
        assert!(cache.is_empty());
    }
}
