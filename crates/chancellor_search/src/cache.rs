//! Transposition and evaluation tables for one query.
//!
//! Both tables are read-through: a hit is authoritative. Inserting an existing
//! key overwrites it, which is harmless because values are a deterministic
//! function of the key within a query.

use chancellor_core::{Evaluation, PositionKey, SearchResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Bounding policy shared by both tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum CachePolicy {
    /// Keep everything for the lifetime of the manager
    #[default]
    Unbounded,
    /// Keep at most `capacity` entries per table, evicting the least recently used
    Lru { capacity: usize },
}

struct Entry<V> {
    value: V,
    last_used: u64,
}

struct Table<K, V> {
    entries: HashMap<K, Entry<V>>,
    capacity: Option<usize>,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> Table<K, V> {
    fn new(policy: CachePolicy) -> Self {
        let capacity = match policy {
            CachePolicy::Unbounded => None,
            CachePolicy::Lru { capacity } => Some(capacity),
        };
        Self {
            entries: HashMap::new(),
            capacity,
            clock: 0,
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = clock;
            entry.value.clone()
        })
    }

    fn insert(&mut self, key: K, value: V) {
        if self.capacity == Some(0) {
            return;
        }
        self.clock += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                last_used: self.clock,
            },
        );
        if self.capacity.is_some_and(|capacity| self.entries.len() > capacity) {
            // Linear scan; bounded tables are expected to stay small.
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Counters describing how much work the tables saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub transposition_hits: u64,
    pub evaluation_hits: u64,
    pub transpositions: usize,
    pub evaluations: usize,
}

pub struct CacheManager {
    transpositions: Mutex<Table<PositionKey, SearchResult>>,
    evaluations: Mutex<Table<String, Arc<Vec<Evaluation>>>>,
    transposition_hits: AtomicU64,
    evaluation_hits: AtomicU64,
}

impl CacheManager {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            transpositions: Mutex::new(Table::new(policy)),
            evaluations: Mutex::new(Table::new(policy)),
            transposition_hits: AtomicU64::new(0),
            evaluation_hits: AtomicU64::new(0),
        }
    }

    pub fn get_transposition(&self, key: &PositionKey) -> Option<SearchResult> {
        let hit = self.transpositions.lock().get(key);
        if hit.is_some() {
            self.transposition_hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "transposition hit");
        }
        hit
    }

    pub fn cache_transposition(&self, key: PositionKey, result: SearchResult) {
        self.transpositions.lock().insert(key, result);
    }

    /// Evaluations are keyed by the full FEN.
    pub fn get_evaluation(&self, fen: &str) -> Option<Arc<Vec<Evaluation>>> {
        let hit = self.evaluations.lock().get(&fen.to_string());
        if hit.is_some() {
            self.evaluation_hits.fetch_add(1, Ordering::Relaxed);
            debug!(fen, "evaluation hit");
        }
        hit
    }

    pub fn cache_evaluation(&self, fen: &str, evaluations: Arc<Vec<Evaluation>>) {
        self.evaluations.lock().insert(fen.to_string(), evaluations);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            transposition_hits: self.transposition_hits.load(Ordering::Relaxed),
            evaluation_hits: self.evaluation_hits.load(Ordering::Relaxed),
            transpositions: self.transpositions.lock().len(),
            evaluations: self.evaluations.lock().len(),
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
