//! Text Measurement Cache
//!
//! Fixed-capacity LRU cache from (font, text) to measured width, with hit and
//! miss counters kept around an [`lru::LruCache`]. `get` and `set` are O(1).

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};

/// Default number of cached measurements
pub const DEFAULT_MEASURE_CACHE_CAPACITY: usize = 5000;

// =============================================================================
// Keys & Stats
// =============================================================================

/// Structured cache key; font and text never share a separator
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasureKey {
    pub font: String,
    pub text: String,
}

impl MeasureKey {
    pub fn new(font: &str, text: &str) -> Self {
        Self {
            font: font.to_string(),
            text: text.to_string(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Hit rate (0.0 - 1.0), zero before any lookup
    pub hit_rate: f64,
    /// Entries currently held
    pub size: usize,
    /// Maximum entries
    pub capacity: usize,
}

// =============================================================================
// Cache
// =============================================================================

/// LRU cache of text widths
#[derive(Debug)]
pub struct TextMeasureCache {
    entries: LruCache<MeasureKey, f64>,
    hits: u64,
    misses: u64,
}

impl TextMeasureCache {
    /// Creates a cache; capacity is clamped to at least 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the key is cached, without touching recency or counters
    pub fn contains(&self, key: &MeasureKey) -> bool {
        self.entries.contains(key)
    }

    /// Looks up a width, promoting the entry to most recently used on a hit
    pub fn get(&mut self, key: &MeasureKey) -> Option<f64> {
        match self.entries.get(key).copied() {
            Some(width) => {
                self.hits += 1;
                Some(width)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores a width, evicting the least recently used entry when full
    pub fn set(&mut self, key: MeasureKey, width: f64) {
        self.entries.put(key, width);
    }

    /// Drops every entry and resets the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            size: self.len(),
            capacity: self.capacity(),
        }
    }

    /// Keys from most to least recently used
    pub fn keys_by_recency(&self) -> Vec<&MeasureKey> {
        self.entries.iter().map(|(key, _)| key).collect()
    }
}

impl Default for TextMeasureCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEASURE_CACHE_CAPACITY)
    }
}

// =============================================================================
// Tests
// =============================================================================
