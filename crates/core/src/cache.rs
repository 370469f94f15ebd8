//! Caller-owned memoization of dominant-color extraction.
//!
//! The engine keeps no global state. A host that re-extracts the same image
//! (re-renders, undo/redo) can hold an [`ExtractionCache`] and key it by
//! [`ExtractionKey`]: a hash of the pixel data together with every input
//! that affects the result.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::cancel::CancelFlag;
use crate::cluster::{extract_dominant_colors, Extraction, KMeansConfig};
use crate::error::ColorError;
use crate::pixel::PixelBuffer;
use crate::prng::Xorshift64;

/// Identifies one extraction: image content, config and seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractionKey {
    content_hash: u64,
    width: usize,
    height: usize,
    k: usize,
    max_iterations: usize,
    epsilon_bits: u64,
    sample_stride: usize,
    seed: u64,
}

impl ExtractionKey {
    pub fn new(buffer: &PixelBuffer, config: &KMeansConfig, seed: u64) -> Self {
        let mut hasher = DefaultHasher::new();
        buffer.data().hash(&mut hasher);
        Self {
            content_hash: hasher.finish(),
            width: buffer.width(),
            height: buffer.height(),
            k: config.k,
            max_iterations: config.max_iterations,
            epsilon_bits: config.epsilon.to_bits(),
            sample_stride: config.sample_stride,
            seed,
        }
    }
}

/// Entries kept by [`ExtractionCache::default`].
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct CacheEntry {
    extraction: Extraction,
    access_count: u32,
    /// Insertion order, breaks eviction ties.
    stamp: u64,
}

/// An explicit, bounded map from [`ExtractionKey`] to finished extractions.
///
/// Holds at most `capacity` entries. Inserting into a full cache evicts the
/// least frequently used entry, the oldest one on ties.
#[derive(Debug, Clone)]
pub struct ExtractionCache {
    entries: HashMap<ExtractionKey, CacheEntry>,
    max_entries: usize,
    next_stamp: u64,
    hits: u64,
    misses: u64,
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ExtractionCache {
    /// A cache holding up to `max_entries` extractions (at least one).
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: HashMap::with_capacity(max_entries),
            max_entries,
            next_stamp: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&self, key: &ExtractionKey) -> Option<&Extraction> {
        self.entries.get(key).map(|e| &e.extraction)
    }

    /// Stores `extraction`, evicting first if the cache is full and `key`
    /// is new.
    pub fn insert(&mut self, key: ExtractionKey, extraction: Extraction) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.max_entries {
                self.evict_lfu();
            }
        }
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.entries.insert(
            key,
            CacheEntry {
                extraction,
                access_count: 0,
                stamp,
            },
        );
    }

    /// Returns the cached extraction, or runs k-means seeded with `seed`
    /// and stores the result. Errors are not cached.
    pub fn get_or_extract(
        &mut self,
        buffer: &PixelBuffer,
        config: &KMeansConfig,
        seed: u64,
        cancel: Option<&CancelFlag>,
    ) -> Result<&Extraction, ColorError> {
        let key = ExtractionKey::new(buffer, config, seed);
        if let Some(entry) = self.entries.get_mut(&key) {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
        } else {
            self.misses += 1;
            let mut rng = Xorshift64::new(seed);
            let extraction = extract_dominant_colors(buffer, config, &mut rng, cancel)?;
            self.insert(key, extraction);
        }
        Ok(&self.entries[&key].extraction)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// `(hits, misses)` counted by [`ExtractionCache::get_or_extract`].
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_lfu(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.access_count, e.stamp))
            .map(|(k, _)| *k);
        if let Some(key) = victim {
            tracing::debug!(?key, "evicting cached extraction");
            self.entries.remove(&key);
        }
    }
}
