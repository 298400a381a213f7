// this_file: backends/sdftext-shape-hr/src/cache.rs

//! Shaping result cache
//!
//! Identical runs get shaped over and over in UI text (labels, buttons,
//! repeated words), so the shaper can keep recent results around.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use sdftext_core::types::{Direction, ShapedRun, ShapingParams};

/// Default number of cached runs
pub const DEFAULT_CAPACITY: usize = 512;

/// Everything that can change a shaping result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapingCacheKey {
    pub text: Vec<char>,
    /// Hash of the font bytes
    pub font_id: u64,
    pub direction: Direction,
    pub script: Option<[u8; 4]>,
    pub language: Option<String>,
}

impl ShapingCacheKey {
    pub fn new(text: &[char], font_data: &[u8], params: &ShapingParams) -> Self {
        let mut hasher = DefaultHasher::new();
        font_data.hash(&mut hasher);

        Self {
            text: text.to_vec(),
            font_id: hasher.finish(),
            direction: params.direction,
            script: params.script,
            language: params.language.clone(),
        }
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU map from shaping inputs to shaped runs
pub struct ShapingCache {
    entries: LruCache<ShapingCacheKey, ShapedRun>,
    stats: CacheStats,
}

impl ShapingCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &ShapingCacheKey) -> Option<ShapedRun> {
        match self.entries.get(key) {
            Some(run) => {
                self.stats.hits += 1;
                Some(run.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: ShapingCacheKey, run: ShapedRun) {
        self.entries.put(key, run);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

impl Default for ShapingCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdftext_core::types::ShapedGlyph;

    fn key(text: &str) -> ShapingCacheKey {
        let chars: Vec<char> = text.chars().collect();
        ShapingCacheKey::new(&chars, b"font", &ShapingParams::default())
    }

    fn run(glyph_id: u32) -> ShapedRun {
        ShapedRun {
            glyphs: vec![ShapedGlyph {
                glyph_id,
                ..Default::default()
            }],
            direction: Direction::LeftToRight,
        }
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = ShapingCache::default();
        cache.insert(key("Test"), run(7));

        let cached = cache.get(&key("Test")).expect("cached run");
        assert_eq!(cached.glyphs[0].glyph_id, 7);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 0 });
    }

    #[test]
    fn test_cache_keys_differ_by_direction() {
        let chars: Vec<char> = "ab".chars().collect();
        let rtl = ShapingParams {
            direction: Direction::RightToLeft,
            ..Default::default()
        };
        assert_ne!(
            ShapingCacheKey::new(&chars, b"font", &ShapingParams::default()),
            ShapingCacheKey::new(&chars, b"font", &rtl)
        );
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = ShapingCache::new(NonZeroUsize::new(2).unwrap());
        cache.insert(key("a"), run(1));
        cache.insert(key("b"), run(2));
        cache.insert(key("c"), run(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.get(&key("c")).is_some());
        assert!((cache.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
