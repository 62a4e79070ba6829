//! Pixmap cache for image items and the background.
//!
//! Converting a raster to a premultiplied pixmap touches every pixel, so the
//! result is kept for as long as the raster keeps being drawn.

use std::collections::HashMap;
use std::sync::Arc;

use markup_core::Raster;
use tiny_skia::Pixmap;

use crate::convert::image_to_pixmap;

#[derive(Debug)]
struct CacheEntry {
    /// Held so the allocation, and therefore the key, stays unique.
    _raster: Raster,
    pixmap: Pixmap,
    last_used: u64,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

/// Converted pixmaps keyed by raster identity.
#[derive(Debug, Default)]
pub struct PixmapCache {
    entries: HashMap<usize, CacheEntry>,
    generation: u64,
    stats: CacheStats,
}

impl PixmapCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(raster: &Raster) -> usize {
        Arc::as_ptr(raster) as usize
    }

    /// Get the pixmap for a raster, converting it on first use.
    ///
    /// Returns `None` for rasters with a zero dimension.
    pub fn get_or_convert(&mut self, raster: &Raster) -> Option<&Pixmap> {
        let key = Self::key(raster);
        let generation = self.generation;
        if let Some(entry) = self.entries.get_mut(&key) {
            self.stats.hits += 1;
            entry.last_used = generation;
        } else {
            self.stats.misses += 1;
            let pixmap = image_to_pixmap(raster)?;
            self.entries.insert(
                key,
                CacheEntry {
                    _raster: Arc::clone(raster),
                    pixmap,
                    last_used: generation,
                },
            );
        }
        self.entries.get(&key).map(|e| &e.pixmap)
    }

    /// Drop entries not used since the previous call, then start a new generation.
    pub fn sweep(&mut self) {
        let generation = self.generation;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.last_used == generation);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!("Evicted {evicted} cached pixmaps");
        }
        self.stats.evictions += evicted as u64;
        self.generation += 1;
    }

    /// Number of cached pixmaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
