//! Decoded poster cache with LRU eviction.
//!
//! Posters are decoded once by the loader and kept here keyed by image path.
//! The terminal graphics protocol state for an entry is created lazily the
//! first time the poster is drawn, since it needs the picker.

use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use std::collections::{HashMap, HashSet, VecDeque};

/// Smallest capacity accepted from config
const MIN_CACHE_ENTRIES: usize = 8;

/// One cached poster
pub struct CachedPoster {
    /// None when the poster could not be loaded; remembered so it is not retried
    image: Option<DynamicImage>,
    protocol: Option<StatefulProtocol>,
}

impl std::fmt::Debug for CachedPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedPoster")
            .field(
                "image",
                &self.image.as_ref().map(|img| (img.width(), img.height())),
            )
            .field("protocol", &self.protocol.is_some())
            .finish()
    }
}

impl CachedPoster {
    pub fn is_missing(&self) -> bool {
        self.image().is_none()
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    /// Protocol state for drawing, created on first use
    pub fn protocol(&mut self, picker: &Picker) -> Option<&mut StatefulProtocol> {
        let image = self.image.as_ref()?;
        if self.protocol.is_none() {
            self.protocol = Some(picker.new_resize_protocol(image.clone()));
        }
        self.protocol.as_mut()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub pending: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug)]
pub struct PosterCache {
    capacity: usize,
    entries: HashMap<String, CachedPoster>,
    /// front = oldest, back = most recent
    lru_order: VecDeque<String>,
    /// Paths requested from the loader and not back yet
    pending: HashSet<String>,
    hits: u64,
    misses: u64,
}

impl PosterCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CACHE_ENTRIES);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            lru_order: VecDeque::with_capacity(capacity),
            pending: HashSet::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a poster, refreshing its LRU position
    pub fn get_mut(&mut self, path: &str) -> Option<&mut CachedPoster> {
        if self.entries.contains_key(path) {
            self.hits += 1;
            self.touch(path);
            self.entries.get_mut(path)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Presence check without touching LRU order or stats
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: String, image: Option<DynamicImage>) {
        self.pending.remove(&path);

        if let Some(entry) = self.entries.get_mut(&path) {
            entry.image = image;
            entry.protocol = None;
            self.touch(&path);
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.lru_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            log::debug!("Evicted poster cache entry: {}", oldest);
        }

        self.lru_order.push_back(path.clone());
        self.entries.insert(
            path,
            CachedPoster {
                image,
                protocol: None,
            },
        );
    }

    /// Record that `path` was requested. Returns false if it already was.
    pub fn mark_pending(&mut self, path: &str) -> bool {
        if self.pending.contains(path) {
            return false;
        }
        self.pending.insert(path.to_string())
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.contains(path)
    }

    /// Whether `path` still has to be requested from the loader
    pub fn needs_load(&self, path: &str) -> bool {
        !self.contains(path) && !self.is_pending(path)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            pending: self.pending.len(),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        if stats.hits + stats.misses > 0 {
            log::debug!(
                "Poster cache: {} hits, {} misses ({:.1}% hit rate), {} entries",
                stats.hits,
                stats.misses,
                stats.hit_rate(),
                stats.entries
            );
        }
    }

    fn touch(&mut self, path: &str) {
        if let Some(pos) = self.lru_order.iter().position(|p| p == path)
            && let Some(key) = self.lru_order.remove(pos)
        {
            self.lru_order.push_back(key);
        }
    }
}

impl Default for PosterCache {
    fn default() -> Self {
        Self::new(crate::app::config::PostersConfig::default().cache_entries)
    }
}
