use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

pub const CACHE_DURATION: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    fetched_at: Instant,
}

/// In-memory album art URLs keyed by `"title-artist"`.
///
/// Entries expire after `ttl` and are dropped the next time they are looked up.
#[derive(Debug)]
pub struct AlbumArtCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    last_track: Option<String>,
}

impl AlbumArtCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_DURATION)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            last_track: None,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<String> {
        let entry = self.entries.get(key)?;

        if now.saturating_duration_since(entry.fetched_at) < self.ttl {
            return Some(entry.url.clone());
        }

        debug!("Album art cache entry expired: {}", key);
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.insert_at(key, url, Instant::now());
    }

    pub fn insert_at(&mut self, key: impl Into<String>, url: impl Into<String>, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                url: url.into(),
                fetched_at: now,
            },
        );
    }

    /// Key of the most recent fetch attempt, successful or not.
    pub fn last_track(&self) -> Option<&str> {
        self.last_track.as_deref()
    }

    pub fn set_last_track(&mut self, key: impl Into<String>) {
        self.last_track = Some(key.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AlbumArtCache {
    fn default() -> Self {
        Self::new()
    }
}
