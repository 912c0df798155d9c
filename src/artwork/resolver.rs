use serde::Serialize;
use tracing::debug;

use crate::artwork::cache::AlbumArtCache;
use crate::config::Config;
use crate::spotify::{SpotifyClient, TokenStore};

/// What the display should do with the album art after a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "url", rename_all = "lowercase")]
pub enum ArtUpdate {
    Cached(String),
    Fetched(String),
    /// Nothing was found; show the placeholder.
    Fallback,
    /// The previous attempt for this track already failed; leave the art as is.
    Keep,
}

impl ArtUpdate {
    pub fn url(&self) -> Option<&str> {
        match self {
            ArtUpdate::Cached(url) | ArtUpdate::Fetched(url) => Some(url),
            ArtUpdate::Fallback | ArtUpdate::Keep => None,
        }
    }
}

/// A remote service that can find album art.
#[allow(async_fn_in_trait)]
pub trait ArtworkSource {
    /// A usable access token, refreshing it if needed.
    async fn access_token(&mut self) -> Option<String>;

    async fn search(&self, title: &str, artist: &str, token: &str) -> Option<String>;
}

/// Spotify search backed by a client-credentials token.
pub struct SpotifyArtwork {
    client: SpotifyClient,
    tokens: TokenStore,
}

impl SpotifyArtwork {
    pub fn new(config: &Config) -> Self {
        Self {
            client: SpotifyClient::new(config),
            tokens: TokenStore::new(&config.token_file),
        }
    }
}

impl ArtworkSource for SpotifyArtwork {
    async fn access_token(&mut self) -> Option<String> {
        self.tokens.access_token(&self.client).await
    }

    async fn search(&self, title: &str, artist: &str, token: &str) -> Option<String> {
        self.client.search_album_art(title, artist, token).await
    }
}

pub struct ArtworkResolver<S> {
    source: S,
    cache: AlbumArtCache,
}

impl<S: ArtworkSource> ArtworkResolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_cache(source, AlbumArtCache::new())
    }

    pub fn with_cache(source: S, cache: AlbumArtCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &AlbumArtCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve(&mut self, title: &str, artist: &str) -> ArtUpdate {
        let key = format!("{}-{}", title, artist);

        if let Some(url) = self.cache.get(&key) {
            debug!("Loading album art from cache: {}", key);
            self.cache.set_last_track(key);
            return ArtUpdate::Cached(url);
        }

        if self.cache.last_track() == Some(key.as_str()) {
            return ArtUpdate::Keep;
        }

        let Some(token) = self.source.access_token().await else {
            return ArtUpdate::Fallback;
        };

        debug!("Fetching new album art: {}", key);
        self.cache.set_last_track(key.clone());

        match self.source.search(title, artist, &token).await {
            Some(url) => {
                self.cache.insert(key, url.clone());
                ArtUpdate::Fetched(url)
            }
            None => ArtUpdate::Fallback,
        }
    }
}
