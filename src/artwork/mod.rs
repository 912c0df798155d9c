pub mod cache;
pub mod resolver;

pub use cache::{AlbumArtCache, CACHE_DURATION};
pub use resolver::{ArtUpdate, ArtworkResolver, ArtworkSource, SpotifyArtwork};
