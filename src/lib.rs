pub mod artwork;
pub mod bluetooth;
pub mod config;
pub mod display;
pub mod error;
pub mod player;
pub mod spotify;
pub mod watch;

pub use artwork::{AlbumArtCache, ArtUpdate, ArtworkResolver, ArtworkSource, SpotifyArtwork};
pub use bluetooth::{Bluetoothctl, PlayerCommand, PlayerModes, PlayerTransport, RepeatMode, TrackDetails};
pub use config::Config;
pub use error::{AppError, Result};
pub use player::{PlayerController, PlayerView, RefreshOutcome, StatusReport};
pub use spotify::{AccessToken, SpotifyClient, TokenStore};
