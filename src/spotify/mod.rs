pub mod client;
pub mod models;
pub mod token;

pub use client::SpotifyClient;
pub use token::{AccessToken, TokenStore};
