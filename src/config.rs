use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_TOKEN_FILE: &str = "spotify_token.json";
pub const DEFAULT_BLUETOOTHCTL: &str = "bluetoothctl";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_FALLBACK_ART_URL: &str =
    "https://img.freepik.com/free-vector/oops-404-error-with-broken-robot-concept-illustration_114360-5529.jpg";

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_base: Url,
    pub spotify_auth_url: Url,
    pub token_file: PathBuf,
    pub bluetoothctl: String,
    pub poll_interval: Duration,
    pub fallback_art_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset and blank values
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let spotify_client_id = get("SPOTIFY_CLIENT_ID").unwrap_or_default();
        let spotify_client_secret = get("SPOTIFY_CLIENT_SECRET").unwrap_or_default();

        let spotify_api_base = parse_url(
            "SPOTIFY_API_BASE",
            &get("SPOTIFY_API_BASE").unwrap_or_else(|| DEFAULT_SPOTIFY_API_BASE.to_string()),
        )?;
        let spotify_auth_url = parse_url(
            "SPOTIFY_AUTH_URL",
            &get("SPOTIFY_AUTH_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_AUTH_URL.to_string()),
        )?;

        let token_file = get("BLUEDIA_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let bluetoothctl =
            get("BLUEDIA_BLUETOOTHCTL").unwrap_or_else(|| DEFAULT_BLUETOOTHCTL.to_string());

        let poll_interval = match get("BLUEDIA_POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!("BLUEDIA_POLL_INTERVAL_SECS is not a number: {}", raw))
                })?;
                if secs == 0 {
                    return Err(AppError::Config(
                        "BLUEDIA_POLL_INTERVAL_SECS must be greater than zero".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let fallback_art_url =
            get("BLUEDIA_FALLBACK_ART_URL").unwrap_or_else(|| DEFAULT_FALLBACK_ART_URL.to_string());

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_api_base,
            spotify_auth_url,
            token_file,
            bluetoothctl,
            poll_interval,
            fallback_art_url,
        })
    }

    pub fn missing_spotify_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.spotify_client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.spotify_client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }

        missing
    }

    pub fn validate_spotify_config(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", key, e)))
}
