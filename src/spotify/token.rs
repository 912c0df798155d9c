use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::spotify::client::SpotifyClient;

/// Client-credentials token as stored in the token file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Epoch seconds.
    pub expiry: f64,
}

impl AccessToken {
    pub fn is_valid_at(&self, now: f64) -> bool {
        now < self.expiry
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_epoch_secs())
    }
}

pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Reads a token file, returning it only when it parses and has not expired.
pub fn load_token(path: &Path) -> Option<AccessToken> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("No token file at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<AccessToken>(&contents) {
        Ok(token) if token.is_valid() => {
            debug!("Loaded token from {}", path.display());
            Some(token)
        }
        Ok(_) => {
            debug!("Token in {} has expired", path.display());
            None
        }
        Err(e) => {
            debug!("Ignoring unreadable token file {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_token(path: &Path, token: &AccessToken) -> Result<()> {
    let json = serde_json::to_string(token)?;
    fs::write(path, json)?;

    debug!("Token saved to {}", path.display());

    Ok(())
}

/// Keeps the current token, falling back to the token file and then to a new
/// client-credentials exchange.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    current: Option<AccessToken>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    pub async fn access_token(&mut self, client: &SpotifyClient) -> Option<String> {
        if let Some(token) = self.current.as_ref().filter(|t| t.is_valid()) {
            return Some(token.access_token.clone());
        }

        if let Some(token) = load_token(&self.path) {
            self.current = Some(token.clone());
            return Some(token.access_token);
        }

        if !client.has_credentials() {
            debug!("Spotify credentials not configured and no saved token, skipping album art");
            return None;
        }

        match client.request_token().await {
            Ok(token) => {
                info!("Obtained a new Spotify access token");
                if let Err(e) = save_token(&self.path, &token) {
                    warn!("Failed to save token to {}: {}", self.path.display(), e);
                }
                let access_token = token.access_token.clone();
                self.current = Some(token);
                Some(access_token)
            }
            Err(e) => {
                warn!("Failed to get Spotify access token: {}", e);
                self.current = None;
                None
            }
        }
    }
}
