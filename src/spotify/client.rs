use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::models::{SearchResponse, TokenResponse};
use crate::spotify::token::{now_epoch_secs, AccessToken};

/// Minimal Spotify Web API client: client-credentials tokens and track search.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http_client: Client,
    client_id: String,
    client_secret: String,
    api_base: Url,
    auth_url: Url,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            api_base: config.spotify_api_base.clone(),
            auth_url: config.spotify_auth_url.clone(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub async fn request_token(&self) -> Result<AccessToken> {
        if !self.has_credentials() {
            return Err(AppError::Config(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required for album art".into(),
            ));
        }

        debug!("Requesting Spotify access token");

        let response = self
            .http_client
            .post(self.auth_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token request failed ({}): {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

        Ok(AccessToken {
            access_token: token.access_token,
            expiry: now_epoch_secs() + token.expires_in as f64,
        })
    }

    pub fn search_url(&self, title: &str, artist: &str) -> String {
        let query = format!("track:{} artist:{}", title, artist);

        format!(
            "{}/search?q={}&type=track&limit=1",
            self.api_base.as_str().trim_end_matches('/'),
            urlencoding::encode(&query)
        )
    }

    /// Album art URL of the best search hit, or `None` on any failure.
    pub async fn search_album_art(&self, title: &str, artist: &str, token: &str) -> Option<String> {
        debug!("Fetching album art for: {} - {}", title, artist);

        match self.try_search_album_art(title, artist, token).await {
            Ok(Some(url)) => {
                debug!("Album art found on Spotify: {}", url);
                Some(url)
            }
            Ok(None) => {
                debug!("No album art found for: {} - {}", title, artist);
                None
            }
            Err(e) => {
                warn!("Error fetching album art: {}", e);
                None
            }
        }
    }

    async fn try_search_album_art(
        &self,
        title: &str,
        artist: &str,
        token: &str,
    ) -> Result<Option<String>> {
        let response = self
            .http_client
            .get(self.search_url(title, artist))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::SpotifyApi(format!(
                "Search failed ({}): {}",
                status, error_text
            )));
        }

        let search: SearchResponse = response.json().await?;

        Ok(search.first_image_url())
    }
}
