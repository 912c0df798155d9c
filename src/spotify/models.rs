use rspotify::model::Image;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: Option<SearchPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchTrack {
    pub album: SearchAlbum,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchAlbum {
    #[serde(default)]
    pub images: Vec<Image>,
}

impl SearchResponse {
    /// First image of the first track's album.
    pub fn first_image_url(self) -> Option<String> {
        self.tracks?
            .items
            .into_iter()
            .next()?
            .album
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
    }
}
