use serde::Serialize;

use crate::bluetooth::{PlayerModes, TrackDetails};

/// What the player currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerView {
    NoPlayer,
    NoMedia,
    HasMedia(TrackDetails),
}

impl PlayerView {
    pub fn state_name(&self) -> &'static str {
        match self {
            PlayerView::NoPlayer => "no-player",
            PlayerView::NoMedia => "no-media",
            PlayerView::HasMedia(_) => "has-media",
        }
    }

    pub fn track(&self) -> Option<&TrackDetails> {
        match self {
            PlayerView::HasMedia(details) => Some(details),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: &'static str,
    pub playing: bool,
    pub track: Option<TrackDetails>,
    pub modes: PlayerModes,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub art_url: Option<String>,
}
