use serde::{Deserialize, Serialize};

/// Values bluetoothctl reports when a player exists but has nothing loaded.
pub const NOT_PROVIDED: &str = "Not Provided";

/// Now-playing fields parsed from a single poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetails {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub status: Option<String>,
    pub duration_ms: Option<u64>,
    pub position_ms: Option<u64>,
}

impl TrackDetails {
    pub fn is_playing(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("playing"))
    }

    /// True when neither title nor artist carries a real value.
    pub fn is_empty_media(&self) -> bool {
        fn blank(value: &Option<String>) -> bool {
            match value.as_deref() {
                None => true,
                Some(v) => v.is_empty() || v == NOT_PROVIDED,
            }
        }

        blank(&self.title) && blank(&self.artist)
    }

    pub fn title_or_unknown(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }

    pub fn artist_or_unknown(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    AllTracks,
    SingleTrack,
}

impl RepeatMode {
    /// off -> alltracks -> singletrack -> off
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::AllTracks,
            RepeatMode::AllTracks => RepeatMode::SingleTrack,
            RepeatMode::SingleTrack => RepeatMode::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::AllTracks => "alltracks",
            RepeatMode::SingleTrack => "singletrack",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerModes {
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

/// A command for the bluetoothctl `player` submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Show,
    Play,
    Pause,
    Next,
    Previous,
    Shuffle(bool),
    Repeat(RepeatMode),
}

impl std::fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerCommand::Show => write!(f, "show"),
            PlayerCommand::Play => write!(f, "play"),
            PlayerCommand::Pause => write!(f, "pause"),
            PlayerCommand::Next => write!(f, "next"),
            PlayerCommand::Previous => write!(f, "previous"),
            PlayerCommand::Shuffle(true) => write!(f, "shuffle alltracks"),
            PlayerCommand::Shuffle(false) => write!(f, "shuffle off"),
            PlayerCommand::Repeat(mode) => write!(f, "repeat {}", mode),
        }
    }
}

#[cfg(test)]
impl TrackDetails {
    pub fn mock(title: &str, artist: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            album: Some("Mock Album".to_string()),
            status: Some("playing".to_string()),
            duration_ms: Some(180_000),
            position_ms: Some(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_strings() {
        assert_eq!(PlayerCommand::Show.to_string(), "show");
        assert_eq!(PlayerCommand::Previous.to_string(), "previous");
        assert_eq!(PlayerCommand::Shuffle(true).to_string(), "shuffle alltracks");
        assert_eq!(PlayerCommand::Shuffle(false).to_string(), "shuffle off");
        assert_eq!(
            PlayerCommand::Repeat(RepeatMode::SingleTrack).to_string(),
            "repeat singletrack"
        );
    }

    #[test]
    fn test_repeat_cycle() {
        let mut mode = RepeatMode::Off;
        let seen: Vec<_> = (0..4)
            .map(|_| {
                mode = mode.next();
                mode
            })
            .collect();

        assert_eq!(
            seen,
            vec![
                RepeatMode::AllTracks,
                RepeatMode::SingleTrack,
                RepeatMode::Off,
                RepeatMode::AllTracks
            ]
        );
    }

    #[test]
    fn test_empty_media_detection() {
        assert!(TrackDetails::default().is_empty_media());

        let not_provided = TrackDetails {
            title: Some(NOT_PROVIDED.to_string()),
            artist: Some(String::new()),
            ..Default::default()
        };
        assert!(not_provided.is_empty_media());

        let artist_only = TrackDetails {
            artist: Some("Queen".to_string()),
            ..Default::default()
        };
        assert!(!artist_only.is_empty_media());
    }

    #[test]
    fn test_unknown_placeholders() {
        let details = TrackDetails {
            title: Some("Jazz".to_string()),
            ..Default::default()
        };
        assert_eq!(details.title_or_unknown(), "Jazz");
        assert_eq!(details.artist_or_unknown(), "Unknown");
    }

    #[test]
    fn test_is_playing_ignores_case() {
        let mut details = TrackDetails::mock("Foo", "Bar");
        details.status = Some("Playing".to_string());
        assert!(details.is_playing());
        details.status = Some("paused".to_string());
        assert!(!details.is_playing());
    }
}
