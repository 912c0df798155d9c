use crate::bluetooth::models::{PlayerModes, RepeatMode, TrackDetails};

pub const NO_PLAYER_BANNER: &str = "No default player available";

pub fn has_no_player(output: &str) -> bool {
    output.contains(NO_PLAYER_BANNER)
}

/// Parse the text printed by the player menu's `show`.
///
/// Matching is by substring and the first key found on a line wins, checked
/// in the order title, artist, album, status, duration, position. Keys that
/// never appear stay `None`; unparseable numbers become 0.
pub fn parse_track_details(output: &str) -> TrackDetails {
    let mut details = TrackDetails::default();

    for line in output.lines() {
        if let Some(value) = text_value(line, "Track.Title") {
            details.title = Some(value);
        } else if let Some(value) = text_value(line, "Track.Artist") {
            details.artist = Some(value);
        } else if let Some(value) = text_value(line, "Track.Album") {
            details.album = Some(value);
        } else if let Some(value) = text_value(line, "Status") {
            details.status = Some(value);
        } else if line.contains("Track.Duration") {
            details.duration_ms = Some(numeric_value(line));
        } else if line.contains("Position") {
            details.position_ms = Some(numeric_value(line));
        }
    }

    details
}

pub fn parse_player_modes(output: &str) -> PlayerModes {
    let shuffle = output.contains("Shuffle: alltracks");

    let repeat = if output.contains("Repeat: alltracks") {
        RepeatMode::AllTracks
    } else if output.contains("Repeat: singletrack") {
        RepeatMode::SingleTrack
    } else {
        RepeatMode::Off
    };

    PlayerModes { shuffle, repeat }
}

/// Text after the first colon that follows `key`, trimmed.
fn text_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)?;
    let rest = &line[start + key.len()..];

    Some(match rest.split_once(':') {
        Some((_, value)) => value.trim().to_string(),
        None => String::new(),
    })
}

/// Numeric value from the last parenthesized token on the line, e.g.
/// `Track.Duration: 0x0003a980 (240000)`.
fn numeric_value(line: &str) -> u64 {
    let Some(open) = line.rfind('(') else {
        return 0;
    };
    let Some(len) = line[open + 1..].find(')') else {
        return 0;
    };
    let token = line[open + 1..open + 1 + len].trim();

    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse(),
    };

    parsed.unwrap_or(0)
}
