use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bluetooth::{PlayerModes, RepeatMode};
use crate::player::{PlaybackClock, PlayerView};

/// `m:ss`
pub fn format_time(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn render_view(view: &PlayerView, modes: PlayerModes, art_url: Option<&str>, fallback_art_url: &str) -> String {
    match view {
        PlayerView::NoPlayer => format!(
            "{}\nPlease connect one\nArt: {}",
            "No media player found".bold(),
            fallback_art_url.dimmed()
        ),
        PlayerView::NoMedia => format!(
            "{}\nPress play to start\nArt: {}",
            "No media is playing".bold(),
            fallback_art_url.dimmed()
        ),
        PlayerView::HasMedia(details) => {
            let mut lines = vec![
                details.title_or_unknown().bold().to_string(),
                details.artist_or_unknown().to_string(),
            ];
            if let Some(album) = details.album.as_deref().filter(|a| !a.is_empty()) {
                lines.push(album.dimmed().to_string());
            }
            lines.push(render_modes(modes));
            lines.push(match art_url {
                Some(url) => format!("Art: {}", url.cyan()),
                None => format!("Art: {}", fallback_art_url.dimmed()),
            });
            lines.join("\n")
        }
    }
}

pub fn render_modes(modes: PlayerModes) -> String {
    let shuffle = if modes.shuffle {
        "shuffle on".magenta().to_string()
    } else {
        "shuffle off".dimmed().to_string()
    };

    let repeat = match modes.repeat {
        RepeatMode::Off => "repeat off".dimmed().to_string(),
        RepeatMode::AllTracks => "repeat all".magenta().to_string(),
        RepeatMode::SingleTrack => "repeat one".magenta().to_string(),
    };

    format!("{}  {}", shuffle, repeat)
}

pub fn render_position(clock: &PlaybackClock) -> String {
    format!(
        "{} / {}",
        format_time(clock.position_ms()),
        format_time(clock.duration_ms())
    )
}

pub fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::with_template("{prefix} [{bar:30.magenta/blue}] {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

pub fn update_progress_bar(pb: &ProgressBar, view: &PlayerView, clock: &PlaybackClock) {
    match view.track() {
        Some(details) if clock.duration_ms() > 0 => {
            pb.set_length(clock.duration_ms());
            pb.set_position(clock.position_ms());
            pb.set_message(format!(
                "{} - {}",
                details.title_or_unknown(),
                details.artist_or_unknown()
            ));
        }
        Some(details) => {
            pb.set_length(1);
            pb.set_position(0);
            pb.set_message(details.title_or_unknown().to_string());
        }
        None => {
            pb.set_length(1);
            pb.set_position(0);
            pb.set_message(match view {
                PlayerView::NoPlayer => "No media player found",
                _ => "No media is playing",
            });
        }
    }
    pb.set_prefix(render_position(clock));
}
