use std::time::Instant;

use tracing::{debug, info};

use crate::artwork::{ArtUpdate, ArtworkResolver, ArtworkSource};
use crate::bluetooth::{
    has_no_player, parse_player_modes, parse_track_details, PlayerCommand, PlayerModes,
    PlayerTransport, RepeatMode,
};
use crate::error::{AppError, Result};
use crate::player::clock::PlaybackClock;
use crate::player::view::{PlayerView, StatusReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    NoPlayer,
    NoMedia,
    /// Same snapshot as last time; nothing was rebuilt.
    Unchanged,
    Updated { art: ArtUpdate },
}

/// Polls the player, tracks what is playing and forwards user actions.
pub struct PlayerController<T, S> {
    transport: T,
    artwork: ArtworkResolver<S>,
    view: PlayerView,
    modes: PlayerModes,
    clock: PlaybackClock,
    art_url: Option<String>,
}

impl<T: PlayerTransport, S: ArtworkSource> PlayerController<T, S> {
    pub fn new(transport: T, artwork: ArtworkResolver<S>) -> Self {
        Self {
            transport,
            artwork,
            view: PlayerView::NoMedia,
            modes: PlayerModes::default(),
            clock: PlaybackClock::new(Instant::now()),
            art_url: None,
        }
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn modes(&self) -> PlayerModes {
        self.modes
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn art_url(&self) -> Option<&str> {
        self.art_url.as_deref()
    }

    pub fn artwork(&self) -> &ArtworkResolver<S> {
        &self.artwork
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Poll the player once.
    ///
    /// Without `force`, a snapshot equal to the previous one returns
    /// `Unchanged` and skips the art lookup.
    pub async fn refresh(&mut self, force: bool) -> RefreshOutcome {
        debug!("Refreshing player state (force={})", force);

        let output = self.transport.send(&PlayerCommand::Show).await;

        if has_no_player(&output) {
            if self.view != PlayerView::NoPlayer {
                info!("No media player found");
            }
            self.enter_idle(PlayerView::NoPlayer);
            return RefreshOutcome::NoPlayer;
        }

        let details = parse_track_details(&output);

        if details.is_empty_media() {
            self.enter_idle(PlayerView::NoMedia);
            return RefreshOutcome::NoMedia;
        }

        if !force && self.view.track() == Some(&details) {
            return RefreshOutcome::Unchanged;
        }

        self.modes = parse_player_modes(&output);
        self.clock.resync(
            details.position_ms.unwrap_or(0),
            details.duration_ms.unwrap_or(0),
            details.is_playing(),
            Instant::now(),
        );

        let art = self
            .artwork
            .resolve(details.title_or_unknown(), details.artist_or_unknown())
            .await;
        match &art {
            ArtUpdate::Cached(url) | ArtUpdate::Fetched(url) => self.art_url = Some(url.clone()),
            ArtUpdate::Fallback => self.art_url = None,
            ArtUpdate::Keep => {}
        }

        if self.view.track().map(|t| (&t.title, &t.artist)) != Some((&details.title, &details.artist)) {
            info!(
                "Now playing: {} - {}",
                details.title_or_unknown(),
                details.artist_or_unknown()
            );
        }
        self.view = PlayerView::HasMedia(details);

        RefreshOutcome::Updated { art }
    }

    /// Advance the local position. True when the track just reached its end
    /// and a forced refresh is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.view == PlayerView::NoPlayer {
            return false;
        }
        self.clock.advance(now)
    }

    pub async fn play_pause(&mut self) -> Result<()> {
        self.ensure_player()?;

        let playing = self.clock.is_playing();
        let command = if playing {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Play
        };
        self.transport.send(&command).await;
        self.clock.set_playing(!playing, Instant::now());

        Ok(())
    }

    pub async fn next(&mut self) -> Result<()> {
        self.ensure_player()?;
        self.transport.send(&PlayerCommand::Next).await;
        Ok(())
    }

    pub async fn previous(&mut self) -> Result<()> {
        self.ensure_player()?;
        self.transport.send(&PlayerCommand::Previous).await;
        Ok(())
    }

    pub async fn toggle_shuffle(&mut self) -> Result<bool> {
        self.ensure_player()?;

        self.modes.shuffle = !self.modes.shuffle;
        self.transport
            .send(&PlayerCommand::Shuffle(self.modes.shuffle))
            .await;

        Ok(self.modes.shuffle)
    }

    pub async fn cycle_repeat(&mut self) -> Result<RepeatMode> {
        self.ensure_player()?;

        self.modes.repeat = self.modes.repeat.next();
        self.transport
            .send(&PlayerCommand::Repeat(self.modes.repeat))
            .await;

        Ok(self.modes.repeat)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            state: self.view.state_name(),
            playing: self.clock.is_playing(),
            track: self.view.track().cloned(),
            modes: self.modes,
            position_ms: self.clock.position_ms(),
            duration_ms: self.clock.duration_ms(),
            art_url: self.art_url.clone(),
        }
    }

    fn ensure_player(&self) -> Result<()> {
        if self.view == PlayerView::NoPlayer {
            return Err(AppError::NoPlayer);
        }
        Ok(())
    }

    fn enter_idle(&mut self, view: PlayerView) {
        self.view = view;
        self.clock.stop(Instant::now());
        self.art_url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::resolver::tests::MockArtwork;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays canned outputs and records every command sent.
    #[derive(Default)]
    struct ScriptedTransport {
        outputs: RefCell<VecDeque<String>>,
        sent: RefCell<Vec<PlayerCommand>>,
    }

    impl ScriptedTransport {
        fn new(outputs: &[&str]) -> Self {
            Self {
                outputs: RefCell::new(outputs.iter().map(|s| s.to_string()).collect()),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn push(&self, output: &str) {
            self.outputs.borrow_mut().push_back(output.to_string());
        }

        fn sent(&self) -> Vec<PlayerCommand> {
            self.sent.borrow().clone()
        }
    }

    impl PlayerTransport for ScriptedTransport {
        async fn send(&self, command: &PlayerCommand) -> String {
            self.sent.borrow_mut().push(*command);
            if *command == PlayerCommand::Show {
                self.outputs.borrow_mut().pop_front().unwrap_or_default()
            } else {
                String::new()
            }
        }
    }

    const PLAYING: &str = "\
\tRepeat: alltracks
\tShuffle: off
\tStatus: playing
\tPosition: 0x00002710 (10000)
\tTrack.Title: Foo
\tTrack.Artist: Bar
\tTrack.Duration: 0x0002bf20 (180000)
";

    const OTHER_TRACK: &str = "\
\tStatus: playing
\tTrack.Title: Baz
\tTrack.Artist: Qux
\tTrack.Duration: 0x0002bf20 (180000)
";

    const NO_PLAYER: &str = "[bluetooth]# No default player available\n";

    const NOT_PROVIDED: &str = "\
\tStatus: stopped
\tTrack.Title: Not Provided
\tTrack.Artist: Not Provided
";

    fn controller(
        outputs: &[&str],
    ) -> PlayerController<ScriptedTransport, MockArtwork> {
        PlayerController::new(
            ScriptedTransport::new(outputs),
            ArtworkResolver::new(MockArtwork::with_art("Foo", "Bar", "https://art/foo")),
        )
    }

    #[tokio::test]
    async fn test_first_poll_updates_view_and_fetches_art() {
        let mut controller = controller(&[PLAYING]);

        let outcome = controller.refresh(false).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                art: ArtUpdate::Fetched("https://art/foo".to_string())
            }
        );
        assert_eq!(controller.view().state_name(), "has-media");
        assert_eq!(controller.art_url(), Some("https://art/foo"));
        assert_eq!(controller.modes().repeat, RepeatMode::AllTracks);
        assert!(!controller.modes().shuffle);
        assert_eq!(controller.clock().position_ms(), 10_000);
        assert_eq!(controller.clock().duration_ms(), 180_000);
        assert!(controller.clock().is_playing());
    }

    #[tokio::test]
    async fn test_identical_snapshot_is_unchanged() {
        let mut controller = controller(&[PLAYING, PLAYING]);

        controller.refresh(false).await;
        let outcome = controller.refresh(false).await;

        assert_eq!(outcome, RefreshOutcome::Unchanged);
        assert_eq!(controller.artwork().source().searches.get(), 1);
    }

    #[tokio::test]
    async fn test_forced_refresh_rebuilds_from_cache() {
        let mut controller = controller(&[PLAYING, PLAYING]);

        controller.refresh(false).await;
        let outcome = controller.refresh(true).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                art: ArtUpdate::Cached("https://art/foo".to_string())
            }
        );
        assert_eq!(controller.artwork().source().searches.get(), 1);
    }

    #[tokio::test]
    async fn test_track_without_art_never_shows_previous_art() {
        let mut controller = controller(&[PLAYING, OTHER_TRACK, PLAYING, OTHER_TRACK]);

        controller.refresh(false).await;
        assert_eq!(controller.art_url(), Some("https://art/foo"));
        controller.refresh(false).await;
        assert!(controller.art_url().is_none());
        controller.refresh(false).await;
        assert_eq!(controller.art_url(), Some("https://art/foo"));

        let outcome = controller.refresh(false).await;

        assert_eq!(outcome, RefreshOutcome::Updated { art: ArtUpdate::Fallback });
        assert!(controller.art_url().is_none());
    }

    #[tokio::test]
    async fn test_no_player_state_blocks_actions() {
        let mut controller = controller(&[NO_PLAYER]);

        assert_eq!(controller.refresh(false).await, RefreshOutcome::NoPlayer);
        assert!(matches!(controller.next().await, Err(AppError::NoPlayer)));
        assert!(matches!(controller.play_pause().await, Err(AppError::NoPlayer)));
        assert!(matches!(controller.toggle_shuffle().await, Err(AppError::NoPlayer)));
        assert!(matches!(controller.cycle_repeat().await, Err(AppError::NoPlayer)));

        // Only the poll reached the transport.
        assert_eq!(controller.transport().sent(), vec![PlayerCommand::Show]);
    }

    #[tokio::test]
    async fn test_no_media_state() {
        let mut controller = controller(&[PLAYING, NOT_PROVIDED, ""]);

        controller.refresh(false).await;
        assert_eq!(controller.refresh(false).await, RefreshOutcome::NoMedia);
        assert_eq!(controller.view(), &PlayerView::NoMedia);
        assert!(controller.art_url().is_none());
        assert_eq!(controller.clock().position_ms(), 0);

        // An empty transport reply reads as no data.
        assert_eq!(controller.refresh(false).await, RefreshOutcome::NoMedia);

        // Actions are still allowed with a player but no media.
        assert!(controller.play_pause().await.is_ok());
    }

    #[tokio::test]
    async fn test_returning_player_rebuilds_same_track() {
        let mut controller = controller(&[PLAYING, NO_PLAYER, PLAYING]);

        controller.refresh(false).await;
        controller.refresh(false).await;
        let outcome = controller.refresh(false).await;

        assert!(matches!(outcome, RefreshOutcome::Updated { .. }));
    }

    #[tokio::test]
    async fn test_play_pause_toggles_command() {
        let mut controller = controller(&[PLAYING]);
        controller.refresh(false).await;

        controller.play_pause().await.unwrap();
        assert!(!controller.clock().is_playing());
        controller.play_pause().await.unwrap();
        assert!(controller.clock().is_playing());

        assert_eq!(
            controller.transport().sent(),
            vec![PlayerCommand::Show, PlayerCommand::Pause, PlayerCommand::Play]
        );
    }

    #[tokio::test]
    async fn test_shuffle_and_repeat_actions() {
        let mut controller = controller(&[PLAYING]);
        controller.refresh(false).await;

        assert!(controller.toggle_shuffle().await.unwrap());
        assert_eq!(controller.cycle_repeat().await.unwrap(), RepeatMode::SingleTrack);
        assert_eq!(controller.cycle_repeat().await.unwrap(), RepeatMode::Off);
        controller.next().await.unwrap();
        controller.previous().await.unwrap();

        assert_eq!(
            controller.transport().sent(),
            vec![
                PlayerCommand::Show,
                PlayerCommand::Shuffle(true),
                PlayerCommand::Repeat(RepeatMode::SingleTrack),
                PlayerCommand::Repeat(RepeatMode::Off),
                PlayerCommand::Next,
                PlayerCommand::Previous,
            ]
        );
    }

    #[tokio::test]
    async fn test_tick_signals_track_end_once() {
        let mut controller = controller(&[PLAYING]);
        controller.refresh(false).await;

        let later = Instant::now() + Duration::from_secs(600);
        assert!(controller.tick(later));
        assert!(!controller.tick(later + Duration::from_secs(1)));
        assert_eq!(controller.clock().position_ms(), 180_000);

        // A poll with a new position re-arms the end signal.
        controller.transport().push(PLAYING);
        controller.refresh(true).await;
        assert!(controller.tick(Instant::now() + Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_status_report() {
        let mut controller = controller(&[PLAYING]);
        controller.refresh(false).await;

        let status = controller.status();
        assert_eq!(status.state, "has-media");
        assert!(status.playing);
        assert_eq!(status.track.as_ref().and_then(|t| t.title.as_deref()), Some("Foo"));
        assert_eq!(status.art_url.as_deref(), Some("https://art/foo"));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["modes"]["repeat"], "alltracks");
        assert_eq!(json["duration_ms"], 180_000);
    }
}
