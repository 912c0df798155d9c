use std::io::BufRead;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use indicatif::ProgressBar;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::artwork::ArtworkSource;
use crate::bluetooth::{PlayerTransport, RepeatMode};
use crate::display;
use crate::error::{AppError, Result};
use crate::player::{PlayerController, RefreshOutcome};

pub const POSITION_TICK: Duration = Duration::from_secs(1);
pub const RENDER_TICK: Duration = Duration::from_millis(500);
/// Delay before the forced refresh that follows an action or a track end.
pub const FORCED_REFRESH_DELAY: Duration = Duration::from_secs(1);

const KEY_HELP: &str = "keys: p play/pause, n next, b previous, s shuffle, r repeat, f refresh, q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PlayPause,
    Next,
    Previous,
    Shuffle,
    Repeat,
    Refresh,
    Quit,
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "p" | "play" | "pause" | "play-pause" => Ok(Action::PlayPause),
            "n" | "next" => Ok(Action::Next),
            "b" | "prev" | "previous" => Ok(Action::Previous),
            "s" | "shuffle" => Ok(Action::Shuffle),
            "r" | "repeat" => Ok(Action::Repeat),
            "f" | "refresh" => Ok(Action::Refresh),
            "q" | "quit" | "exit" => Ok(Action::Quit),
            other => Err(AppError::Config(format!("Unknown command: {}", other))),
        }
    }
}

/// Run a user action against the player and describe what happened.
pub async fn apply_action<T, S>(controller: &mut PlayerController<T, S>, action: Action) -> Result<String>
where
    T: PlayerTransport,
    S: ArtworkSource,
{
    match action {
        Action::PlayPause => {
            controller.play_pause().await?;
            Ok(if controller.clock().is_playing() {
                "Playing".to_string()
            } else {
                "Paused".to_string()
            })
        }
        Action::Next => {
            controller.next().await?;
            Ok("Next track".to_string())
        }
        Action::Previous => {
            controller.previous().await?;
            Ok("Previous track".to_string())
        }
        Action::Shuffle => {
            let on = controller.toggle_shuffle().await?;
            Ok(format!("Shuffle {}", if on { "on" } else { "off" }))
        }
        Action::Repeat => {
            let mode = controller.cycle_repeat().await?;
            Ok(match mode {
                RepeatMode::Off => "Repeat off".to_string(),
                RepeatMode::AllTracks => "Repeat all tracks".to_string(),
                RepeatMode::SingleTrack => "Repeat single track".to_string(),
            })
        }
        Action::Refresh => Ok("Refreshing".to_string()),
        Action::Quit => Ok(String::new()),
    }
}

pub struct WatchOptions {
    pub poll_interval: Duration,
    pub fallback_art_url: String,
}

/// Live view: polls the player, extrapolates the position between polls and
/// reads single-letter commands from stdin until `q` or Ctrl-C.
pub async fn run<T, S>(controller: &mut PlayerController<T, S>, options: &WatchOptions) -> Result<()>
where
    T: PlayerTransport,
    S: ArtworkSource,
{
    run_with_input(controller, options, spawn_stdin_reader()).await
}

/// Reads stdin lines on a plain thread. A blocking read there cannot hold up
/// runtime shutdown once the loop has quit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

pub async fn run_with_input<T, S>(
    controller: &mut PlayerController<T, S>,
    options: &WatchOptions,
    mut input: mpsc::UnboundedReceiver<String>,
) -> Result<()>
where
    T: PlayerTransport,
    S: ArtworkSource,
{
    let pb = display::progress_bar();
    let mut screen = Screen::new(pb.clone(), options.fallback_art_url.clone());

    screen.note(KEY_HELP.dimmed().to_string());

    let outcome = controller.refresh(true).await;
    screen.show(controller, &outcome);

    let start = Instant::now();
    let mut poll = interval_at(start + options.poll_interval, options.poll_interval);
    let mut position = interval_at(start + POSITION_TICK, POSITION_TICK);
    let mut render = interval_at(start, RENDER_TICK);
    for timer in [&mut poll, &mut position, &mut render] {
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let delayed_refresh = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(delayed_refresh);
    let mut refresh_pending = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut input_open = true;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("Interrupted");
                break;
            }
            _ = poll.tick() => {
                let outcome = controller.refresh(false).await;
                screen.show(controller, &outcome);
            }
            _ = position.tick() => {
                if controller.tick(std::time::Instant::now()) {
                    debug!("Track reached its end, scheduling refresh");
                    delayed_refresh.as_mut().reset(Instant::now() + FORCED_REFRESH_DELAY);
                    refresh_pending = true;
                }
            }
            _ = render.tick() => {
                display::update_progress_bar(&pb, controller.view(), controller.clock());
            }
            _ = &mut delayed_refresh, if refresh_pending => {
                refresh_pending = false;
                let outcome = controller.refresh(true).await;
                screen.show(controller, &outcome);
            }
            line = input.recv(), if input_open => {
                let Some(line) = line else {
                    input_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let action = match line.parse::<Action>() {
                    Ok(action) => action,
                    Err(e) => {
                        screen.note(format!("{} ({})", e, KEY_HELP).yellow().to_string());
                        continue;
                    }
                };
                if action == Action::Quit {
                    break;
                }

                match apply_action(controller, action).await {
                    Ok(message) => screen.note(message.green().to_string()),
                    Err(e @ AppError::NoPlayer) => {
                        screen.note(e.to_string().yellow().to_string());
                        continue;
                    }
                    Err(e) => {
                        warn!("Action failed: {}", e);
                        continue;
                    }
                }
                // A newer action replaces any pending refresh.
                delayed_refresh.as_mut().reset(Instant::now() + FORCED_REFRESH_DELAY);
                refresh_pending = true;
            }
        }
    }

    pb.finish_and_clear();
    Ok(())
}

/// Prints view changes above the progress bar.
struct Screen {
    pb: ProgressBar,
    fallback_art_url: String,
    last_rendered: Option<String>,
}

impl Screen {
    fn new(pb: ProgressBar, fallback_art_url: String) -> Self {
        Self {
            pb,
            fallback_art_url,
            last_rendered: None,
        }
    }

    fn show<T, S>(&mut self, controller: &PlayerController<T, S>, outcome: &RefreshOutcome)
    where
        T: PlayerTransport,
        S: ArtworkSource,
    {
        if *outcome == RefreshOutcome::Unchanged {
            return;
        }

        let rendered = display::render_view(
            controller.view(),
            controller.modes(),
            controller.art_url(),
            &self.fallback_art_url,
        );
        if self.last_rendered.as_deref() == Some(rendered.as_str()) {
            return;
        }

        self.pb.suspend(|| println!("\n{}", rendered));
        self.last_rendered = Some(rendered);
        display::update_progress_bar(&self.pb, controller.view(), controller.clock());
    }

    fn note(&self, message: String) {
        self.pb.suspend(|| println!("{}", message));
    }
}
