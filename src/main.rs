use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bluedia::display;
use bluedia::watch::{self, Action, WatchOptions, FORCED_REFRESH_DELAY};
use bluedia::{
    AppError, ArtUpdate, ArtworkResolver, Bluetoothctl, Config, PlayerController, SpotifyArtwork,
};

#[derive(Parser)]
#[command(name = "bluedia")]
#[command(about = "Control Bluetooth media playback, with album art from Spotify")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to bluetoothctl (or set BLUEDIA_BLUETOOTHCTL env var)
    #[arg(long, global = true, env = "BLUEDIA_BLUETOOTHCTL")]
    bluetoothctl: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow playback live and control it from the keyboard
    Watch,

    /// Print what is playing right now
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle between play and pause
    PlayPause,

    /// Skip to the next track
    Next,

    /// Go back to the previous track
    Previous,

    /// Toggle shuffle
    Shuffle,

    /// Cycle repeat: off, all tracks, single track
    Repeat,

    /// Look up album art for a track
    Art {
        /// Track title
        #[arg(long)]
        title: String,

        /// Track artist
        #[arg(long)]
        artist: String,
    },

    /// Show setup guide
    Setup,
}

type Controller = PlayerController<Bluetoothctl, SpotifyArtwork>;

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Setup => show_setup_guide(),
        Commands::Watch => watch_player(&load_config(cli.bluetoothctl)?).await?,
        Commands::Status { json } => show_status(&load_config(cli.bluetoothctl)?, json).await?,
        Commands::PlayPause => run_action(&load_config(cli.bluetoothctl)?, Action::PlayPause).await?,
        Commands::Next => run_action(&load_config(cli.bluetoothctl)?, Action::Next).await?,
        Commands::Previous => run_action(&load_config(cli.bluetoothctl)?, Action::Previous).await?,
        Commands::Shuffle => run_action(&load_config(cli.bluetoothctl)?, Action::Shuffle).await?,
        Commands::Repeat => run_action(&load_config(cli.bluetoothctl)?, Action::Repeat).await?,
        Commands::Art { title, artist } => {
            show_art(&load_config(cli.bluetoothctl)?, &title, &artist).await?
        }
    }

    Ok(())
}

fn load_config(bluetoothctl: Option<String>) -> Result<Config> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(program) = bluetoothctl {
        config.bluetoothctl = program;
    }
    Ok(config)
}

fn build_controller(config: &Config) -> Controller {
    PlayerController::new(
        Bluetoothctl::new(&config.bluetoothctl),
        ArtworkResolver::new(SpotifyArtwork::new(config)),
    )
}

fn warn_missing_spotify_config(config: &Config) {
    let missing = config.missing_spotify_config();
    if !missing.is_empty() {
        println!(
            "{} {}",
            "Album art limited to a saved token, missing:".yellow(),
            missing.join(", ")
        );
    }
}

async fn watch_player(config: &Config) -> Result<()> {
    println!("{}", "Bluedia".cyan().bold());
    println!("{}", "=".repeat(50));

    Bluetoothctl::new(&config.bluetoothctl)
        .check_bluez_version()
        .await;
    warn_missing_spotify_config(config);

    let mut controller = build_controller(config);
    let options = WatchOptions {
        poll_interval: config.poll_interval,
        fallback_art_url: config.fallback_art_url.clone(),
    };

    watch::run(&mut controller, &options)
        .await
        .context("Watch loop failed")?;

    Ok(())
}

async fn show_status(config: &Config, json: bool) -> Result<()> {
    let mut controller = build_controller(config);
    controller.refresh(true).await;

    if json {
        let report = serde_json::to_string_pretty(&controller.status())
            .context("Failed to serialize status")?;
        println!("{}", report);
    } else {
        print_view(&controller, config);
    }

    Ok(())
}

async fn run_action(config: &Config, action: Action) -> Result<()> {
    let mut controller = build_controller(config);
    controller.refresh(true).await;

    match watch::apply_action(&mut controller, action).await {
        Ok(message) => println!("{}", message.green()),
        Err(e @ AppError::NoPlayer) => {
            println!("{}", e.to_string().yellow());
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to control the player"),
    }

    // Give the device a moment before reading back its state.
    tokio::time::sleep(FORCED_REFRESH_DELAY).await;
    controller.refresh(true).await;
    print_view(&controller, config);

    Ok(())
}

async fn show_art(config: &Config, title: &str, artist: &str) -> Result<()> {
    warn_missing_spotify_config(config);

    let mut resolver = ArtworkResolver::new(SpotifyArtwork::new(config));

    match resolver.resolve(title, artist).await {
        ArtUpdate::Cached(url) | ArtUpdate::Fetched(url) => println!("{}", url),
        ArtUpdate::Fallback | ArtUpdate::Keep => {
            println!("{}", "No album art found".yellow());
            println!("{}", config.fallback_art_url.dimmed());
        }
    }

    Ok(())
}

fn print_view(controller: &Controller, config: &Config) {
    println!(
        "{}",
        display::render_view(
            controller.view(),
            controller.modes(),
            controller.art_url(),
            &config.fallback_art_url,
        )
    );

    let clock = controller.clock();
    if clock.duration_ms() > 0 {
        println!(
            "{} ({:.0}%)",
            display::render_position(clock),
            clock.progress_percent()
        );
    }
}

fn show_setup_guide() {
    println!("{}", "Bluedia Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Bluetooth".yellow());
    println!("   - Install bluez 5.70 or newer (bluetoothctl --version)");
    println!("   - Pair and connect your phone or player");
    println!("   - Check that `bluetoothctl` then `menu player` then `show` lists a player");

    println!("\n{}", "2. Spotify API Setup (for album art)".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("   - Optional:");
    println!("     BLUEDIA_TOKEN_FILE=spotify_token.json");
    println!("     BLUEDIA_BLUETOOTHCTL=bluetoothctl");
    println!("     BLUEDIA_POLL_INTERVAL_SECS=2");
    println!("     BLUEDIA_FALLBACK_ART_URL=https://...");

    println!("\n{}", "4. Usage".yellow());
    println!("   - bluedia watch                 (live view, keys p/n/b/s/r/f/q)");
    println!("   - bluedia status --json         (current state as JSON)");
    println!("   - bluedia play-pause | next | previous | shuffle | repeat");
    println!("   - bluedia art --title T --artist A");

    println!("\n{}", "Ready to play!".green());
}
