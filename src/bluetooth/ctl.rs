use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::bluetooth::models::PlayerCommand;
use crate::error::{AppError, Result};

/// Stderr noise bluetoothctl prints on hosts without an adapter.
const BENIGN_STDERR: &str = "No default controller available";

pub const MINIMUM_BLUEZ: BluezVersion = BluezVersion { major: 5, minor: 70 };

/// Anything that can deliver a player command and hand back the menu output.
#[allow(async_fn_in_trait)]
pub trait PlayerTransport {
    /// Returns the raw output, or an empty string when nothing could be read.
    async fn send(&self, command: &PlayerCommand) -> String;
}

/// One-shot `bluetoothctl` invocations scripted through stdin.
#[derive(Debug, Clone)]
pub struct Bluetoothctl {
    program: String,
}

impl Bluetoothctl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn script(command: &PlayerCommand) -> String {
        format!("menu player\n{}\nshow", command)
    }

    pub async fn try_send(&self, command: &PlayerCommand) -> Result<String> {
        debug!("Sending bluetoothctl command: {}", command);

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Bluetooth("stdin was not captured".into()))?;
        stdin.write_all(Self::script(command).as_bytes()).await?;
        // Closing stdin lets bluetoothctl exit after the script.
        drop(stdin);

        let output = child.wait_with_output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() && !stderr.contains(BENIGN_STDERR) {
            warn!("bluetoothctl error: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub async fn version(&self) -> Result<Option<BluezVersion>> {
        let output = Command::new(&self.program).arg("--version").output().await?;

        if !output.status.success() {
            return Err(AppError::Bluetooth(format!(
                "`{} --version` exited with {}",
                self.program, output.status
            )));
        }

        Ok(BluezVersion::parse(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Logs a warning when bluez is older than the player menu needs.
    pub async fn check_bluez_version(&self) {
        match self.version().await {
            Ok(Some(version)) if version >= MINIMUM_BLUEZ => {
                debug!("Found bluez {}", version);
            }
            Ok(Some(version)) => {
                warn!(
                    "This application requires bluez {} or higher, found {}. Some features may not work correctly.",
                    MINIMUM_BLUEZ, version
                );
            }
            Ok(None) | Err(_) => {
                warn!(
                    "Could not determine the bluez version. Please ensure bluez {} or higher is installed.",
                    MINIMUM_BLUEZ
                );
            }
        }
    }
}

impl Default for Bluetoothctl {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BLUETOOTHCTL)
    }
}

impl PlayerTransport for Bluetoothctl {
    async fn send(&self, command: &PlayerCommand) -> String {
        match self.try_send(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Error interacting with bluetoothctl: {}", e);
                String::new()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BluezVersion {
    pub major: u32,
    pub minor: u32,
}

impl BluezVersion {
    /// Parses `bluetoothctl --version` output such as `bluetoothctl: 5.72`.
    pub fn parse(output: &str) -> Option<Self> {
        let version = output.split_whitespace().last()?;
        let mut parts = version.split('.');
        let major: u32 = parts.next()?.parse().ok()?;
        let minor: u32 = match parts.next() {
            Some(minor) => minor.parse().ok()?,
            None => 0,
        };

        Some(Self { major, minor })
    }
}

impl std::fmt::Display for BluezVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::models::RepeatMode;

    #[test]
    fn test_script_wraps_command_in_player_menu() {
        assert_eq!(
            Bluetoothctl::script(&PlayerCommand::Next),
            "menu player\nnext\nshow"
        );
        assert_eq!(
            Bluetoothctl::script(&PlayerCommand::Repeat(RepeatMode::AllTracks)),
            "menu player\nrepeat alltracks\nshow"
        );
    }

    #[test]
    fn test_parse_bluez_version() {
        assert_eq!(
            BluezVersion::parse("bluetoothctl: 5.72\n"),
            Some(BluezVersion { major: 5, minor: 72 })
        );
        assert_eq!(
            BluezVersion::parse("5.64"),
            Some(BluezVersion { major: 5, minor: 64 })
        );
        assert_eq!(BluezVersion::parse("6"), Some(BluezVersion { major: 6, minor: 0 }));
        assert_eq!(BluezVersion::parse(""), None);
        assert_eq!(BluezVersion::parse("bluetoothctl: unknown"), None);
    }

    #[test]
    fn test_minimum_version_ordering() {
        assert!(BluezVersion { major: 5, minor: 70 } >= MINIMUM_BLUEZ);
        assert!(BluezVersion { major: 6, minor: 1 } >= MINIMUM_BLUEZ);
        assert!(BluezVersion { major: 5, minor: 69 } < MINIMUM_BLUEZ);
        assert!(BluezVersion { major: 4, minor: 101 } < MINIMUM_BLUEZ);
    }

    #[tokio::test]
    async fn test_missing_program_yields_empty_output() {
        let ctl = Bluetoothctl::new("bluedia-test-no-such-program");

        assert!(ctl.try_send(&PlayerCommand::Show).await.is_err());
        assert_eq!(ctl.send(&PlayerCommand::Show).await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_is_written_to_stdin() {
        // `cat` echoes the script back on stdout.
        let ctl = Bluetoothctl::new("cat");
        let output = ctl.send(&PlayerCommand::Pause).await;

        assert_eq!(output, "menu player\npause\nshow");
    }
}
