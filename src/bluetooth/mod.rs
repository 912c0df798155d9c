pub mod ctl;
pub mod models;
pub mod parser;

pub use ctl::{Bluetoothctl, BluezVersion, PlayerTransport};
pub use models::{PlayerCommand, PlayerModes, RepeatMode, TrackDetails};
pub use parser::{has_no_player, parse_player_modes, parse_track_details};
