pub mod clock;
pub mod controller;
pub mod view;

pub use clock::PlaybackClock;
pub use controller::{PlayerController, RefreshOutcome};
pub use view::{PlayerView, StatusReport};
