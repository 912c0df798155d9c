use std::time::Instant;

/// Extrapolates the playback position between polls from the local clock.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    reported_ms: u64,
    duration_ms: u64,
    synced_at: Instant,
    position_ms: u64,
    playing: bool,
    end_signalled: bool,
}

impl PlaybackClock {
    pub fn new(now: Instant) -> Self {
        Self {
            reported_ms: 0,
            duration_ms: 0,
            synced_at: now,
            position_ms: 0,
            playing: false,
            end_signalled: false,
        }
    }

    /// Adopt a freshly polled position. Clears the track-end flag.
    pub fn resync(&mut self, position_ms: u64, duration_ms: u64, playing: bool, now: Instant) {
        self.reported_ms = position_ms;
        self.duration_ms = duration_ms;
        self.synced_at = now;
        self.position_ms = clamp(position_ms, duration_ms);
        self.playing = playing;
        self.end_signalled = false;
    }

    pub fn stop(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Flip play/pause locally, keeping the current position as the new base.
    pub fn set_playing(&mut self, playing: bool, now: Instant) {
        self.reported_ms = self.position_ms;
        self.synced_at = now;
        self.playing = playing;
    }

    /// Move the position forward to `now`.
    ///
    /// Returns true exactly once per resync, on the tick where the position
    /// reaches the track duration.
    pub fn advance(&mut self, now: Instant) -> bool {
        if !self.playing || self.duration_ms == 0 {
            return false;
        }

        let elapsed_ms = now.saturating_duration_since(self.synced_at).as_millis() as u64;
        self.position_ms = clamp(self.reported_ms.saturating_add(elapsed_ms), self.duration_ms);

        if self.position_ms >= self.duration_ms && !self.end_signalled {
            self.end_signalled = true;
            return true;
        }

        false
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64) * 100.0
    }
}

fn clamp(position_ms: u64, duration_ms: u64) -> u64 {
    if duration_ms == 0 {
        position_ms
    } else {
        position_ms.min(duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_advances_with_wall_clock() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(10_000, 180_000, true, t0);

        assert!(!clock.advance(t0 + Duration::from_millis(2_500)));
        assert_eq!(clock.position_ms(), 12_500);
    }

    #[test]
    fn test_never_exceeds_duration_and_signals_end_once() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(178_000, 180_000, true, t0);

        assert!(!clock.advance(t0 + Duration::from_secs(1)));
        assert!(clock.advance(t0 + Duration::from_secs(2)));
        assert_eq!(clock.position_ms(), 180_000);

        for secs in 3..10 {
            assert!(!clock.advance(t0 + Duration::from_secs(secs)));
            assert_eq!(clock.position_ms(), 180_000);
        }
    }

    #[test]
    fn test_resync_rearms_end_signal() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(0, 1_000, true, t0);
        assert!(clock.advance(t0 + Duration::from_secs(5)));

        let t1 = t0 + Duration::from_secs(6);
        clock.resync(0, 1_000, true, t1);
        assert!(clock.advance(t1 + Duration::from_secs(1)));
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(5_000, 180_000, false, t0);

        assert!(!clock.advance(t0 + Duration::from_secs(30)));
        assert_eq!(clock.position_ms(), 5_000);
    }

    #[test]
    fn test_unknown_duration_never_signals_end() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(5_000, 0, true, t0);

        assert!(!clock.advance(t0 + Duration::from_secs(30)));
        assert_eq!(clock.progress_percent(), 0.0);
    }

    #[test]
    fn test_set_playing_rebases_position() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(0, 180_000, true, t0);
        clock.advance(t0 + Duration::from_secs(10));

        let paused_at = t0 + Duration::from_secs(10);
        clock.set_playing(false, paused_at);
        clock.advance(paused_at + Duration::from_secs(60));
        assert_eq!(clock.position_ms(), 10_000);

        let resumed_at = paused_at + Duration::from_secs(60);
        clock.set_playing(true, resumed_at);
        clock.advance(resumed_at + Duration::from_secs(5));
        assert_eq!(clock.position_ms(), 15_000);
    }

    #[test]
    fn test_progress_percent() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(t0);
        clock.resync(45_000, 180_000, false, t0);

        assert!((clock.progress_percent() - 25.0).abs() < f64::EPSILON);
    }
}
