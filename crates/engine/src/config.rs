//! Engine pacing configuration
//!
//! Timings only pace the presentation; cascade results never depend on them.

use std::time::Duration;

use tile_cascade_core::types::{
    ARRIVAL_TIMEOUT_MS, CASCADE_PAUSE_MS, DEADLOCK_PAUSE_MS, FALL_MS_PER_CELL, FILL_DROP_ROWS,
    FILL_MOVE_MS, SWAP_SETTLE_MS, TICK_MS,
};

/// Delays and animation hints used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after issuing a swap or a revert
    pub swap_settle: Duration,
    /// Pause between cascade phases
    pub cascade_pause: Duration,
    /// Pause before and after a deadlock reshuffle
    pub deadlock_pause: Duration,
    pub fall_per_cell: Duration,
    pub fill_move: Duration,
    pub fill_drop_rows: i32,
    /// Arrival polling interval
    pub tick: Duration,
    /// Stop waiting for pieces that never report arrival
    pub arrival_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            swap_settle: Duration::from_millis(SWAP_SETTLE_MS),
            cascade_pause: Duration::from_millis(CASCADE_PAUSE_MS),
            deadlock_pause: Duration::from_millis(DEADLOCK_PAUSE_MS),
            fall_per_cell: Duration::from_millis(FALL_MS_PER_CELL),
            fill_move: Duration::from_millis(FILL_MOVE_MS),
            fill_drop_rows: FILL_DROP_ROWS,
            tick: Duration::from_millis(TICK_MS),
            arrival_timeout: Duration::from_millis(ARRIVAL_TIMEOUT_MS),
        }
    }
}

impl Timing {
    /// No pacing at all, for headless play
    pub fn instant() -> Self {
        Self {
            swap_settle: Duration::ZERO,
            cascade_pause: Duration::ZERO,
            deadlock_pause: Duration::ZERO,
            fall_per_cell: Duration::ZERO,
            fill_move: Duration::ZERO,
            tick: Duration::from_millis(1),
            ..Self::default()
        }
    }

    /// Defaults overridden by `CASCADE_*_MS` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let ms = |name: &str, default: Duration| {
            env::var(name)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let defaults = Self::default();
        Self {
            swap_settle: ms("CASCADE_SWAP_MS", defaults.swap_settle),
            cascade_pause: ms("CASCADE_PAUSE_MS", defaults.cascade_pause),
            fall_per_cell: ms("CASCADE_FALL_MS", defaults.fall_per_cell),
            tick: ms("CASCADE_TICK_MS", defaults.tick),
            ..defaults
        }
    }

    /// Fall animation length for a drop of `cells`
    pub fn fall_duration(&self, cells: u32) -> Duration {
        self.fall_per_cell * cells
    }

    /// Polling interval, never zero
    pub fn poll_interval(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_constants() {
        let timing = Timing::default();
        assert_eq!(timing.swap_settle, Duration::from_millis(500));
        assert_eq!(timing.cascade_pause, Duration::from_millis(100));
        assert_eq!(timing.fall_duration(3), Duration::from_millis(300));
    }

    #[test]
    fn test_instant_timing_still_polls() {
        let timing = Timing::instant();
        assert_eq!(timing.fall_duration(5), Duration::ZERO);
        assert!(timing.poll_interval() > Duration::ZERO);
    }

    #[test]
    fn test_timing_from_env() {
        // This test just ensures it doesn't panic
        let _timing = Timing::from_env();
    }
}
