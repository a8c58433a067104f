//=========================================================================
// Frame Clock
//=========================================================================
//
// Wall-clock delta time between ticks, in milliseconds.
//
// The scheduler takes `dt` as a plain number; this clock is how the
// engine produces it from real time. An optional upper clamp keeps a
// debugger pause or a minimized window from producing one huge step.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== FrameTime ===========================================================

/// Timing snapshot of one tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    /// Milliseconds since the previous tick (or since creation/reset).
    pub dt_ms: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Zero-based tick counter.
    pub frame_index: u64,
}

//=== FrameClock ==========================================================

/// Produces [`FrameTime`] snapshots from a monotonic clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    max_dt: Option<Duration>,
}

impl FrameClock {
    /// Creates an unclamped clock starting now.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            max_dt: None,
        }
    }

    /// Creates a clock whose deltas never exceed `max_dt`.
    pub fn with_max_delta(max_dt: Duration) -> Self {
        Self {
            max_dt: Some(max_dt),
            ..Self::new()
        }
    }

    pub fn max_delta(&self) -> Option<Duration> {
        self.max_dt
    }

    /// Resets the baseline, e.g. when resuming after a pause.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let mut dt = now.saturating_duration_since(self.last);
        if let Some(max) = self.max_dt {
            dt = dt.min(max);
        }
        self.last = now;

        let frame = FrameTime {
            dt_ms: dt.as_secs_f64() * 1000.0,
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
    }

    #[test]
    fn delta_is_non_negative_milliseconds() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        let frame = clock.tick();
        assert!(frame.dt_ms >= 5.0, "dt was {}", frame.dt_ms);
    }

    #[test]
    fn delta_respects_clamp() {
        let mut clock = FrameClock::with_max_delta(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));
        assert!(clock.tick().dt_ms <= 1.0);
    }
}
