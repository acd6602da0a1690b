//! # Throughput telemetry.
//!
//! [`StepMeter`] counts completed steps over a rolling wall-clock window
//! and yields a floor-rounded steps-per-second rate each time the window
//! elapses. The meter is owned by the worker and its samples reach the
//! controller only through
//! [`RateUpdated`](crate::EventKind::RateUpdated) events.
//!
//! # Example
//! ```
//! use std::time::{Duration, Instant};
//! use stepvisor::StepMeter;
//!
//! let start = Instant::now();
//! let mut meter = StepMeter::new(Duration::from_millis(1000), start);
//!
//! for _ in 0..119 {
//!     assert_eq!(meter.record_step(start + Duration::from_millis(500)), None);
//! }
//! // 120th step lands as the window elapses: 120 steps / 2s = 60/s.
//! let rate = meter.record_step(start + Duration::from_millis(2000));
//! assert_eq!(rate, Some(60));
//! ```

use std::time::{Duration, Instant};

/// Rolling step counter deriving a steps-per-second rate.
#[derive(Debug, Clone, Copy)]
pub struct StepMeter {
    window: Duration,
    window_start: Instant,
    steps: u64,
}

impl StepMeter {
    /// Creates a meter whose first window starts at `now`.
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            steps: 0,
        }
    }

    /// Records one completed step at time `now`.
    ///
    /// Returns `Some(rate)` and resets the window when at least one full
    /// window has elapsed since the window start; the rate is
    /// `floor(steps * 1000 / elapsed_ms)`.
    pub fn record_step(&mut self, now: Instant) -> Option<u64> {
        self.steps += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let elapsed_ms = (elapsed.as_millis() as u64).max(1);
        let rate = self.steps.saturating_mul(1000) / elapsed_ms;
        self.window_start = now;
        self.steps = 0;
        Some(rate)
    }

    /// Steps counted in the current window so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
