//! # Frame pacing.
//!
//! [`FramePacer`] turns a target iteration rate into a fixed per-iteration
//! time budget and computes the advisory sleep remainder for each
//! iteration. Pacing is advisory, not a hard deadline: an iteration that
//! overruns its budget simply gets no sleep, and the loop never runs extra
//! engine steps to catch up.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use stepvisor::FramePacer;
//!
//! let pacer = FramePacer::new(50); // 20ms per iteration
//!
//! // 5ms of work leaves 15ms of budget to sleep away.
//! assert_eq!(
//!     pacer.remaining(Duration::from_millis(5)),
//!     Some(Duration::from_millis(15)),
//! );
//!
//! // An overrun iteration gets no sleep.
//! assert_eq!(pacer.remaining(Duration::from_millis(25)), None);
//! ```

use std::time::Duration;

/// Advisory pacing for the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    frame: Duration,
}

impl FramePacer {
    /// Creates a pacer for the given target iterations per second.
    ///
    /// `target_rate == 0` disables pacing: [`FramePacer::remaining`] always
    /// returns `None` and the loop runs flat out.
    pub fn new(target_rate: u32) -> Self {
        let frame = match target_rate {
            0 => Duration::ZERO,
            rate => Duration::from_secs(1) / rate,
        };
        Self { frame }
    }

    /// The fixed per-iteration budget (zero when pacing is disabled).
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Budget left after an iteration that took `elapsed`.
    ///
    /// `None` means no sleep: either the iteration overran its budget or
    /// pacing is disabled.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        if elapsed < self.frame {
            Some(self.frame - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_budget_from_rate() {
        assert_eq!(FramePacer::new(50).frame(), Duration::from_millis(20));
        assert_eq!(FramePacer::new(1).frame(), Duration::from_secs(1));
        // 1s / 60 ≈ 16.667ms
        let frame = FramePacer::new(60).frame();
        assert!(frame > Duration::from_millis(16) && frame < Duration::from_millis(17));
    }

    #[test]
    fn test_remaining_under_budget() {
        let pacer = FramePacer::new(50);
        assert_eq!(
            pacer.remaining(Duration::from_millis(12)),
            Some(Duration::from_millis(8))
        );
    }

    #[test]
    fn test_no_sleep_on_overrun() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.remaining(Duration::from_millis(20)), None);
        assert_eq!(pacer.remaining(Duration::from_millis(500)), None);
    }

    #[test]
    fn test_zero_rate_disables_pacing() {
        let pacer = FramePacer::new(0);
        assert_eq!(pacer.frame(), Duration::ZERO);
        assert_eq!(pacer.remaining(Duration::ZERO), None);
        assert_eq!(pacer.remaining(Duration::from_millis(3)), None);
    }
}
