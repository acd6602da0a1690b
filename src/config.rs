//! # Supervisor configuration.
//!
//! [`Config`] defines the supervisor's behavior: the per-iteration step
//! budget handed to the engine, the pacing target, the telemetry window,
//! the stop escalation bounds, and the event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use stepvisor::{Config, StepBudget};
//!
//! let mut cfg = Config::default();
//! cfg.step_budget = StepBudget(50_000);
//! cfg.target_rate = 30;
//! cfg.grace = Duration::from_secs(2);
//!
//! assert_eq!(cfg.target_rate, 30);
//! ```

use std::time::Duration;

use crate::engine::StepBudget;

/// Configuration for a [`Supervisor`](crate::Supervisor) and its worker.
///
/// All values are fixed for the lifetime of a run; the worker reads them
/// once at spawn.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Work bound handed to the engine on every iteration.
    pub step_budget: StepBudget,
    /// Target iterations per second (0 = unpaced, run flat out).
    pub target_rate: u32,
    /// Wall-clock window over which completed steps are counted for
    /// [`RateUpdated`](crate::EventKind::RateUpdated) events.
    pub telemetry_window: Duration,
    /// Maximum time `stop()` waits for the worker to exit on its own.
    pub grace: Duration,
    /// Additional bound `stop()` waits after forcing termination.
    pub kill_wait: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `step_budget = 10_000`
    /// - `target_rate = 60`
    /// - `telemetry_window = 1s`
    /// - `grace = 5s`
    /// - `kill_wait = 1s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            step_budget: StepBudget(10_000),
            target_rate: 60,
            telemetry_window: Duration::from_millis(1000),
            grace: Duration::from_secs(5),
            kill_wait: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}
