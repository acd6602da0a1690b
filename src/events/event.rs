//! # Events emitted by the supervisor and its worker.
//!
//! [`EventKind`] classifies everything a run can report: lifecycle
//! transitions, runtime faults, telemetry, and free-form status lines.
//! [`Event`] carries the kind plus optional payloads with builder-style
//! constructors.
//!
//! ## Ordering guarantees
//! Events are causally ordered within a run: `Started` precedes the first
//! `RateUpdated`, and `Stopped` is the terminal event of a run. No ordering
//! is guaranteed across kinds beyond that. Delivery is at-least-once per
//! actual occurrence.
//!
//! ## Example
//! ```
//! use stepvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::EngineError).with_error("bus fault");
//!
//! assert_eq!(ev.kind, EventKind::EngineError);
//! assert_eq!(ev.error.as_deref(), Some("bus fault"));
//! ```

use std::time::SystemTime;

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A run began; the worker is about to enter its loop.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    Started,

    /// The run was paused; the worker parks at its next polling point.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    Paused,

    /// The run ended (graceful stop, forced stop, or fault). Terminal
    /// event of a run.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    Stopped,

    /// The engine faulted during a step; the run ends.
    ///
    /// Sets:
    /// - `error`: engine-defined failure detail
    /// - `at`: wall-clock timestamp
    EngineError,

    /// A defect outside the engine call was caught at the worker boundary;
    /// the run ends.
    ///
    /// Sets:
    /// - `error`: stringified panic payload or failure detail
    /// - `at`: wall-clock timestamp
    UnknownError,

    /// Throughput sample for the elapsed telemetry window.
    ///
    /// Sets:
    /// - `rate`: completed steps per second (floor-rounded)
    /// - `at`: wall-clock timestamp
    RateUpdated,

    /// Free-form human-readable status line.
    ///
    /// Sets:
    /// - `text`: the message
    /// - `at`: wall-clock timestamp
    StatusMessage,
}

/// A single supervisor event with optional payloads.
///
/// Which fields are set depends on [`Event::kind`]; see the [`EventKind`]
/// variant docs.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event classification.
    pub kind: EventKind,
    /// Wall-clock timestamp taken at emission.
    pub at: SystemTime,
    /// Failure detail (`EngineError`, `UnknownError`).
    pub error: Option<String>,
    /// Steps per second (`RateUpdated`).
    pub rate: Option<u64>,
    /// Status text (`StatusMessage`).
    pub text: Option<String>,
}

impl Event {
    /// Creates an event of the given kind stamped with the current time.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            error: None,
            rate: None,
            text: None,
        }
    }

    /// Attaches a failure detail.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a steps-per-second sample.
    pub fn with_rate(mut self, rate: u64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Attaches a status text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_payloads() {
        let ev = Event::now(EventKind::RateUpdated).with_rate(60);
        assert_eq!(ev.kind, EventKind::RateUpdated);
        assert_eq!(ev.rate, Some(60));
        assert!(ev.error.is_none());
        assert!(ev.text.is_none());

        let ev = Event::now(EventKind::StatusMessage).with_text("emulation started");
        assert_eq!(ev.text.as_deref(), Some("emulation started"));
    }
}
