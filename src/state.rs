//! # Supervisor lifecycle states.
//!
//! [`SupervisorState`] is the three-state machine driven by the control
//! surface and observed by the worker loop:
//!
//! ```text
//!            start()                pause()
//!   Idle ──────────────► Running ──────────► Paused
//!    ▲                      │  ▲                │
//!    │        stop() /      │  └────────────────┘
//!    │     engine fault     │       start()
//!    └──────────────────────┴─◄── stop()
//! ```
//!
//! The state is held in a `tokio::sync::watch` channel owned by the
//! [`Supervisor`](crate::Supervisor); the worker is alive exactly while the
//! state is [`Running`](SupervisorState::Running) or
//! [`Paused`](SupervisorState::Paused).

use std::fmt;

/// Lifecycle state of a [`Supervisor`](crate::Supervisor).
///
/// Fully reusable: after a run ends (stop, engine fault, or worker defect)
/// the state returns to [`Idle`](SupervisorState::Idle) and a fresh
/// `start()` begins a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No worker is running; `start()` spawns one.
    Idle,
    /// The worker is stepping the engine.
    Running,
    /// The worker is alive but parked on its pause gate.
    Paused,
}

impl SupervisorState {
    /// True while a worker task is alive (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, SupervisorState::Running | SupervisorState::Paused)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Running => "running",
            SupervisorState::Paused => "paused",
        };
        f.write_str(s)
    }
}
