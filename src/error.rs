//! Error types used by the stepvisor control surface and engines.
//!
//! This module defines two error types:
//!
//! - [`ControlError`] — synchronous caller errors returned by control
//!   operations (`attach_engine`, `start`, ...).
//! - [`EngineError`] — a fault raised by a [`Engine`](crate::Engine) step.
//!
//! Runtime faults never cross the controller/worker boundary as errors:
//! an [`EngineError`] observed while stepping is surfaced as an
//! [`EventKind::EngineError`](crate::EventKind::EngineError) event and ends
//! the run; a defect in the loop itself becomes an
//! [`EventKind::UnknownError`](crate::EventKind::UnknownError) event.

use thiserror::Error;

use crate::state::SupervisorState;

/// # Errors returned by the control surface.
///
/// These are caller errors: they are reported synchronously at the call
/// site and never spawn or affect a worker.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// `start()` was attempted with no engine attached.
    #[error("no engine attached")]
    NoEngine,

    /// The operation is not allowed in the current state
    /// (e.g. replacing the engine while a worker is alive).
    #[error("{op} rejected: supervisor is {state}")]
    InvalidState {
        /// The rejected operation.
        op: &'static str,
        /// The state the supervisor was in.
        state: SupervisorState,
    },
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stepvisor::ControlError;
    ///
    /// assert_eq!(ControlError::NoEngine.as_label(), "control_no_engine");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::NoEngine => "control_no_engine",
            ControlError::InvalidState { .. } => "control_invalid_state",
        }
    }
}

/// # Unrecoverable fault raised by an engine step.
///
/// Engines construct this from whatever internal failure they hit; the
/// supervisor treats it as opaque and fatal to the current run. The engine's
/// internal state after a fault is not assumed recoverable — restarting is
/// a fresh `start()` by the controller.
///
/// # Example
/// ```
/// use stepvisor::EngineError;
///
/// let err = EngineError::new("bus fault at 0xdeadbeef");
/// assert_eq!(err.to_string(), "engine fault: bus fault at 0xdeadbeef");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine fault: {message}")]
pub struct EngineError {
    /// Engine-defined failure detail.
    pub message: String,
}

impl EngineError {
    /// Creates a fault with the given detail message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
