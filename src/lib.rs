//! # stepvisor
//!
//! **Stepvisor** is a supervised execution loop for steppable engines —
//! emulator cores and similar opaque units that advance by a bounded
//! amount of work per call.
//!
//! It provides a thread-safe control surface (start / pause / resume /
//! stop), frame pacing toward a target iteration rate, throughput
//! telemetry, and an asynchronous event stream, around exactly one worker
//! task per supervisor.
//!
//! ## Architecture
//! ```text
//!   ┌────────────────┐  attach_engine / start / pause / stop
//!   │   controller   │ ───────────────────────────────────────┐
//!   └────────────────┘                                        ▼
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │  Supervisor                                                       │
//!   │  - watch<SupervisorState>   (single lock; pause gate condition)   │
//!   │  - CancellationToken        (stop signal)                         │
//!   │  - Bus                      (broadcast events)                    │
//!   │  - SubscriberSet            (fan-out to consumers)                │
//!   └──────────────┬────────────────────────────────────────────────────┘
//!                  │ spawns (one per run)
//!                  ▼
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │  worker loop                                                      │
//!   │  stop check ─► pause gate ─► engine.step(budget) ─► telemetry ─►  │
//!   │  pacing sleep ─► (repeat)                                         │
//!   │                                                                   │
//!   │  Publishes: Started, Paused*, RateUpdated, EngineError,           │
//!   │             UnknownError, StatusMessage, Stopped (terminal)       │
//!   └──────────────┬────────────────────────────────────────────────────┘
//!                  │ step(StepBudget)
//!                  ▼
//!   ┌────────────────┐
//!   │  Engine        │   opaque: may consume less than the budget,
//!   │  (external)    │   may fault, may never return
//!   └────────────────┘
//!
//!   (*) Paused is published by the control surface at the transition.
//! ```
//!
//! ## Lifecycle
//! ```text
//!            start()                pause()
//!   Idle ──────────────► Running ──────────► Paused
//!    ▲                      │  ▲                │
//!    │   stop() / fault     │  └────────────────┘
//!    └──────────────────────┴─◄─    start()
//! ```
//!
//! A run ends by `stop()`, by an engine fault, or by a defect caught at
//! the worker boundary; each path lands back in `Idle` and the supervisor
//! is immediately reusable with a fresh `start()`.
//!
//! ## Stop escalation
//! `stop()` is synchronous and bounded: cancel, wait up to
//! [`Config::grace`] for a natural exit, then abort the task and wait up
//! to [`Config::kill_wait`]. The forced path is unsafe for the engine
//! (a step may be dropped mid-flight) and exists only because the engine
//! contract has no cancellation hook; it is reported through a status
//! line and the usual terminal `Stopped` event, not as an error.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stepvisor::{Config, EngineError, EngineFn, LogWriter, StepBudget, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new(Config::default(), vec![Arc::new(LogWriter)]);
//!
//!     // A stand-in core: pretend each call retires the whole budget.
//!     sup.attach_engine(EngineFn::arc("demo-core", |_: StepBudget| async {
//!         Ok::<_, EngineError>(())
//!     }))
//!     .await?;
//!
//!     sup.start().await?;
//!     tokio::time::sleep(Duration::from_millis(1500)).await;
//!
//!     sup.pause().await;
//!     tokio::time::sleep(Duration::from_millis(500)).await;
//!     sup.start().await?; // resume
//!
//!     sup.stop().await;
//!     assert!(!sup.is_active());
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod error;
mod events;
mod pacing;
mod state;
mod subscribers;
mod supervisor;
mod telemetry;
mod worker;

// ---- Public re-exports ----

pub use config::Config;
pub use engine::{Engine, EngineFn, EngineRef, StepBudget};
pub use error::{ControlError, EngineError};
pub use events::{Bus, Event, EventKind};
pub use pacing::FramePacer;
pub use state::SupervisorState;
pub use subscribers::{LogWriter, Subscriber, SubscriberSet};
pub use supervisor::Supervisor;
pub use telemetry::StepMeter;
