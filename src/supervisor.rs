//! # Supervisor: the thread-safe control surface over one stepping loop.
//!
//! [`Supervisor`] owns the event [`Bus`], an optional subscriber fan-out,
//! and at most one worker task stepping an attached
//! [`Engine`](crate::Engine). Control
//! operations (`attach_engine` / `start` / `pause` / `stop`) may be issued
//! from any task; concurrent callers are serialized by an internal lock,
//! and the worker observes commands at its next polling point.
//!
//! ## High-level architecture
//! ```text
//! controller ──► Supervisor ── watch<SupervisorState> ──► worker loop
//!                   │                 ▲   │                   │
//!                   │        (pause gate / stop token)        │ engine.step(budget)
//!                   │                                         ▼
//!                   │                                   Engine (opaque)
//!                   │                                         │
//!                   └──subscribe()◄──── Bus ◄── publish ──────┘
//!                                        │
//!                                        └──► SubscriberSet ──► Subscriber::handle
//! ```
//!
//! ## Stop escalation
//! `stop()` cancels the run token, then waits up to [`Config::grace`] for
//! the worker to exit on its own. If it does not, the task is aborted — a
//! last-resort, unsafe path that may drop an engine step mid-flight — and
//! `stop()` waits up to [`Config::kill_wait`] for the abort to settle. The
//! terminal `Stopped` event is emitted either way: by the worker's epilogue
//! on the graceful path, by `stop()` itself on the forced path.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use stepvisor::{Config, EngineError, EngineFn, StepBudget, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new(Config::default(), vec![]);
//!     sup.attach_engine(EngineFn::arc("core", |_: StepBudget| async {
//!         Ok::<_, EngineError>(())
//!     }))
//!     .await?;
//!
//!     sup.start().await?;
//!     tokio::time::sleep(Duration::from_secs(2)).await;
//!     sup.stop().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::EngineRef;
use crate::error::ControlError;
use crate::events::{Bus, Event, EventKind};
use crate::state::SupervisorState;
use crate::subscribers::{Subscriber, SubscriberSet};
use crate::worker::{self, WorkerCtx};

/// Handle to the worker task of one run.
struct RunHandle {
    stop: CancellationToken,
    join: JoinHandle<()>,
}

/// Controller-side state, serialized by the control lock.
struct Control {
    engine: Option<EngineRef>,
    run: Option<RunHandle>,
}

/// Supervised execution loop over one steppable engine.
///
/// A single instance supervises a single engine; running two supervisors
/// over the same engine is a caller error.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    state: Arc<watch::Sender<SupervisorState>>,
    control: Mutex<Control>,
}

impl Supervisor {
    /// Creates a supervisor in the `Idle` state.
    ///
    /// Subscribers each get a dedicated fan-out worker; pass an empty `Vec`
    /// to consume events through [`Supervisor::subscribe`] instead. With a
    /// non-empty subscriber list this must be called inside a Tokio
    /// runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        if !subscribers.is_empty() {
            Self::spawn_fan_out(&bus, subscribers);
        }

        let (state, _rx) = watch::channel(SupervisorState::Idle);
        Self {
            cfg,
            bus,
            state: Arc::new(state),
            control: Mutex::new(Control {
                engine: None,
                run: None,
            }),
        }
    }

    /// Bridges the bus into a [`SubscriberSet`] on a dedicated task.
    fn spawn_fan_out(bus: &Bus, subscribers: Vec<Arc<dyn Subscriber>>) {
        let set = SubscriberSet::new(subscribers);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.fan_out(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
    }

    /// Installs the engine the worker will step.
    ///
    /// Must be called before `start()`. Replacing the engine while a worker
    /// is alive is rejected with [`ControlError::InvalidState`].
    pub async fn attach_engine(&self, engine: EngineRef) -> Result<(), ControlError> {
        let mut ctrl = self.control.lock().await;
        let state = *self.state.borrow();
        if state.is_active() {
            return Err(ControlError::InvalidState {
                op: "attach_engine",
                state,
            });
        }
        ctrl.engine = Some(engine);
        Ok(())
    }

    /// Starts a run, or resumes a paused one.
    ///
    /// - `Idle`: spawns the worker and transitions to `Running`; the worker
    ///   emits `Started` on entry. Fails with [`ControlError::NoEngine`]
    ///   (plus one error event on the bus) when nothing is attached; no
    ///   worker is spawned in that case.
    /// - `Paused`: transitions to `Running` and wakes the worker. No new
    ///   task is spawned.
    /// - `Running`: no-op.
    pub async fn start(&self) -> Result<(), ControlError> {
        let mut ctrl = self.control.lock().await;
        // Snapshot first: the watch borrow guard must not be held across
        // the send_replace calls below.
        let state = *self.state.borrow();
        match state {
            SupervisorState::Running => Ok(()),
            SupervisorState::Paused => {
                self.state.send_replace(SupervisorState::Running);
                self.bus
                    .publish(Event::now(EventKind::StatusMessage).with_text("emulation resumed"));
                Ok(())
            }
            SupervisorState::Idle => {
                let Some(engine) = ctrl.engine.clone() else {
                    self.bus.publish(
                        Event::now(EventKind::UnknownError).with_error("no engine attached"),
                    );
                    return Err(ControlError::NoEngine);
                };

                let stop = CancellationToken::new();
                self.state.send_replace(SupervisorState::Running);
                let join = tokio::spawn(worker::run(WorkerCtx {
                    engine,
                    bus: self.bus.clone(),
                    state: Arc::clone(&self.state),
                    stop: stop.clone(),
                    cfg: self.cfg,
                }));
                ctrl.run = Some(RunHandle { stop, join });
                Ok(())
            }
        }
    }

    /// Pauses a running worker at its next polling point.
    ///
    /// Emits a `Paused` event when the transition happens; a no-op (and
    /// silent) in any other state. The caller is never blocked — only the
    /// worker parks.
    pub async fn pause(&self) {
        let _ctrl = self.control.lock().await;
        // Atomic check-and-transition: a worker that just faulted has
        // already forced the state to Idle, and the flip is skipped.
        let paused = self.state.send_if_modified(|s| {
            if *s == SupervisorState::Running {
                *s = SupervisorState::Paused;
                true
            } else {
                false
            }
        });
        if paused {
            self.bus.publish(Event::now(EventKind::Paused));
        }
    }

    /// Stops the current run, blocking (bounded) until the worker is gone.
    ///
    /// Graceful first: the stop token wakes the pause gate and the pacing
    /// sleep, and the worker exits at its next polling point — within
    /// [`Config::grace`] unless an engine step is stuck. After the grace
    /// window the worker task is aborted and `stop()` waits at most
    /// [`Config::kill_wait`] more. Worst case, `stop()` returns after
    /// roughly `grace + kill_wait`.
    ///
    /// When no run is live this is a no-op and emits nothing: the terminal
    /// `Stopped` event is a per-run guarantee, published once per run that
    /// was actually started (graceful or forced), never for an idle stop.
    /// After `stop()` returns, `is_active()` is false.
    pub async fn stop(&self) {
        let mut ctrl = self.control.lock().await;
        let Some(RunHandle { stop, mut join }) = ctrl.run.take() else {
            return;
        };

        stop.cancel();
        if time::timeout(self.cfg.grace, &mut join).await.is_ok() {
            // Worker ran its epilogue: state is Idle, Stopped is out.
            return;
        }

        join.abort();
        let _ = time::timeout(self.cfg.kill_wait, join).await;

        // The aborted worker never reached its epilogue; finish the
        // sequence on its behalf. Not an error: the requested outcome
        // (worker gone) was achieved, if unsafely for the engine.
        self.bus.publish(
            Event::now(EventKind::StatusMessage)
                .with_text("worker force-terminated after grace period"),
        );
        self.state.send_replace(SupervisorState::Idle);
        self.bus.publish(Event::now(EventKind::Stopped));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    /// True while a worker task is alive (`Running` or `Paused`).
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Subscribes to the raw event stream.
    ///
    /// The receiver observes every event published after this call. A
    /// receiver that falls more than [`Config::bus_capacity`] behind loses
    /// the oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl Drop for Supervisor {
    /// Best-effort forced teardown so no worker outlives the supervisor.
    ///
    /// Drop cannot await, so this takes the forced path only: cancel the
    /// stop token and abort the task. Call [`Supervisor::stop`] first for
    /// the full graceful sequence.
    fn drop(&mut self) {
        if let Ok(mut ctrl) = self.control.try_lock() {
            if let Some(run) = ctrl.run.take() {
                run.stop.cancel();
                run.join.abort();
            }
        }
    }
}
