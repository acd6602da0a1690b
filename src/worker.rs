//! # The stepping loop.
//!
//! One worker task per run, spawned by
//! [`Supervisor::start`](crate::Supervisor::start). Each iteration:
//!
//! ```text
//! ┌► stop check ─► pause gate ─► engine.step(budget) ─► telemetry ─► pacing ┐
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - The pause gate is the loop's sole suspension point while paused: the
//!   worker awaits a state change on the watch channel and burns no CPU.
//!   The stop token wakes it immediately.
//! - The engine step is deliberately **not** raced against the stop token:
//!   the engine contract has no cancellation hook, so graceful stop waits
//!   for the step in flight (or, if it never returns, `stop()` escalates to
//!   forced termination).
//! - The pacing sleep is advisory and interruptible by the stop token.
//!
//! Every exit path runs the same epilogue: status line, state to `Idle`,
//! terminal `Stopped` event. A panic anywhere in the loop is caught at the
//! outer boundary, reported as one `UnknownError` event, and still followed
//! by the epilogue — the worker never takes the process down.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::EngineRef;
use crate::events::{Bus, Event, EventKind};
use crate::pacing::FramePacer;
use crate::state::SupervisorState;
use crate::telemetry::StepMeter;

/// Everything a worker needs for one run.
pub(crate) struct WorkerCtx {
    pub(crate) engine: EngineRef,
    pub(crate) bus: Bus,
    pub(crate) state: Arc<watch::Sender<SupervisorState>>,
    pub(crate) stop: CancellationToken,
    pub(crate) cfg: Config,
}

/// Runs one supervised stepping loop to completion.
pub(crate) async fn run(ctx: WorkerCtx) {
    if let Err(panic) = AssertUnwindSafe(drive(&ctx)).catch_unwind().await {
        ctx.bus.publish(
            Event::now(EventKind::UnknownError).with_error(panic_message(panic.as_ref())),
        );
    }

    ctx.bus
        .publish(Event::now(EventKind::StatusMessage).with_text("emulation stopped"));
    ctx.state.send_replace(SupervisorState::Idle);
    ctx.bus.publish(Event::now(EventKind::Stopped));
}

async fn drive(ctx: &WorkerCtx) {
    let mut meter = StepMeter::new(ctx.cfg.telemetry_window, Instant::now());
    let pacer = FramePacer::new(ctx.cfg.target_rate);
    let mut state_rx = ctx.state.subscribe();

    ctx.bus.publish(Event::now(EventKind::Started));
    ctx.bus
        .publish(Event::now(EventKind::StatusMessage).with_text("emulation started"));

    loop {
        if ctx.stop.is_cancelled() {
            break;
        }

        if *state_rx.borrow() == SupervisorState::Paused {
            tokio::select! {
                changed = state_rx.wait_for(|s| *s != SupervisorState::Paused) => {
                    // The sender lives in the supervisor; a closed channel
                    // means the supervisor is gone and the run is over.
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ctx.stop.cancelled() => break,
            }
            if ctx.stop.is_cancelled() {
                break;
            }
        }

        let iteration_start = Instant::now();

        if let Err(fault) = ctx.engine.step(ctx.cfg.step_budget).await {
            ctx.bus
                .publish(Event::now(EventKind::EngineError).with_error(fault.to_string()));
            break;
        }

        if let Some(rate) = meter.record_step(Instant::now()) {
            ctx.bus
                .publish(Event::now(EventKind::RateUpdated).with_rate(rate));
        }

        match pacer.remaining(iteration_start.elapsed()) {
            Some(remainder) => {
                tokio::select! {
                    _ = time::sleep(remainder) => {}
                    _ = ctx.stop.cancelled() => break,
                }
            }
            // Overrun or unpaced: no sleep, but keep the loop cooperative
            // so control calls and event consumers get scheduled.
            None => tokio::task::yield_now().await,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}
