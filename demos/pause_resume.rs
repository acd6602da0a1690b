//! # Pause/Resume Control Example
//!
//! Walks the whole control surface: start, pause, resume, stop, and a
//! second run on the same supervisor.
//!
//! Demonstrates:
//! - Pausing without losing the worker
//! - Resuming via `start()`
//! - Reusing the supervisor after `stop()`
//!
//! ## Run
//! ```bash
//! cargo run --example pause_resume
//! ```

use std::sync::Arc;
use std::time::Duration;

use stepvisor::{Config, EngineError, EngineFn, LogWriter, StepBudget, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = Config::default();
    cfg.target_rate = 30;

    let sup = Supervisor::new(cfg, vec![Arc::new(LogWriter)]);
    sup.attach_engine(EngineFn::arc("demo-core", |_: StepBudget| async {
        Ok::<_, EngineError>(())
    }))
    .await?;

    // ============================================================
    // Phase 1: run for a bit
    // ============================================================
    println!(" ─► starting...");
    sup.start().await?;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // ============================================================
    // Phase 2: pause, sit idle, resume
    // ============================================================
    println!(" ─► pausing (state={})...", sup.state());
    sup.pause().await;
    tokio::time::sleep(Duration::from_millis(1000)).await;

    println!(" ─► resuming (state={})...", sup.state());
    sup.start().await?;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // ============================================================
    // Phase 3: stop, then prove the supervisor is reusable
    // ============================================================
    println!(" ─► stopping...");
    sup.stop().await;
    println!(" ─► stopped (active={})", sup.is_active());

    println!(" ─► second run on the same supervisor...");
    sup.start().await?;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    sup.stop().await;

    println!(" ─► done (state={})", sup.state());
    Ok(())
}
