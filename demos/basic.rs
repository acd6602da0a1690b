//! # Basic Supervision Example
//!
//! Runs a counting stand-in engine under the supervisor for a few seconds
//! and prints every event through the built-in [`LogWriter`].
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stepvisor::{Config, EngineError, EngineFn, LogWriter, StepBudget, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sup = Supervisor::new(Config::default(), vec![Arc::new(LogWriter)]);

    // A stand-in core: retire the whole budget instantly and keep a tally.
    let retired = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&retired);
    sup.attach_engine(EngineFn::arc("counting-core", move |budget: StepBudget| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(budget.0, Ordering::Relaxed);
            Ok::<_, EngineError>(())
        }
    }))
    .await?;

    sup.start().await?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    sup.stop().await;

    println!(
        " ─► done: {} operations retired, state={}",
        retired.load(Ordering::Relaxed),
        sup.state()
    );
    Ok(())
}
