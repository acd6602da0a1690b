//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [started]
//! [status] emulation started
//! [rate] 60 steps/s
//! [paused]
//! [engine-error] engine fault: bus fault at 0xdeadbeef
//! [stopped]
//! ```
//!
//! Not intended for production use — implement a custom
//! [`Subscriber`](crate::Subscriber) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Stdout logging subscriber.
#[derive(Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::Started => println!("[started]"),
            EventKind::Paused => println!("[paused]"),
            EventKind::Stopped => println!("[stopped]"),
            EventKind::EngineError => {
                println!("[engine-error] {}", e.error.as_deref().unwrap_or("?"));
            }
            EventKind::UnknownError => {
                println!("[unknown-error] {}", e.error.as_deref().unwrap_or("?"));
            }
            EventKind::RateUpdated => {
                println!("[rate] {} steps/s", e.rate.unwrap_or(0));
            }
            EventKind::StatusMessage => {
                println!("[status] {}", e.text.as_deref().unwrap_or(""));
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
