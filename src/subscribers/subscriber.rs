//! # Event subscriber trait.
//!
//! [`Subscriber`] is the extension point for consuming the supervisor's
//! event stream: UI bridges, metrics exporters, loggers.
//!
//! Each subscriber gets a dedicated worker task and a bounded FIFO queue,
//! so a slow consumer never blocks the stepping loop — the hand-off the
//! event contract requires happens here, not in the consumer.
//!
//! ## Rules
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Queue overflow drops the event for this subscriber only; others are
//!   unaffected.
//! - Panics inside a subscriber are caught and reported on stderr; the
//!   worker task keeps running.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use stepvisor::{Event, EventKind, Subscriber};
//!
//! struct RateGauge;
//!
//! #[async_trait]
//! impl Subscriber for RateGauge {
//!     async fn handle(&self, ev: &Event) {
//!         if let (EventKind::RateUpdated, Some(rate)) = (ev.kind, ev.rate) {
//!             // export the gauge, update a label, ...
//!             let _ = rate;
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "rate-gauge" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of supervisor events, driven by a dedicated worker task.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's own worker task, never from the
    /// stepping loop. Avoid blocking the executor; handle errors
    /// internally.
    async fn handle(&self, event: &Event);

    /// Returns the subscriber name used in drop/panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose —
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// When the queue is full, new events are dropped for this subscriber
    /// only. Clamped to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
