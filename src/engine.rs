//! # Stepping engine contract.
//!
//! The supervisor drives an opaque [`Engine`]: a unit that advances by a
//! bounded amount of work per call and may fail with an engine-defined
//! error. The supervisor places no constraints on how an engine interprets
//! its [`StepBudget`] — "instructions", "cycles", and "scanlines" are all
//! valid readings.
//!
//! The common handle type is [`EngineRef`], an `Arc<dyn Engine>` shared
//! between the controller (which may configure the engine between runs) and
//! the worker (which steps it). Shared ownership guarantees the engine
//! outlives the worker task.
//!
//! **Caller obligation:** the supervisor does not serialize controller-side
//! engine access against worker-side stepping. Do not mutate engine
//! configuration while [`is_active()`](crate::Supervisor::is_active) is
//! true.
//!
//! A step call is not raced against the stop signal: if it blocks
//! indefinitely, graceful stop cannot complete and `stop()` falls back to
//! forced termination.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EngineError;

/// Work bound for one engine step, an opaque upper limit on how much the
/// engine advances per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StepBudget(pub u64);

/// Shared handle to an engine, usable from the controller and the worker.
pub type EngineRef = Arc<dyn Engine>;

/// # Steppable engine.
///
/// One operation: run until the step budget is exhausted or a halt
/// condition is reached. Faults are reported through [`EngineError`]; the
/// supervisor treats any fault as fatal to the current run.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use stepvisor::{Engine, EngineError, StepBudget};
///
/// struct Nop;
///
/// #[async_trait]
/// impl Engine for Nop {
///     async fn step(&self, _budget: StepBudget) -> Result<(), EngineError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Advances the engine by at most `budget` units of work.
    async fn step(&self, budget: StepBudget) -> Result<(), EngineError>;
}

/// Function-backed engine implementation.
///
/// Wraps a closure that creates a fresh future per step. Shared mutable
/// state, when needed, goes through an explicit `Arc<...>` inside the
/// closure. Mostly useful for tests, demos, and thin adapters over an
/// existing core.
///
/// # Example
/// ```
/// use stepvisor::{EngineError, EngineFn, EngineRef, StepBudget};
///
/// let engine: EngineRef = EngineFn::arc("counter", |budget: StepBudget| async move {
///     let _ = budget;
///     Ok::<_, EngineError>(())
/// });
/// ```
pub struct EngineFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> EngineFn<F> {
    /// Creates a new function-backed engine.
    ///
    /// Prefer [`EngineFn::arc`] when you immediately need an [`EngineRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the engine and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Returns the engine's name (used for debugging only).
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<F, Fut> Engine for EngineFn<F>
where
    F: Fn(StepBudget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EngineError>> + Send + 'static,
{
    async fn step(&self, budget: StepBudget) -> Result<(), EngineError> {
        (self.f)(budget).await
    }
}
