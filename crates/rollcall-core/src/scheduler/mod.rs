//! Scheduler: bounded-concurrency, retry-driven batch execution.
//!
//! ```text
//!              ┌──────────── resubmit (not terminal) ────────────┐
//!              ▼                                                 │
//! feed ──► work channel ──► Dispatcher ──► execute ──► done ──► Collector ──► Tally
//!                              │ permit                          │
//!                              └── Limiter                       └── counts terminal
//! ```
//!
//! ## Rules
//! - A task is owned by exactly one stage at a time; it moves by value, so a
//!   task can never be executed twice concurrently.
//! - `attempts` is bumped once per `execute()` call and never exceeds
//!   `max_attempts`.
//! - The collector stops after exactly `N` terminal completions, `N` being the
//!   initial batch size; `succeeded + failed == N`.

mod collector;
mod dispatcher;
mod limiter;
mod registry;

pub use limiter::{Limiter, Permit};
pub use registry::TaskRegistry;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use self::collector::Collector;
use self::dispatcher::{Dispatcher, Execution};
use crate::config::SchedulerConfig;
use crate::domain::{Decider, DefaultDecider};
use crate::ports::Executor;

/// Outcome of scheduling one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
    /// Every task, terminal, in discovery order.
    pub registry: TaskRegistry,
}

/// Runs batches of tasks against an [`Executor`].
pub struct Scheduler {
    config: SchedulerConfig,
    executor: Arc<dyn Executor>,
    decider: Arc<dyn Decider>,
}

impl Scheduler {
    /// Uses [`DefaultDecider`] with `config.max_attempts`.
    pub fn new(config: SchedulerConfig, executor: Arc<dyn Executor>) -> Self {
        let decider = Arc::new(DefaultDecider::new(config.max_attempts));
        Self::with_decider(config, executor, decider)
    }

    /// Custom retry policy. `config.max_attempts` stays a hard cap: a retry
    /// asked for after the last allowed attempt is recorded as a failure.
    pub fn with_decider(
        config: SchedulerConfig,
        executor: Arc<dyn Executor>,
        decider: Arc<dyn Decider>,
    ) -> Self {
        Self {
            config,
            executor,
            decider,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Drives every task in `registry` to a terminal state.
    ///
    /// Cancelling `cancel` stops new attempts; tasks that have not finished are
    /// abandoned and counted as failed, so the result is always complete.
    pub async fn run(&self, registry: TaskRegistry, cancel: CancellationToken) -> BatchResult {
        let expected = registry.len();
        let capacity = self.config.max_concurrency.max(1);
        info!(
            tasks = expected,
            max_concurrency = capacity,
            max_attempts = self.config.max_attempts,
            "scheduling batch"
        );

        let (work_tx, work_rx) = mpsc::channel(capacity);
        let (done_tx, done_rx) = mpsc::channel(capacity);

        let execution = Execution::new(
            Arc::clone(&self.executor),
            Arc::clone(&self.decider),
            self.config.max_attempts,
            self.config.timeout(),
        );
        let dispatcher = Dispatcher::new(execution, Limiter::new(capacity));
        let collector = Collector::new(expected, work_tx.clone());

        let feed = async move {
            for task in registry.into_tasks() {
                if work_tx.send(task).await.is_err() {
                    break;
                }
            }
        };

        let ((), (), tally) = tokio::join!(
            dispatcher.run(work_rx, done_tx, cancel),
            feed,
            collector.run(done_rx),
        );

        info!(
            succeeded = tally.succeeded,
            failed = tally.failed,
            "batch finished"
        );

        BatchResult {
            succeeded: tally.succeeded,
            failed: tally.failed,
            registry: TaskRegistry::restore(tally.tasks),
        }
    }
}
