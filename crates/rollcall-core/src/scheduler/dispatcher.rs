//! Dispatcher: turns queued tasks into bounded, concurrent executions.
//!
//! ```text
//! work_rx ──► acquire permit ──► spawn ─┬─► execute(item) ─► decide ─► settle
//!                  │                    └─► release permit ─► done_tx
//!                  └─ cancelled ──► abandon ─► done_tx
//! ```
//!
//! The permit is released before the completion is sent, so the dispatcher is
//! only ever waiting on executions that are actually running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::limiter::Limiter;
use crate::domain::{Decider, Decision, Outcome, Task};
use crate::ports::Executor;

/// Runs one attempt of one task. Cloned into every spawned execution.
#[derive(Clone)]
pub(crate) struct Execution {
    executor: Arc<dyn Executor>,
    decider: Arc<dyn Decider>,
    max_attempts: u32,
    timeout: Option<Duration>,
}

impl Execution {
    pub(crate) fn new(
        executor: Arc<dyn Executor>,
        decider: Arc<dyn Decider>,
        max_attempts: u32,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            executor,
            decider,
            max_attempts,
            timeout,
        }
    }

    /// Exactly one `execute()` call, then the retry decision.
    pub(crate) async fn run(&self, task: &mut Task, cancel: CancellationToken) {
        if task.is_terminal() {
            warn!(item = %task.item(), "terminal task reached the dispatcher, skipping");
            return;
        }

        task.start_attempt();
        debug!(item = %task.item(), attempt = task.attempts(), "executing");

        let outcome = self.execute(task, cancel).await;
        let decision = self.bounded(task, self.decider.decide(task, &outcome));

        match &decision {
            Decision::Succeeded => {
                info!(item = %task.item(), attempt = task.attempts(), outcome = outcome.as_label(), "item done");
            }
            Decision::Failed { reason } => {
                warn!(item = %task.item(), attempt = task.attempts(), %reason, "item failed");
            }
            Decision::Retry { reason } => {
                debug!(item = %task.item(), attempt = task.attempts(), %reason, "item will be retried");
            }
        }

        task.settle(outcome, &decision);
    }

    /// A retry past `max_attempts` becomes a failure, whatever the decider says.
    fn bounded(&self, task: &Task, decision: Decision) -> Decision {
        match decision {
            Decision::Retry { reason } if task.attempts() >= self.max_attempts => {
                Decision::Failed {
                    reason: format!(
                        "max attempts reached: {}/{}: {reason}",
                        task.attempts(),
                        self.max_attempts
                    ),
                }
            }
            other => other,
        }
    }

    /// Runs `execute()` in its own tokio task so a panic or a timeout turns
    /// into an outcome instead of losing the task.
    async fn execute(&self, task: &Task, cancel: CancellationToken) -> Outcome {
        let executor = Arc::clone(&self.executor);
        let item = task.item().clone();
        let token = cancel.clone();
        let mut handle = tokio::spawn(async move { executor.execute(&item, token).await });

        let joined = match self.timeout {
            Some(dur) => match time::timeout(dur, &mut handle).await {
                Ok(joined) => joined,
                Err(_elapsed) => {
                    cancel.cancel();
                    handle.abort();
                    return Outcome::retryable(format!("timed out after {dur:?}"));
                }
            },
            None => handle.await,
        };

        joined.unwrap_or_else(|err| Outcome::unknown(format!("executor aborted: {err}")))
    }
}

/// Pulls tasks from the work channel and launches their executions.
pub(crate) struct Dispatcher {
    execution: Execution,
    limiter: Limiter,
}

impl Dispatcher {
    pub(crate) fn new(execution: Execution, limiter: Limiter) -> Self {
        Self { execution, limiter }
    }

    /// Runs until every sender of `work_rx` is gone.
    pub(crate) async fn run(
        self,
        mut work_rx: mpsc::Receiver<Task>,
        done_tx: mpsc::Sender<Task>,
        cancel: CancellationToken,
    ) {
        while let Some(mut task) = work_rx.recv().await {
            let Some(permit) = self.limiter.acquire(&cancel).await else {
                if !task.is_terminal() {
                    task.abandon();
                    debug!(item = %task.item(), attempts = task.attempts(), "run cancelled, abandoning task");
                }
                forward(task, &done_tx);
                continue;
            };

            let execution = self.execution.clone();
            let done_tx = done_tx.clone();
            let token = cancel.child_token();
            tokio::spawn(async move {
                execution.run(&mut task, token).await;
                drop(permit);
                // The collector only goes away once the run is over.
                let _ = done_tx.send(task).await;
            });
        }
        debug!("work channel closed, dispatcher exiting");
    }
}

/// Send without blocking the dispatch loop; the collector may itself be
/// waiting on the work channel.
fn forward(task: Task, done_tx: &mpsc::Sender<Task>) {
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let _ = done_tx.send(task).await;
    });
}
