//! Runner - 実行のオーケストレーション
//!
//! gate → discovery → scheduling → reporting の順に進める。
//! gate と discovery の失敗は致命的、reporter の失敗は warn のみ。

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::domain::{RunId, RunReport};
use crate::error::RunError;
use crate::ports::{Clock, Discovery, Reporter, StartGate};
use crate::scheduler::{Scheduler, TaskRegistry};

/// One configured sign-in run. Build it with
/// [`RunnerBuilder`](super::RunnerBuilder).
pub struct Runner {
    pub(super) gate: Arc<dyn StartGate>,
    pub(super) discovery: Arc<dyn Discovery>,
    pub(super) reporter: Arc<dyn Reporter>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) scheduler: Scheduler,
}

impl Runner {
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Runs to completion without external cancellation.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        self.run_until_cancelled(CancellationToken::new()).await
    }

    /// Runs until every item is terminal or `cancel` fires.
    ///
    /// Gate and discovery failures abort before any task exists. After that
    /// the run always produces a report; cancellation during scheduling shows
    /// up as abandoned tasks in it. A failing reporter is logged and ignored.
    pub async fn run_until_cancelled(
        &self,
        cancel: CancellationToken,
    ) -> Result<RunReport, RunError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RunError::Cancelled),
            res = self.gate.await_start() => res?,
        }

        let items = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RunError::Cancelled),
            res = self.discovery.discover() => res?,
        };

        let started_at = self.clock.now().await;
        let run_id = RunId::at(started_at);
        info!(%run_id, items = items.len(), "run starting");

        let started = Instant::now();
        let batch = self
            .scheduler
            .run(TaskRegistry::from_items(items), cancel)
            .instrument(info_span!("run", %run_id))
            .await;

        let report = RunReport::new(
            run_id,
            started_at,
            started.elapsed(),
            batch.succeeded,
            batch.failed,
            batch.registry.into_tasks(),
        );
        info!(
            %run_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            duration = ?report.duration(),
            "run finished"
        );

        if let Err(e) = self.reporter.persist(&report).await {
            warn!(%run_id, error = %e, "failed to persist run report");
        }

        Ok(report)
    }
}
