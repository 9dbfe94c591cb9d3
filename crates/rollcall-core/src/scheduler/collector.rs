//! Result collector: the single consumer of completions.

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::domain::Task;

/// Final counts plus every terminal task, in completion order.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub(crate) succeeded: usize,
    pub(crate) failed: usize,
    pub(crate) tasks: Vec<Task>,
}

impl Tally {
    fn record(&mut self, task: Task) {
        if task.is_succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.tasks.push(task);
    }
}

/// Counts terminal completions and resubmits the rest.
///
/// `expected` is the initial batch size. Resubmissions do not change it: the
/// collector simply keeps waiting for the task's next completion.
pub(crate) struct Collector {
    expected: usize,
    work_tx: mpsc::Sender<Task>,
}

impl Collector {
    pub(crate) fn new(expected: usize, work_tx: mpsc::Sender<Task>) -> Self {
        Self { expected, work_tx }
    }

    /// Returns once `expected` terminal completions were seen. Dropping the
    /// collector's work sender on return is what lets the dispatcher stop.
    pub(crate) async fn run(self, mut done_rx: mpsc::Receiver<Task>) -> Tally {
        let mut tally = Tally {
            tasks: Vec::with_capacity(self.expected),
            ..Tally::default()
        };
        let mut remaining = self.expected;

        while remaining > 0 {
            let Some(task) = done_rx.recv().await else {
                error!(remaining, "completion channel closed with tasks outstanding");
                break;
            };

            if task.is_terminal() {
                tally.record(task);
                remaining -= 1;
                continue;
            }

            debug!(item = %task.item(), attempts = task.attempts(), "resubmitting");
            if let Err(mpsc::error::SendError(mut task)) = self.work_tx.send(task).await {
                error!(item = %task.item(), "work channel closed, abandoning task");
                task.abandon();
                tally.record(task);
                remaining -= 1;
            }
        }

        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, Item, Outcome};

    fn settled(slot: usize, outcome: Outcome, decision: Decision) -> Task {
        let mut task = Task::new(slot, Item::new(format!("k{slot}"), "n"));
        task.start_attempt();
        task.settle(outcome, &decision);
        task
    }

    #[tokio::test]
    async fn counts_terminal_tasks_and_resubmits_the_rest() {
        let (work_tx, mut work_rx) = mpsc::channel(4);
        let (done_tx, done_rx) = mpsc::channel(4);
        let collector = tokio::spawn(Collector::new(2, work_tx).run(done_rx));

        let retry = settled(
            0,
            Outcome::retryable("503"),
            Decision::Retry {
                reason: "again".into(),
            },
        );
        done_tx.send(retry).await.unwrap();

        // The open task comes back on the work channel, untouched.
        let mut resubmitted = work_rx.recv().await.unwrap();
        assert_eq!(resubmitted.slot(), 0);
        assert_eq!(resubmitted.attempts(), 1);

        resubmitted.start_attempt();
        resubmitted.settle(Outcome::Success, &Decision::Succeeded);
        done_tx.send(resubmitted).await.unwrap();

        let failed = settled(
            1,
            Outcome::unknown("tbs missing"),
            Decision::Failed {
                reason: "unknown".into(),
            },
        );
        done_tx.send(failed).await.unwrap();

        let tally = collector.await.unwrap();
        assert_eq!(tally.succeeded, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.tasks.len(), 2);
    }

    #[tokio::test]
    async fn zero_expected_returns_immediately() {
        let (work_tx, _work_rx) = mpsc::channel(1);
        let (_done_tx, done_rx) = mpsc::channel(1);

        let tally = Collector::new(0, work_tx).run(done_rx).await;
        assert_eq!(tally.succeeded + tally.failed, 0);
    }

    #[tokio::test]
    async fn closed_work_channel_abandons_open_task() {
        let (work_tx, work_rx) = mpsc::channel(1);
        drop(work_rx);
        let (done_tx, done_rx) = mpsc::channel(1);

        let open = settled(
            0,
            Outcome::retryable("503"),
            Decision::Retry {
                reason: "again".into(),
            },
        );
        done_tx.send(open).await.unwrap();

        let tally = Collector::new(1, work_tx).run(done_rx).await;
        assert_eq!(tally.failed, 1);
        assert!(tally.tasks[0].is_abandoned());
    }
}
