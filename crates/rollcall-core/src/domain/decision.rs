//! Decision model: what happens to a task after an attempt.
//!
//! This is the retry controller. It is the only place that interprets an
//! [`Outcome`]; the dispatcher and the collector just act on the decision.

use super::{Outcome, Task};

/// The next action to take for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Item is satisfied. Terminal.
    Succeeded,

    /// Give up on the item. Terminal, counted as failed.
    Failed { reason: String },

    /// Send the task back to the work channel.
    Retry { reason: String },
}

impl Decision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Retry { .. })
    }
}

/// Decides the next action based on task state and the latest outcome.
///
/// Deciders are pure functions: given the current state and observation,
/// they return the next action without side effects. `task.attempts()`
/// already includes the attempt that produced `outcome`.
pub trait Decider: Send + Sync {
    fn decide(&self, task: &Task, outcome: &Outcome) -> Decision;
}

/// Attempt-budget decider.
///
/// - `AlreadySatisfied` / `Success` succeed.
/// - `UnknownState` fails on first occurrence; retrying will not produce the
///   missing data.
/// - `RetryableFailure` retries while `attempts < max_attempts`, then fails.
#[derive(Debug, Clone)]
pub struct DefaultDecider {
    max_attempts: u32,
}

impl DefaultDecider {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Decider for DefaultDecider {
    fn decide(&self, task: &Task, outcome: &Outcome) -> Decision {
        match outcome {
            Outcome::AlreadySatisfied | Outcome::Success => Decision::Succeeded,
            Outcome::UnknownState(reason) => Decision::Failed {
                reason: format!("state unknown, not retried: {reason}"),
            },
            Outcome::RetryableFailure(reason) if task.attempts() >= self.max_attempts => {
                Decision::Failed {
                    reason: format!(
                        "max attempts reached: {}/{}: {reason}",
                        task.attempts(),
                        self.max_attempts
                    ),
                }
            }
            Outcome::RetryableFailure(reason) => Decision::Retry {
                reason: format!(
                    "retry attempt {}/{}: {reason}",
                    task.attempts() + 1,
                    self.max_attempts
                ),
            },
        }
    }
}
