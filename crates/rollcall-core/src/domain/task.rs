//! Task: the per-run state wrapped around one [`Item`].

use serde::{Deserialize, Serialize};

use super::{Decision, Item, Outcome};

/// Runtime state of one item for the duration of a run.
///
/// Tasks are moved by value between the scheduler stages, so whoever holds a
/// `Task` is its only writer. Mutators are crate-private: `attempts` only moves
/// when an execution starts and `terminal` only flips through a [`Decision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Position in discovery order, used to restore the report order.
    #[serde(skip)]
    slot: usize,

    #[serde(flatten)]
    item: Item,

    /// Number of `execute()` calls made for this task.
    attempts: u32,

    /// Once set, the task is never scheduled again.
    terminal: bool,

    /// Set when the run was cancelled before this task could finish.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    abandoned: bool,

    #[serde(default)]
    last_outcome: Option<Outcome>,
}

impl Task {
    pub fn new(slot: usize, item: Item) -> Self {
        Self {
            slot,
            item,
            attempts: 0,
            terminal: false,
            abandoned: false,
            last_outcome: None,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Terminal and satisfied. Everything else that is terminal counts as failed.
    pub fn is_succeeded(&self) -> bool {
        self.terminal
            && !self.abandoned
            && self.last_outcome.as_ref().is_some_and(Outcome::is_success_like)
    }

    pub(crate) fn start_attempt(&mut self) {
        debug_assert!(!self.terminal, "terminal task must not be executed");
        self.attempts += 1;
    }

    /// Store the attempt's outcome and apply the decision taken for it.
    pub(crate) fn settle(&mut self, outcome: Outcome, decision: &Decision) {
        self.last_outcome = Some(outcome);
        if decision.is_terminal() {
            self.terminal = true;
        }
    }

    /// Give up without another attempt (run cancelled).
    pub(crate) fn abandon(&mut self) {
        self.terminal = true;
        self.abandoned = true;
    }
}
