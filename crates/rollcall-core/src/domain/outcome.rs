//! Outcome model: the result of one `execute()` call for one item.
//!
//! Outcomes only describe what happened. Whether a task is finished is decided
//! by the [`Decider`](super::Decider), never by the code that produced the
//! outcome.

use serde::{Deserialize, Serialize};

/// Classification of a single execution attempt.
///
/// Serialized as `{"kind": "...", "reason": "..."}` with SCREAMING_SNAKE_CASE
/// kinds, so reports stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The remote side reports the item was already done before this attempt.
    AlreadySatisfied,

    /// The mutating request was accepted.
    Success,

    /// Transient condition (network, server hiccup, timeout).
    RetryableFailure(String),

    /// The state could not be determined, e.g. required tokens were missing
    /// from the item page. Retrying will not change that.
    UnknownState(String),
}

impl Outcome {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::RetryableFailure(reason.into())
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::UnknownState(reason.into())
    }

    /// `AlreadySatisfied` and `Success` both count as a satisfied item.
    pub fn is_success_like(&self) -> bool {
        matches!(self, Outcome::AlreadySatisfied | Outcome::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::RetryableFailure(reason) | Outcome::UnknownState(reason) => Some(reason),
            Outcome::AlreadySatisfied | Outcome::Success => None,
        }
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::AlreadySatisfied => "already_satisfied",
            Outcome::Success => "success",
            Outcome::RetryableFailure(_) => "retryable_failure",
            Outcome::UnknownState(_) => "unknown_state",
        }
    }
}
