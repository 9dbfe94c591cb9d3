//! Executor port - Item ごとのリモート操作

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Item, Outcome};

/// Checks an item's remote state and, if needed, issues the mutating request.
///
/// # Contract
/// - Must be idempotent with respect to "already satisfied": calling it again
///   after a success reports [`Outcome::AlreadySatisfied`] instead of applying
///   the side effect twice.
/// - Network timeouts map to [`Outcome::RetryableFailure`].
/// - Missing data that a retry cannot fix maps to [`Outcome::UnknownState`].
/// - `cancel` is a per-attempt child token. It fires when the run is cancelled
///   or the attempt timed out; implementations should stop early and return a
///   failure outcome.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, item: &Item, cancel: CancellationToken) -> Outcome;
}
