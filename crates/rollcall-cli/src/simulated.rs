//! Stand-in executor for dry runs.
//!
//! Each item fails a fixed number of times before signing in; once signed in,
//! later attempts report it as already done.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rollcall_core::ports::Executor;
use rollcall_core::{Item, Outcome};
use tokio_util::sync::CancellationToken;

pub struct SimulatedExecutor {
    failures: u32,
    latency: Option<Duration>,
    attempts: Mutex<HashMap<String, u32>>,
    signed_in: Mutex<HashSet<String>>,
}

impl SimulatedExecutor {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            latency: None,
            attempts: Mutex::new(HashMap::new()),
            signed_in: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn execute(&self, item: &Item, cancel: CancellationToken) -> Outcome {
        if let Some(latency) = self.latency {
            tokio::select! {
                _ = cancel.cancelled() => return Outcome::retryable("cancelled"),
                _ = tokio::time::sleep(latency) => {}
            }
        }

        let Ok(mut signed_in) = self.signed_in.lock() else {
            return Outcome::unknown("executor state poisoned");
        };
        if signed_in.contains(item.key()) {
            return Outcome::AlreadySatisfied;
        }

        let attempt = match self.attempts.lock() {
            Ok(mut attempts) => {
                let n = attempts.entry(item.key().to_string()).or_insert(0);
                *n += 1;
                *n
            }
            Err(_) => return Outcome::unknown("executor state poisoned"),
        };
        if attempt <= self.failures {
            return Outcome::retryable(format!(
                "simulated failure ({attempt}/{})",
                self.failures
            ));
        }

        signed_in.insert(item.key().to_string());
        Outcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::new("rust", "Rust")
    }

    #[tokio::test]
    async fn fails_then_succeeds_then_reports_done() {
        let executor = SimulatedExecutor::new(2);
        let token = CancellationToken::new();

        assert_eq!(
            executor.execute(&item(), token.clone()).await,
            Outcome::retryable("simulated failure (1/2)")
        );
        assert_eq!(
            executor.execute(&item(), token.clone()).await,
            Outcome::retryable("simulated failure (2/2)")
        );
        assert_eq!(executor.execute(&item(), token.clone()).await, Outcome::Success);
        assert_eq!(
            executor.execute(&item(), token).await,
            Outcome::AlreadySatisfied
        );
    }

    #[tokio::test]
    async fn items_are_counted_separately() {
        let executor = SimulatedExecutor::new(1);
        let token = CancellationToken::new();
        let other = Item::new("go", "Go");

        assert!(matches!(
            executor.execute(&item(), token.clone()).await,
            Outcome::RetryableFailure(_)
        ));
        assert!(matches!(
            executor.execute(&other, token.clone()).await,
            Outcome::RetryableFailure(_)
        ));
        assert_eq!(executor.execute(&other, token).await, Outcome::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_latency() {
        let executor = SimulatedExecutor::new(0).with_latency(Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(
            executor.execute(&item(), token).await,
            Outcome::retryable("cancelled")
        );
    }
}
