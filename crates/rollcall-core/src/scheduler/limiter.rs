//! Concurrency limiter: a counting permit pool in front of `execute()`.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Permit granted by the [`Limiter`]. Dropping it releases the slot.
pub type Permit = OwnedSemaphorePermit;

/// Bounds the number of simultaneous executions.
///
/// Backed by a tokio [`Semaphore`], which hands out permits in FIFO order.
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Limiter {
    /// `max_concurrency` of zero is treated as one.
    pub fn new(max_concurrency: usize) -> Self {
        let capacity = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free permit.
    ///
    /// Returns `None` only when `cancel` fires first. Cancellation wins over an
    /// available permit, so no new work starts once the run is cancelled.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<Permit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            res = Arc::clone(&self.semaphore).acquire_owned() => res.ok(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn acquire_blocks_at_capacity_until_release() {
        let limiter = Limiter::new(2);
        let token = CancellationToken::new();

        let p1 = limiter.acquire(&token).await.unwrap();
        let _p2 = limiter.acquire(&token).await.unwrap();
        assert_eq!(limiter.in_flight(), 2);

        let blocked =
            tokio::time::timeout(Duration::from_millis(20), limiter.acquire(&token)).await;
        assert!(blocked.is_err(), "third permit must wait");

        drop(p1);
        let p3 = tokio::time::timeout(Duration::from_millis(100), limiter.acquire(&token))
            .await
            .unwrap();
        assert!(p3.is_some());
        assert_eq!(limiter.in_flight(), 2);
    }

    #[tokio::test]
    async fn cancelled_acquire_returns_none() {
        let limiter = Limiter::new(1);
        let token = CancellationToken::new();
        token.cancel();

        assert!(limiter.acquire(&token).await.is_none());
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn cancel_wakes_a_waiting_acquire() {
        let limiter = Limiter::new(1);
        let token = CancellationToken::new();
        let _held = limiter.acquire(&token).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let token = token.clone();
            tokio::spawn(async move { limiter.acquire(&token).await.is_none() })
        };
        token.cancel();
        assert!(waiter.await.unwrap());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(Limiter::new(0).capacity(), 1);
    }
}
