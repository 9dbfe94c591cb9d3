//! StartGate の実装
//!
//! # 学習ポイント
//! - 時刻は Clock から注入し、判定（`delay_at`）は純粋関数に切り出す
//! - `FixedOffset` によるサービス側タイムゾーンでの日付計算

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use crate::error::GateError;
use crate::ports::{Clock, StartGate};

/// Starts right away.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateGate;

#[async_trait]
impl StartGate for ImmediateGate {
    async fn await_start(&self) -> Result<(), GateError> {
        Ok(())
    }
}

/// Holds the run until the next day when started just before midnight.
///
/// Sign-ins made in the last minutes of a day would count for the day that is
/// about to end, so a run that starts inside `window` of midnight (measured in
/// the service's time zone, as reported by `clock`) sleeps until 00:00.
pub struct MidnightGate<C> {
    clock: C,
    offset: FixedOffset,
    window: Duration,
}

impl<C: Clock> MidnightGate<C> {
    /// Default window is four minutes: runs starting at 23:56 or later wait.
    pub fn new(clock: C, offset: FixedOffset) -> Self {
        Self {
            clock,
            offset,
            window: Duration::from_secs(4 * 60),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// How long to wait when the run starts at `now`, if at all.
    pub fn delay_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let local = now.with_timezone(&self.offset);
        let next_midnight = local
            .date_naive()
            .succ_opt()?
            .and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.offset)
            .single()?;
        let until = next_midnight.signed_duration_since(local).to_std().ok()?;
        (until <= self.window).then_some(until)
    }
}

#[async_trait]
impl<C: Clock> StartGate for MidnightGate<C> {
    async fn await_start(&self) -> Result<(), GateError> {
        let now = self.clock.now().await;
        match self.delay_at(now) {
            Some(delay) => {
                info!(now = %now.with_timezone(&self.offset), delay = ?delay, "close to midnight, waiting for the new day");
                tokio::time::sleep(delay).await;
            }
            None => debug!(now = %now.with_timezone(&self.offset), "start gate open"),
        }
        Ok(())
    }
}
