//! RunReport: the aggregate result handed to the reporter once a run is over.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RunId, Task};

/// Counts, duration and the per-item snapshot of one run.
///
/// Built once by the orchestrator after the collector finished; there are no
/// mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    run_id: RunId,
    started_at: DateTime<Utc>,
    succeeded: usize,
    failed: usize,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    duration: Duration,
    /// Snapshots in discovery order.
    tasks: Vec<Task>,
}

impl RunReport {
    pub fn new(
        run_id: RunId,
        started_at: DateTime<Utc>,
        duration: Duration,
        succeeded: usize,
        failed: usize,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            succeeded,
            failed,
            duration,
            tasks,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn task(&self, key: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.item().key() == key)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
