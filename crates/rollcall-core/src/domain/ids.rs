//! Run identifiers.
//!
//! A run is identified by a ULID so report files and log lines sort by start
//! time. The timestamp part comes from the injected clock, so tests with a
//! fixed clock get predictable prefixes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    /// Generate a new id whose timestamp part is `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        let timestamp_ms = at.timestamp_millis().max(0) as u64;
        Self(Ulid::from_parts(timestamp_ms, rand::random()))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_from_same_instant_differ_but_share_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let a = RunId::at(at);
        let b = RunId::at(at);

        assert_ne!(a, b);
        assert_eq!(a.as_ulid().timestamp_ms(), at.timestamp_millis() as u64);
        assert_eq!(b.as_ulid().timestamp_ms(), at.timestamp_millis() as u64);
    }

    #[test]
    fn display_has_prefix() {
        let id = RunId::at(Utc::now());
        assert!(id.to_string().starts_with("run-"));
    }
}
