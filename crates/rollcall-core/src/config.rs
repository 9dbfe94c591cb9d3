//! # Configuration.
//!
//! [`SchedulerConfig`] is what the scheduler consumes. [`Settings`] is the
//! on-disk JSON file a deployment edits; it converts into `SchedulerConfig`
//! through validation.
//!
//! ## Sentinel values
//! - `attempt_timeout = 0s` → no per-attempt timeout

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::domain::Item;
use crate::error::ConfigError;

/// Scheduler limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of `execute()` calls in flight at once.
    pub max_concurrency: usize,

    /// Maximum number of `execute()` calls per item.
    pub max_attempts: u32,

    /// Per-attempt timeout; `Duration::ZERO` disables it.
    pub attempt_timeout: Duration,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }

    /// Returns the per-attempt timeout as an `Option`.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.attempt_timeout == Duration::ZERO {
            None
        } else {
            Some(self.attempt_timeout)
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_attempts: 3,
            attempt_timeout: Duration::ZERO,
        }
    }
}

/// Which start gate to use before the batch starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    #[default]
    Immediate,
    /// Wait past midnight when started in the last minutes of the day.
    Midnight,
}

/// Deployment settings file.
///
/// `Thread` and `MaxTry` are accepted for the concurrency and attempt limits
/// so older config files keep working. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "Thread")]
    pub max_concurrency: usize,

    #[serde(alias = "MaxTry")]
    pub max_attempts: u32,

    pub attempt_timeout_secs: u64,

    /// Directory for run reports.
    pub report_dir: PathBuf,

    pub gate: GateKind,

    /// How close to midnight a start must be for the midnight gate to wait.
    pub gate_window_secs: u64,

    /// Offset of the remote service's local time, in whole hours.
    pub utc_offset_hours: i32,

    /// Host whose `Date` header is used as the reference clock.
    pub clock_url: Option<String>,

    /// JSON file with the item list. Takes precedence over `items`.
    pub items_file: Option<PathBuf>,

    pub items: Vec<Item>,
}

impl Default for Settings {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            max_concurrency: scheduler.max_concurrency,
            max_attempts: scheduler.max_attempts,
            attempt_timeout_secs: 0,
            report_dir: PathBuf::from("./log"),
            gate: GateKind::default(),
            gate_window_secs: 4 * 60,
            utc_offset_hours: 8,
            clock_url: None,
            items_file: None,
            items: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        let config = SchedulerConfig {
            max_concurrency: self.max_concurrency,
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn gate_window(&self) -> Duration {
        Duration::from_secs(self.gate_window_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_hours))
    }
}
