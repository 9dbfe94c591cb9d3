//! Error types.
//!
//! Per-item failures are not errors: they are [`Outcome`](crate::domain::Outcome)s
//! and end up in the report. The types here cover the run as a whole and its
//! collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("utc offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The item list could not be produced. Fatal for the run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read item list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse item list {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("item source unavailable: {0}")]
    Unavailable(String),
}

/// The start gate could not be passed. Fatal for the run.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("start time could not be resolved: {0}")]
    Unresolved(String),
}

/// Reading a remote clock failed.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("clock request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response has no Date header")]
    MissingDate,

    #[error("invalid Date header {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },
}

/// The run report could not be persisted. Logged, never fatal.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that abort a run before any task is scheduled.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("start gate failed: {0}")]
    Gate(#[from] GateError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("run cancelled before scheduling")]
    Cancelled,
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Gate(_) => "run_gate_failed",
            RunError::Discovery(_) => "run_discovery_failed",
            RunError::Cancelled => "run_cancelled",
        }
    }

    /// Process exit status for this error. `0` and `1` are left to the
    /// runtime, `2` is reserved for configuration errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Gate(_) => 3,
            RunError::Discovery(_) => 4,
            RunError::Cancelled => 130,
        }
    }
}
