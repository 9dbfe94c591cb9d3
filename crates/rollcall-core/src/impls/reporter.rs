//! Reporter の実装 - RunReport の出力先

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, FixedOffset, Offset, Utc};
use tracing::info;

use crate::domain::RunReport;
use crate::error::ReportError;
use crate::ports::Reporter;

/// Drops the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

#[async_trait]
impl Reporter for NoopReporter {
    async fn persist(&self, _report: &RunReport) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Writes `<dir>/<day-of-month>.json`.
///
/// Files are keyed by day of month, so a report overwrites the one from the
/// same day last month and the directory never holds more than a month.
#[derive(Debug, Clone)]
pub struct JsonFileReporter {
    dir: PathBuf,
    offset: FixedOffset,
}

impl JsonFileReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            offset: Utc.fix(),
        }
    }

    /// Time zone used to pick the day of month.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, report: &RunReport) -> PathBuf {
        let day = report.started_at().with_timezone(&self.offset).day();
        self.dir.join(format!("{day}.json"))
    }
}

#[async_trait]
impl Reporter for JsonFileReporter {
    async fn persist(&self, report: &RunReport) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ReportError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(report);
        let body = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), run_id = %report.run_id(), "run report written");
        Ok(())
    }
}
