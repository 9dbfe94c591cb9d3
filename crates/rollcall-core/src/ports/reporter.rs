//! Reporter port - RunReport の永続化

use async_trait::async_trait;

use crate::domain::RunReport;
use crate::error::ReportError;

/// Best-effort persistence. A failure here is logged by the orchestrator and
/// does not change the run's result.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn persist(&self, report: &RunReport) -> Result<(), ReportError>;
}
