//! StartGate port - バッチ開始前の一回限りの待機

use async_trait::async_trait;

use crate::error::GateError;

/// Blocks until the run may start. May return at once.
#[async_trait]
pub trait StartGate: Send + Sync {
    async fn await_start(&self) -> Result<(), GateError>;
}
