//! Discovery port - 実行対象 Item の列挙

use async_trait::async_trait;

use crate::domain::Item;
use crate::error::DiscoveryError;

/// Enumerates the items to process, in a stable order.
///
/// Errors are not retried at this layer; they abort the run.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<Item>, DiscoveryError>;
}
