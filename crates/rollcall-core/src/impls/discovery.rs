//! Item の供給元（固定リスト / JSON ファイル）

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::Item;
use crate::error::DiscoveryError;
use crate::ports::Discovery;

/// A fixed list, typically from the settings file.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    items: Vec<Item>,
}

impl StaticDiscovery {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn discover(&self) -> Result<Vec<Item>, DiscoveryError> {
        Ok(dedup_by_key(self.items.clone()))
    }
}

/// Reads a JSON array of `{"key": ..., "name": ...}` objects.
#[derive(Debug, Clone)]
pub struct JsonFileDiscovery {
    path: PathBuf,
}

impl JsonFileDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Discovery for JsonFileDiscovery {
    async fn discover(&self) -> Result<Vec<Item>, DiscoveryError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DiscoveryError::Read {
                path: self.path.clone(),
                source,
            })?;
        let items: Vec<Item> =
            serde_json::from_str(&raw).map_err(|source| DiscoveryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let items = dedup_by_key(items);
        info!(path = %self.path.display(), count = items.len(), "items loaded");
        Ok(items)
    }
}

/// Keeps the first occurrence of every key so one item never becomes two
/// concurrent tasks.
fn dedup_by_key(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.key().to_string());
            if !fresh {
                warn!(key = item.key(), "duplicate item dropped");
            }
            fresh
        })
        .collect()
}
