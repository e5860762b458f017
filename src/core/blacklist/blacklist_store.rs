use super::blacklist_models::BlacklistKind;
use async_trait::async_trait;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the two block-lists.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Load one list. A missing document is created empty.
    async fn load(&self, kind: BlacklistKind) -> Result<HashSet<String>, StoreError>;

    /// Replace the stored list with `ids`.
    async fn save(&self, kind: BlacklistKind, ids: &HashSet<String>) -> Result<(), StoreError>;
}
