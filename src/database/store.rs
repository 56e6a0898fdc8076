//! The storage port used by the adventure service.

use super::models::{PlayerRecord, RecordPatch};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Transient: the backend could not be reached or timed out. Retry later.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("player {0} not found")]
    NotFound(u64),
    /// The stored document could not be decoded or the patch could not be encoded.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get_player(&self, user_id: u64) -> Result<Option<PlayerRecord>, StoreError>;

    /// Inserts the record unless one already exists; returns whichever is stored.
    async fn insert_player(&self, record: &PlayerRecord) -> Result<PlayerRecord, StoreError>;

    /// Writes only the fields present in `patch` and returns the updated record.
    async fn update_player(&self, user_id: u64, patch: &RecordPatch) -> Result<PlayerRecord, StoreError>;
}
