//! In-process store used by tests and by the bot when no database is configured.

use super::models::{PlayerRecord, RecordPatch};
use super::store::{PlayerStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<u64, PlayerRecord>>,
    failing_updates: AtomicU32,
    updates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` updates fail with `Unavailable`.
    pub fn fail_next_updates(&self, count: u32) {
        self.failing_updates.store(count, Ordering::SeqCst);
    }

    /// Number of successful updates so far.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self, user_id: u64) -> Option<PlayerRecord> {
        self.players.read().await.get(&user_id).cloned()
    }

    /// Replaces a record wholesale; for seeding test fixtures.
    pub async fn put(&self, record: PlayerRecord) {
        self.players.write().await.insert(record.user_id, record);
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn get_player(&self, user_id: u64) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.players.read().await.get(&user_id).cloned())
    }

    async fn insert_player(&self, record: &PlayerRecord) -> Result<PlayerRecord, StoreError> {
        let mut players = self.players.write().await;
        Ok(players
            .entry(record.user_id)
            .or_insert_with(|| record.clone())
            .clone())
    }

    async fn update_player(&self, user_id: u64, patch: &RecordPatch) -> Result<PlayerRecord, StoreError> {
        let pending = self.failing_updates.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_updates.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        let mut players = self.players.write().await;
        let record = players.get_mut(&user_id).ok_or(StoreError::NotFound(user_id))?;
        patch.apply_to(record);
        record.updated_at = Some(Utc::now());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }
}
