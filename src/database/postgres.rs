//! Postgres store: one JSONB document per player in the `players` table.
//!
//! Updates merge the serialized patch into the stored document with `||`, so
//! only the fields present in the patch change. Transient failures (pool
//! timeouts, dropped connections) are retried with exponential backoff.

use super::models::{PlayerRecord, RecordPatch};
use super::store::{PlayerStore, StoreError};
use crate::constants::{STORE_BACKOFF_BASE_MS, STORE_MAX_ATTEMPTS};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const SCHEMA: &str = include_str!("../../migrations/0001_players.sql");

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn is_transient(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
    )
}

fn to_store_error(user_id: u64, e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound(user_id),
        sqlx::Error::ColumnDecode { source, .. } => StoreError::Malformed(source.to_string()),
        sqlx::Error::Decode(source) => StoreError::Malformed(source.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

fn decode(user_id: u64, data: Value) -> Result<PlayerRecord, StoreError> {
    let mut record: PlayerRecord =
        serde_json::from_value(data).map_err(|e| StoreError::Malformed(e.to_string()))?;
    record.user_id = user_id;
    Ok(record)
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `players` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, user_id: u64, mut run: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let mut attempt = 1;
        loop {
            match run().await {
                Ok(v) => return Ok(v),
                Err(e) if is_transient(&e) && attempt < STORE_MAX_ATTEMPTS => {
                    let backoff = STORE_BACKOFF_BASE_MS * 2_u64.pow(attempt - 1);
                    warn!(target = "store", op, user_id, attempt, backoff_ms = backoff, error = %e, "transient store error, retrying");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(target = "store", op, user_id, attempt, error = %e, "store operation failed");
                    return Err(to_store_error(user_id, e));
                }
            }
        }
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn get_player(&self, user_id: u64) -> Result<Option<PlayerRecord>, StoreError> {
        let id = user_id as i64;
        let data = self
            .with_retry("get_player", user_id, || {
                sqlx::query_scalar::<_, Value>("SELECT data FROM players WHERE user_id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
            })
            .await?;
        data.map(|d| decode(user_id, d)).transpose()
    }

    async fn insert_player(&self, record: &PlayerRecord) -> Result<PlayerRecord, StoreError> {
        let id = record.user_id as i64;
        let doc = serde_json::to_value(record).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.with_retry("insert_player", record.user_id, || {
            sqlx::query("INSERT INTO players (user_id, data) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
                .bind(id)
                .bind(&doc)
                .execute(&self.pool)
        })
        .await?;
        debug!(target = "store", user_id = record.user_id, "player inserted");
        self.get_player(record.user_id)
            .await?
            .ok_or(StoreError::NotFound(record.user_id))
    }

    async fn update_player(&self, user_id: u64, patch: &RecordPatch) -> Result<PlayerRecord, StoreError> {
        let id = user_id as i64;
        let mut doc = serde_json::to_value(patch).map_err(|e| StoreError::Malformed(e.to_string()))?;
        if let Value::Object(fields) = &mut doc {
            fields.insert("updated_at".to_string(), serde_json::json!(Utc::now()));
        }
        let data = self
            .with_retry("update_player", user_id, || {
                sqlx::query_scalar::<_, Value>(
                    "UPDATE players SET data = data || $2, updated_at = now() WHERE user_id = $1 RETURNING data",
                )
                .bind(id)
                .bind(&doc)
                .fetch_optional(&self.pool)
            })
            .await?;
        match data {
            Some(d) => decode(user_id, d),
            None => Err(StoreError::NotFound(user_id)),
        }
    }
}
