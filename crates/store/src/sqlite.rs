//! SQLite store — a durable append-only message log plus a memories table.
//!
//! One database file with two tables:
//! - `messages` — the conversation log, keyed by autoincrement id
//! - `memories` — long-term memory entries, ranked by keyword relevance
//!   at search time

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openpaw_core::error::StoreError;
use openpaw_core::message::{Message, Role};
use openpaw_core::store::{MemoryItem, MemoryStore, MessageStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Durable SQLite-backed store for both contracts.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // One connection: SQLite serializes writes anyway, and a single
        // connection keeps `:memory:` databases coherent in tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                role         TEXT NOT NULL,
                content      TEXT NOT NULL DEFAULT '',
                tool_call_id TEXT,
                timestamp    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                id        TEXT PRIMARY KEY,
                content   TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("memories table: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn save_message(
        &self,
        role: Role,
        content: &str,
        tool_call_id: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO messages (role, content, tool_call_id, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(role.as_str())
        .bind(content)
        .bind(tool_call_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("insert message: {e}")))?;
        Ok(())
    }

    async fn recent_messages(&self, count: usize) -> Result<Vec<Message>, StoreError> {
        // Newest N rows, re-sorted oldest first for replay.
        let rows = sqlx::query(
            r#"
            SELECT role, content, tool_call_id, timestamp FROM (
                SELECT id, role, content, tool_call_id, timestamp FROM messages
                ORDER BY id DESC
                LIMIT ?
            )
            ORDER BY id ASC
            "#,
        )
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("recent messages: {e}")))?;

        rows.into_iter()
            .map(|row| {
                let role: String = row.get("role");
                let timestamp: String = row.get("timestamp");
                Ok(Message {
                    role: role
                        .parse()
                        .map_err(|e: String| StoreError::QueryFailed(e))?,
                    content: row.get("content"),
                    tool_call_id: row.get("tool_call_id"),
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .map_err(|e| StoreError::QueryFailed(format!("bad timestamp: {e}")))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    async fn clear_messages(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("clear messages: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn save(&self, content: &str) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO memories (id, content, timestamp) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(content)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("insert memory: {e}")))?;
        Ok(id)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryItem>, StoreError> {
        let rows = sqlx::query("SELECT id, content, timestamp FROM memories")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("search memories: {e}")))?;

        let items: Vec<MemoryItem> = rows
            .into_iter()
            .map(|row| {
                let timestamp: String = row.get("timestamp");
                Ok(MemoryItem {
                    id: row.get("id"),
                    content: row.get("content"),
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .map_err(|e| StoreError::QueryFailed(format!("bad timestamp: {e}")))?
                        .with_timezone(&Utc),
                    score: 0.0,
                })
            })
            .collect::<Result<_, StoreError>>()?;

        Ok(crate::rank_by_keywords(&items, query, limit))
    }
}
