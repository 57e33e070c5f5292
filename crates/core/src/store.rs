//! Persistence traits — the save/load contracts the orchestrator consumes.
//!
//! The message log is append-only and keyed by autoincrement id plus
//! timestamp; the orchestrator only ever saves rows, reads the most recent
//! N back in order, or clears the lot. Long-term memory is a separate
//! ranked-search contract and is only ever injected as read-only context.

use crate::error::StoreError;
use crate::message::{Message, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The append-only conversation log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one row to the log.
    async fn save_message(
        &self,
        role: Role,
        content: &str,
        tool_call_id: Option<&str>,
    ) -> std::result::Result<(), StoreError>;

    /// The most recent `count` rows, oldest first.
    async fn recent_messages(&self, count: usize) -> std::result::Result<Vec<Message>, StoreError>;

    /// Drop the entire log.
    async fn clear_messages(&self) -> std::result::Result<(), StoreError>;
}

/// A long-term memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,

    pub content: String,

    pub timestamp: DateTime<Utc>,

    /// Relevance score, set by search
    #[serde(default)]
    pub score: f32,
}

/// Long-term memory: save text, get a ranked list back.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a piece of text worth remembering.
    async fn save(&self, content: &str) -> std::result::Result<String, StoreError>;

    /// Ranked search, best match first, at most `limit` items.
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<MemoryItem>, StoreError>;
}
