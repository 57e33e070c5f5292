//! In-memory store — useful for tests and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use openpaw_core::error::StoreError;
use openpaw_core::message::{Message, Role};
use openpaw_core::store::{MemoryItem, MemoryStore, MessageStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Holds the message log and memories in Vecs behind an RwLock.
/// Implements both store traits so one instance can back a whole session.
pub struct InMemoryStore {
    messages: Arc<RwLock<Vec<Message>>>,
    memories: Arc<RwLock<Vec<MemoryItem>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            memories: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn save_message(
        &self,
        role: Role,
        content: &str,
        tool_call_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.messages.write().await.push(Message {
            role,
            content: content.to_string(),
            tool_call_id: tool_call_id.map(String::from),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn recent_messages(&self, count: usize) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.read().await;
        let start = messages.len().saturating_sub(count);
        Ok(messages[start..].to_vec())
    }

    async fn clear_messages(&self) -> Result<(), StoreError> {
        self.messages.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn save(&self, content: &str) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.memories.write().await.push(MemoryItem {
            id: id.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
            score: 0.0,
        });
        Ok(id)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryItem>, StoreError> {
        let memories = self.memories.read().await;
        Ok(crate::rank_by_keywords(&memories, query, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn message_log_roundtrip() {
        let store = InMemoryStore::new();
        store.save_message(Role::User, "hi", None).await.unwrap();
        store
            .save_message(Role::Model, "", Some("get_current_time"))
            .await
            .unwrap();

        let log = store.recent_messages(10).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "hi");
        assert!(log[1].is_call_intent());

        store.clear_messages().await.unwrap();
        assert!(store.recent_messages(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_returns_newest_oldest_first() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .save_message(Role::User, &format!("m{i}"), None)
                .await
                .unwrap();
        }
        let log = store.recent_messages(3).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].content, "m2");
        assert_eq!(log[2].content, "m4");
    }

    #[tokio::test]
    async fn memory_search_ranks_matches() {
        let store = InMemoryStore::new();
        store.save("the user lives in Lisbon").await.unwrap();
        store.save("nothing relevant here").await.unwrap();

        let results = store.search("lisbon", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("Lisbon"));
        assert!(results[0].score > 0.0);
    }
}
