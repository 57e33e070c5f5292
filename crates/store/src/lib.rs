//! Store implementations for OpenPaw: the append-only message log and the
//! long-term memory contract, backed by SQLite or plain memory.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

use openpaw_core::store::MemoryItem;

/// Keyword relevance ranking shared by the backends: score is match count
/// normalized by content length, best first, at most `limit` items.
pub(crate) fn rank_by_keywords(items: &[MemoryItem], query: &str, limit: usize) -> Vec<MemoryItem> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return Vec::new();
    }

    let terms: Vec<&str> = query_lower.split_whitespace().collect();

    let mut results: Vec<MemoryItem> = items
        .iter()
        .filter_map(|item| {
            let content_lower = item.content.to_lowercase();
            let occurrences: usize = terms
                .iter()
                .map(|t| content_lower.matches(t).count())
                .sum();
            if occurrences == 0 {
                return None;
            }
            let mut ranked = item.clone();
            ranked.score = occurrences as f32 / (item.content.len() as f32 / 100.0).max(1.0);
            Some(ranked)
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(content: &str) -> MemoryItem {
        MemoryItem {
            id: content.into(),
            content: content.into(),
            timestamp: Utc::now(),
            score: 0.0,
        }
    }

    #[test]
    fn ranking_prefers_denser_matches() {
        let items = vec![
            item("rust rust rust"),
            item("a single mention of rust in a much longer sentence about other things"),
            item("unrelated"),
        ];
        let results = rank_by_keywords(&items, "rust", 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "rust rust rust");
    }

    #[test]
    fn empty_query_matches_nothing() {
        let items = vec![item("anything")];
        assert!(rank_by_keywords(&items, "   ", 10).is_empty());
    }

    #[test]
    fn limit_is_respected() {
        let items: Vec<_> = (0..10).map(|i| item(&format!("rust {i}"))).collect();
        assert_eq!(rank_by_keywords(&items, "rust", 3).len(), 3);
    }
}
