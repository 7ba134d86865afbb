//! In-memory session store
//!
//! Each evaluation owns an independent record; sessions share nothing but
//! the map itself, so horizontal concurrency needs no locking beyond it.
//! The stored record is always the last committed checkpoint; a failed
//! step never reaches the store.

use packeval_types::{EvaluationId, EvaluationRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Map of live and completed evaluation sessions
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<EvaluationId, EvaluationRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest committed checkpoint for a session
    pub async fn upsert(&self, record: EvaluationRecord) {
        self.sessions
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    /// Fetch a session's checkpoint
    pub async fn get(&self, id: &EvaluationId) -> Option<EvaluationRecord> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session (aborted or archived)
    pub async fn remove(&self, id: &EvaluationId) -> Option<EvaluationRecord> {
        self.sessions.write().await.remove(id)
    }

    /// All checkpoints, unordered
    pub async fn list(&self) -> Vec<EvaluationRecord> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_get_remove() {
        let store = SessionStore::new();
        let record = EvaluationRecord::new("concept", vec![]);
        let id = record.id.clone();

        store.upsert(record).await;
        assert_eq!(store.count().await, 1);
        assert!(store.get(&id).await.is_some());

        store.remove(&id).await;
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_checkpoint() {
        let store = SessionStore::new();
        let mut record = EvaluationRecord::new("concept", vec![]);
        let id = record.id.clone();
        store.upsert(record.clone()).await;

        record.add_message("concept_breaker", "done");
        store.upsert(record).await;

        assert_eq!(store.get(&id).await.unwrap().messages().len(), 1);
        assert_eq!(store.count().await, 1);
    }
}
