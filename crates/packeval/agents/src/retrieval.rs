//! The retrieval collaborator contract
//!
//! The knowledge base behind this trait holds machine, material, and
//! process specifications. A step submits a query string and receives a
//! ranked sequence of passages; ranking quality is the collaborator's
//! problem, not the orchestrator's.

use async_trait::async_trait;
use packeval_types::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One ranked retrieval result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// The passage content
    pub content: String,
    /// Source metadata (entry kind, machine/material name, ...)
    pub metadata: HashMap<String, String>,
    /// Relevance score, higher is better
    pub score: f64,
}

impl RetrievedPassage {
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            score,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Ranked search over the manufacturing knowledge base
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, CollaboratorError>;
}

/// Retrieval stub returning no passages. Used when no knowledge base is
/// configured; the assessment steps then reason from the components alone.
#[derive(Debug, Default)]
pub struct NoopRetrieval;

#[async_trait]
impl RetrievalClient for NoopRetrieval {
    async fn search(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<RetrievedPassage>, CollaboratorError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_retrieval_is_empty() {
        let passages = NoopRetrieval.search("corrugated liners", 5).await.unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_passage_metadata() {
        let passage = RetrievedPassage::new("BOPP film, 20-40 micron", 0.92)
            .with_metadata("kind", "material")
            .with_metadata("name", "BOPP film");
        assert_eq!(passage.metadata.get("kind").unwrap(), "material");
    }
}
