//! Embedding search trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A search hit: stored payload text plus similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredText {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// Trait for embedding-backed similarity search
///
/// Entries are indexed under a search key; `search` compares the query with
/// the keys and returns the payload texts, best first. An empty index yields
/// an empty list, never an error.
#[async_trait]
pub trait EmbeddingSearch: Send + Sync {
    /// Index `text` so that it is found by queries similar to `key`
    async fn index(&self, id: &str, key: &str, text: &str) -> Result<()>;

    /// Return up to `top_k` entries ordered by descending score
    async fn search(&self, text: &str, top_k: usize) -> Result<Vec<ScoredText>>;

    /// Number of indexed entries
    async fn count(&self) -> Result<usize>;
}
