//! Document cache trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Text extracted from one knowledge document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_id: String,
    pub text: String,
    pub word_count: usize,
}

/// A keyword hit inside a cached document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentExcerpt {
    pub excerpt: String,
    pub source_id: String,
    pub score: usize,
}

/// Result of an indexing pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub documents_skipped: usize,
    pub errors: Vec<String>,
}

/// Trait for keyword lookups over cached document text
///
/// Readers must tolerate an index that is empty, partially built or
/// complete; a lookup against a half-built cache simply finds less.
#[async_trait]
pub trait DocumentCache: Send + Sync {
    /// Score cached documents against `words` and return the best `top_k`
    async fn lookup_by_keywords(&self, words: &[String], top_k: usize)
        -> Result<Vec<DocumentExcerpt>>;

    /// Number of documents currently cached
    async fn document_count(&self) -> Result<usize>;
}
