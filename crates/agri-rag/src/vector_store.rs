//! Local hash-embedding search

use agri_core::{EmbeddingSearch, Error, Result, ScoredText};
use async_trait::async_trait;
use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use crate::text::is_stop_word;

pub const EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone)]
struct EmbeddedEntry {
    id: String,
    text: String,
    embedding: Vec<f32>,
}

/// In-memory embedding store using hashed bag-of-words and bigram features.
///
/// Deterministic within a process and needs no model download. Entries are
/// not persisted; callers re-index from their own records at start-up.
pub struct LocalEmbeddingSearch {
    dimension: usize,
    tokenizer: Regex,
    entries: RwLock<Vec<EmbeddedEntry>>,
}

impl LocalEmbeddingSearch {
    pub fn new() -> Result<Self> {
        let tokenizer = Regex::new(r"[\p{L}\p{N}]+")
            .map_err(|e| Error::Configuration(format!("Invalid token pattern: {}", e)))?;

        Ok(Self {
            dimension: EMBEDDING_DIMENSION,
            tokenizer,
            entries: RwLock::new(Vec::new()),
        })
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.tokenizer
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !is_stop_word(w))
            .map(str::to_string)
            .collect()
    }

    fn bucket(&self, hash: u64) -> usize {
        (hash % self.dimension as u64) as usize
    }

    /// Generate a normalised embedding for text
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let words = self.tokens(text);
        let mut embedding = vec![0.0f32; self.dimension];

        for word in &words {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let hash = hasher.finish();

            embedding[self.bucket(hash)] += 1.0;
            embedding[self.bucket(hash >> 16)] += 0.7;
            embedding[self.bucket(hash >> 32)] += 0.5;
        }

        for pair in words.windows(2) {
            let mut hasher = DefaultHasher::new();
            format!("{} {}", pair[0], pair[1]).hash(&mut hasher);
            let idx = self.bucket(hasher.finish());
            embedding[idx] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }
}

/// Cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[async_trait]
impl EmbeddingSearch for LocalEmbeddingSearch {
    async fn index(&self, id: &str, key: &str, text: &str) -> Result<()> {
        let entry = EmbeddedEntry {
            id: id.to_string(),
            text: text.to_string(),
            embedding: self.embed(key),
        };

        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        entries.retain(|e| e.id != id);
        entries.push(entry);
        Ok(())
    }

    async fn search(&self, text: &str, top_k: usize) -> Result<Vec<ScoredText>> {
        let query = self.embed(text);
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut scored: Vec<ScoredText> = entries
            .iter()
            .map(|entry| ScoredText {
                id: entry.id.clone(),
                text: entry.text.clone(),
                score: cosine_similarity(&query, &entry.embedding),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(entries.len())
    }
}
