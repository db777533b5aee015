//! JSON-file store of accepted generative answers

use agri_core::{EmbeddingSearch, Error, LearnedAnswer, LearningStore, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::text::question_words;

/// Minimum share of question words a stored question must contain
pub const DEFAULT_CANDIDATE_THRESHOLD: f32 = 0.6;

/// Append-only learned answer store persisted as a pretty JSON array.
///
/// Writers are serialised and each write replaces the file atomically
/// (temp file in the same directory, then rename). A record is visible to
/// readers only after it has been persisted in full.
pub struct JsonLearningStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<Arc<LearnedAnswer>>>,
    write_lock: Mutex<()>,
    candidate_threshold: f32,
}

impl JsonLearningStore {
    /// Open a store, loading any records already on disk
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            Self::load(&path)?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), records = records.len(), "Opened learning store");
        Ok(Self {
            path: Some(path),
            records: RwLock::new(records.into_iter().map(Arc::new).collect()),
            write_lock: Mutex::new(()),
            candidate_threshold: DEFAULT_CANDIDATE_THRESHOLD,
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
            candidate_threshold: DEFAULT_CANDIDATE_THRESHOLD,
        }
    }

    pub fn with_candidate_threshold(mut self, threshold: f32) -> Self {
        self.candidate_threshold = threshold;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(path: &Path) -> Result<Vec<LearnedAnswer>> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| Error::LearningStore(format!("{}: {}", path.display(), e)))
    }

    fn snapshot(&self) -> Result<Vec<Arc<LearnedAnswer>>> {
        let records = self
            .records
            .read()
            .map_err(|e| Error::LearningStore(format!("Lock error: {}", e)))?;
        Ok(records.clone())
    }

    fn persist(path: &Path, records: &[Arc<LearnedAnswer>]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let plain: Vec<&LearnedAnswer> = records.iter().map(|r| r.as_ref()).collect();
        let json = serde_json::to_string_pretty(&plain)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        file.persist(path)
            .map_err(|e| Error::LearningStore(format!("Failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Share of the query's words that also appear in the stored question
fn word_overlap(query_words: &[String], stored: &str) -> f32 {
    if query_words.is_empty() {
        return 0.0;
    }
    let stored_words = question_words(stored);
    let matches = query_words.iter().filter(|w| stored_words.contains(w)).count();
    matches as f32 / query_words.len() as f32
}

#[async_trait]
impl LearningStore for JsonLearningStore {
    async fn append(&self, record: LearnedAnswer) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let record = Arc::new(record);

        if let Some(path) = &self.path {
            let mut next = self.snapshot()?;
            next.push(Arc::clone(&record));
            Self::persist(path, &next)?;
        }

        let mut records = self
            .records
            .write()
            .map_err(|e| Error::LearningStore(format!("Lock error: {}", e)))?;
        info!(id = %record.id, total = records.len() + 1, "Learned new answer");
        records.push(record);
        Ok(())
    }

    async fn recent_candidates(&self, question: &str) -> Result<Vec<LearnedAnswer>> {
        let query_words = question_words(question);
        let records = self.snapshot()?;

        let mut scored: Vec<(Arc<LearnedAnswer>, f32)> = records
            .into_iter()
            .map(|r| {
                let score = word_overlap(&query_words, &r.question);
                (r, score)
            })
            .filter(|(_, score)| *score >= self.candidate_threshold && *score > 0.0)
            .collect();

        // Newest first among equal scores
        scored.reverse();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().map(|(r, _)| r.as_ref().clone()).collect())
    }

    async fn all(&self) -> Result<Vec<LearnedAnswer>> {
        Ok(self.snapshot()?.iter().map(|r| r.as_ref().clone()).collect())
    }
}

/// Index every learned answer into the embedding search so lookups work
/// across restarts. Returns how many records were indexed.
pub async fn reindex_learned(learning: &dyn LearningStore, search: &dyn EmbeddingSearch) -> Result<usize> {
    let records = learning.all().await?;
    let mut indexed = 0;
    for record in &records {
        match search.index(&record.id, &record.question, &record.payload()).await {
            Ok(()) => indexed += 1,
            Err(e) => warn!(id = %record.id, error = %e, "Failed to index learned answer"),
        }
    }
    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::LocalEmbeddingSearch;
    use insta::assert_yaml_snapshot;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_append_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("learned_kb.json");

        let store = JsonLearningStore::open(&path).unwrap();
        store
            .append(LearnedAnswer::new("explain saffron corm dormancy", "Corms rest in summer.", "Agricultural Information"))
            .await
            .unwrap();
        store
            .append(LearnedAnswer::new("vanilla curing steps", "Sweat and dry the beans.", "Agricultural Information"))
            .await
            .unwrap();
        assert_eq!(store.all().await.unwrap().len(), 2);

        let reopened = JsonLearningStore::open(&path).unwrap();
        let records = reopened.all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "explain saffron corm dormancy");
        assert_eq!(records[1].keywords, vec!["vanilla", "curing", "steps"]);
    }

    #[tokio::test]
    async fn test_empty_file_opens_as_empty_store() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = JsonLearningStore::open(temp_file.path()).unwrap();
        assert!(store.all().await.unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{not json").unwrap();
        assert!(matches!(
            JsonLearningStore::open(temp_file.path()),
            Err(Error::LearningStore(_))
        ));
    }

    fn assert_complete(record: &LearnedAnswer) {
        let n = record.question.trim_start_matches("saffron field ");
        assert_eq!(record.answer, format!("Harvest plot {} at dawn.", n));
        assert_eq!(record.title, "Agricultural Information");
        assert_eq!(record.keywords.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_and_reads() {
        const WRITERS: usize = 8;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learned.json");
        let store = Arc::new(JsonLearningStore::open(&path).unwrap());

        let mut writers = Vec::new();
        for i in 0..WRITERS {
            let store = Arc::clone(&store);
            writers.push(tokio::spawn(async move {
                let record = LearnedAnswer::new(
                    format!("saffron field {}", i),
                    format!("Harvest plot {} at dawn.", i),
                    "Agricultural Information",
                );
                store.append(record).await.unwrap();
            }));
        }

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move {
                let mut seen = 0;
                for _ in 0..50 {
                    let records = store.all().await.unwrap();
                    assert!(records.len() >= seen);
                    seen = records.len();
                    records.iter().for_each(assert_complete);
                    store
                        .recent_candidates("saffron field")
                        .await
                        .unwrap()
                        .iter()
                        .for_each(assert_complete);
                    tokio::task::yield_now().await;
                }
            }));
        }

        for handle in writers.into_iter().chain(readers) {
            handle.await.unwrap();
        }

        assert_eq!(store.all().await.unwrap().len(), WRITERS);
        let reopened = JsonLearningStore::open(&path).unwrap().all().await.unwrap();
        assert_eq!(reopened.len(), WRITERS);
        reopened.iter().for_each(assert_complete);
        let mut questions: Vec<_> = reopened.iter().map(|r| r.question.clone()).collect();
        questions.sort();
        questions.dedup();
        assert_eq!(questions.len(), WRITERS);
    }

    #[tokio::test]
    async fn test_recent_candidates_by_word_overlap() {
        let store = JsonLearningStore::in_memory();
        store
            .append(LearnedAnswer::new("saffron corm dormancy", "old", "Agricultural Information"))
            .await
            .unwrap();
        store
            .append(LearnedAnswer::new("vanilla curing steps", "x", "Agricultural Information"))
            .await
            .unwrap();
        store
            .append(LearnedAnswer::new("explain saffron corm dormancy", "new", "Information"))
            .await
            .unwrap();

        let hits = store.recent_candidates("saffron corm dormancy").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].answer, "new");
        assert!(store.recent_candidates("quinoa").await.unwrap().is_empty());
        assert!(store.recent_candidates("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reindex_into_embedding_search() {
        let store = JsonLearningStore::in_memory();
        store
            .append(LearnedAnswer::new("saffron corm dormancy", "Corms rest.", "Agricultural Information"))
            .await
            .unwrap();
        let search = LocalEmbeddingSearch::new().unwrap();

        assert_eq!(reindex_learned(&store, &search).await.unwrap(), 1);
        let hits = search.search("saffron corm dormancy", 1).await.unwrap();
        assert_eq!(hits[0].text, "Q: saffron corm dormancy\nA: Corms rest.");
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learned.json");
        let store = JsonLearningStore::open(&path).unwrap();
        store
            .append(LearnedAnswer::new("What is biochar", "Charcoal for soil.", "Information"))
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_yaml_snapshot!(value, {
            "[].id" => "[id]",
            "[].learned_at" => "[timestamp]",
        }, @r#"
        - answer: Charcoal for soil.
          id: "[id]"
          keywords:
            - what
            - is
            - biochar
          learned_at: "[timestamp]"
          question: What is biochar
          title: Information
        "#);
    }
}
