//! Knowledge retrieval for AgriSage
//!
//! This crate provides the question cascade together with local
//! implementations of the capabilities it consults: a hashed embedding
//! index, a keyword document cache and a JSON learning store.

mod document_cache;
mod engine;
mod intent;
mod knowledge;
mod learning_store;
mod text;
mod vector_store;

pub use document_cache::{DocumentFormat, LocalDocumentCache, extract_text};
pub use engine::{
    CascadeConfig, CascadeOutcome, CascadeStage, DOCUMENT_CONFIDENCE, DOCUMENT_TITLE, FALLBACK_CONFIDENCE,
    FALLBACK_TITLE, GENERATIVE_CONFIDENCE, KnowledgeCascade, LEARNED_CONFIDENCE, build_prompt, fallback_answer,
};
pub use intent::{IntentScope, RuleBasedIntentResponder};
pub use knowledge::{HardcodedTopic, IntentKind, IntentRule, IntentTable, KbEntry, KnowledgeData};
pub use learning_store::{DEFAULT_CANDIDATE_THRESHOLD, JsonLearningStore, reindex_learned};
pub use text::{question_words, title_from_question, truncate_chars};
pub use vector_store::{EMBEDDING_DIMENSION, LocalEmbeddingSearch, cosine_similarity};

// Re-export core types for convenience
pub use agri_core::{
    CapabilityRegistry, DocumentCache, EmbeddingSearch, Error, KnowledgeAnswer, LearningStore,
    Result, SourceKind,
};
