//! Core traits and types for agrisage
//!
//! This crate defines the value types shared by the fertility and knowledge
//! crates, plus the capability-facing interfaces (LLM provider, embedding
//! search, document cache, learning store) that the question cascade consumes
//! as black boxes. Concrete implementations live in the other crates and are
//! wired together through [`CapabilityRegistry`].

pub mod answer;
pub mod capability;
pub mod document_cache;
pub mod error;
pub mod learning;
pub mod llm;
pub mod vector_store;

pub use answer::{KnowledgeAnswer, SourceKind};
pub use capability::{Capability, CapabilityRegistry, CapabilityStatus};
pub use document_cache::{Document, DocumentCache, DocumentExcerpt, IndexingResult};
pub use error::{Error, Result};
pub use learning::{LearnedAnswer, LearningStore, LEARNED_KEYWORD_COUNT};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use vector_store::{EmbeddingSearch, ScoredText};
