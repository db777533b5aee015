//! Explicit registry of the external capabilities consumed by the cascade

use serde::Serialize;
use std::sync::Arc;

use crate::{DocumentCache, EmbeddingSearch, LLMProvider, LearningStore};

/// External capabilities the question cascade can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EmbeddingSearch,
    GenerativeText,
    DocumentCache,
    LearningStore,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::EmbeddingSearch,
        Capability::GenerativeText,
        Capability::DocumentCache,
        Capability::LearningStore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::EmbeddingSearch => "embedding search",
            Capability::GenerativeText => "generative text",
            Capability::DocumentCache => "document cache",
            Capability::LearningStore => "learning store",
        }
    }
}

/// Whether one capability is configured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityStatus {
    pub capability: Capability,
    pub available: bool,
    pub detail: Option<String>,
}

/// Capabilities constructed once at start-up and handed to the cascade
///
/// A capability that is `None` was not configured; the cascade checks
/// availability up front instead of discovering it at call time.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    pub embeddings: Option<Arc<dyn EmbeddingSearch>>,
    pub generator: Option<Arc<dyn LLMProvider>>,
    pub documents: Option<Arc<dyn DocumentCache>>,
    pub learning: Option<Arc<dyn LearningStore>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embeddings(mut self, embeddings: Arc<dyn EmbeddingSearch>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn LLMProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_documents(mut self, documents: Arc<dyn DocumentCache>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_learning(mut self, learning: Arc<dyn LearningStore>) -> Self {
        self.learning = Some(learning);
        self
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        match capability {
            Capability::EmbeddingSearch => self.embeddings.is_some(),
            Capability::GenerativeText => self.generator.is_some(),
            Capability::DocumentCache => self.documents.is_some(),
            Capability::LearningStore => self.learning.is_some(),
        }
    }

    /// Availability of every capability, in a fixed order
    pub fn status(&self) -> Vec<CapabilityStatus> {
        Capability::ALL
            .iter()
            .map(|&capability| CapabilityStatus {
                capability,
                available: self.is_available(capability),
                detail: match capability {
                    Capability::GenerativeText => {
                        self.generator.as_ref().map(|g| g.model_id().to_string())
                    }
                    _ => None,
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("embeddings", &self.embeddings.is_some())
            .field("generator", &self.generator.is_some())
            .field("documents", &self.documents.is_some())
            .field("learning", &self.learning.is_some())
            .finish()
    }
}
