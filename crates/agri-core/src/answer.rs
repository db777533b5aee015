//! Knowledge answers returned by the question cascade

use serde::{Deserialize, Serialize};

/// Which kind of source produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Curated topic text matched by trigger keywords
    Hardcoded,
    /// A previously accepted generative answer
    Learned,
    /// Keyword-scored entry of the static knowledge base
    KnowledgeBase,
    /// Template chosen by the intent responder
    RuleBased,
    /// Excerpts from cached document text
    DocumentRetrieval,
    /// Freshly generated by the LLM backend
    Generative,
    /// Terminal fallback, nothing answered
    None,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Hardcoded => "hardcoded",
            SourceKind::Learned => "learned",
            SourceKind::KnowledgeBase => "knowledge_base",
            SourceKind::RuleBased => "rule_based",
            SourceKind::DocumentRetrieval => "document_retrieval",
            SourceKind::Generative => "generative",
            SourceKind::None => "none",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answer to a free-text question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    pub answer: String,
    pub title: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
    pub source_count: usize,
    pub sources: Vec<String>,
    pub source_kind: SourceKind,
}

impl KnowledgeAnswer {
    /// Create an answer backed by a single unnamed source
    pub fn new(
        answer: impl Into<String>,
        title: impl Into<String>,
        confidence: f32,
        source_kind: SourceKind,
    ) -> Self {
        Self {
            answer: answer.into(),
            title: title.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source_count: 1,
            sources: Vec::new(),
            source_kind,
        }
    }

    /// Attach named sources; the source count follows the list
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        if !sources.is_empty() {
            self.source_count = sources.len();
        }
        self.sources = sources;
        self
    }

    /// Override the source count
    pub fn with_source_count(mut self, source_count: usize) -> Self {
        self.source_count = source_count;
        self
    }

    /// True when no stage could answer
    pub fn is_fallback(&self) -> bool {
        self.source_kind == SourceKind::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_source_kind_names() {
        assert_eq!(SourceKind::KnowledgeBase.to_string(), "knowledge_base");
        assert_eq!(SourceKind::DocumentRetrieval.as_str(), "document_retrieval");
        assert_eq!(SourceKind::None.as_str(), "none");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let answer = KnowledgeAnswer::new("text", "Title", 1.7, SourceKind::Generative);
        assert_eq!(answer.confidence, 1.0);
    }

    #[test]
    fn test_sources_drive_count() {
        let answer = KnowledgeAnswer::new("text", "Title", 0.89, SourceKind::DocumentRetrieval)
            .with_sources(vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert_eq!(answer.source_count, 2);

        let answer = KnowledgeAnswer::new("text", "Title", 0.15, SourceKind::None)
            .with_source_count(0);
        assert_eq!(answer.source_count, 0);
        assert!(answer.is_fallback());
    }

    #[test]
    fn test_answer_snapshot() {
        let answer = KnowledgeAnswer::new("Lime raises pH.", "Acid Soil", 0.5, SourceKind::KnowledgeBase);
        assert_yaml_snapshot!(answer, @r###"
        answer: Lime raises pH.
        title: Acid Soil
        confidence: 0.5
        source_count: 1
        sources: []
        source_kind: knowledge_base
        "###);
    }
}
