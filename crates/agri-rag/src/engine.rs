//! Knowledge source cascade.
//!
//! A question is offered to each stage in a fixed priority order; the first
//! stage that produces an answer ends the walk. Capability failures are
//! logged and treated as "no answer" so the cascade always terminates with
//! an answer, at worst the fallback.

use agri_core::{CapabilityRegistry, KnowledgeAnswer, LearnedAnswer, Result, SourceKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::intent::{IntentScope, RuleBasedIntentResponder};
use crate::knowledge::KnowledgeData;
use crate::text::{question_words, title_from_question, truncate_chars};

pub const LEARNED_CONFIDENCE: f32 = 0.92;
pub const DOCUMENT_CONFIDENCE: f32 = 0.89;
pub const GENERATIVE_CONFIDENCE: f32 = 0.87;
pub const FALLBACK_CONFIDENCE: f32 = 0.15;

pub const DOCUMENT_TITLE: &str = "Agricultural Reference (from documents)";
pub const FALLBACK_TITLE: &str = "Information Not Available";

/// Cascade tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Minimum keyword score for a knowledge base entry
    pub kb_min_score: u32,
    /// Learned hits scoring below this are ignored
    pub learned_similarity_floor: f32,
    pub learned_top_k: usize,
    pub learned_answer_max_chars: usize,
    pub document_top_k: usize,
    pub document_answer_max_chars: usize,
    pub context_learned_top_k: usize,
    pub context_document_top_k: usize,
    pub context_max_parts: usize,
    /// Whether the generative stage may run at all
    pub use_generation: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            kb_min_score: 7,
            learned_similarity_floor: 0.5,
            learned_top_k: 2,
            learned_answer_max_chars: 700,
            document_top_k: 3,
            document_answer_max_chars: 1500,
            context_learned_top_k: 3,
            context_document_top_k: 2,
            context_max_parts: 3,
            use_generation: true,
        }
    }
}

/// Stages in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    Hardcoded,
    Seasonal,
    Learned,
    KnowledgeBase,
    IntentResponder,
    DocumentRetrieval,
    Generative,
    Fallback,
}

impl CascadeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeStage::Hardcoded => "hardcoded",
            CascadeStage::Seasonal => "seasonal",
            CascadeStage::Learned => "learned",
            CascadeStage::KnowledgeBase => "knowledge_base",
            CascadeStage::IntentResponder => "intent_responder",
            CascadeStage::DocumentRetrieval => "document_retrieval",
            CascadeStage::Generative => "generative",
            CascadeStage::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An answer plus the stages tried to reach it
#[derive(Debug, Clone, Serialize)]
pub struct CascadeOutcome {
    pub answer: KnowledgeAnswer,
    pub stage: CascadeStage,
    pub attempted: Vec<CascadeStage>,
}

/// Generation prompt, with a CONTEXT block when context is available
pub fn build_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "You are an expert agricultural consultant for Indian farming communities.\n\
             Answer this farming question as an expert, including:\n\
             - Specific crop/region recommendations if applicable\n\
             - Practical, actionable advice\n\
             - Measurements, quantities, or timings when relevant\n\
             - Cost or productivity information if asked\n\
             \n\
             QUESTION: {}\n\
             \n\
             ANSWER:",
            question
        )
    } else {
        format!(
            "You are an expert agricultural consultant for Indian farming communities.\n\
             Use the context below to answer accurately. If context doesn't fully answer, use your knowledge.\n\
             \n\
             CONTEXT:\n\
             {}\n\
             \n\
             QUESTION: {}\n\
             \n\
             ANSWER (specific, practical, with quantities/recommendations):",
            context, question
        )
    }
}

/// Terminal answer when no stage could help
pub fn fallback_answer(question: &str) -> KnowledgeAnswer {
    let text = format!(
        "I don't have specific information about '{}' in my knowledge base. \
         For expert guidance, please contact your local agricultural extension office. \
         You can also try asking about:\n\n\
         • Seasonal cultivation (when/how to plant)\n\
         • Soil testing and amendments\n\
         • Pest and disease management\n\
         • Crop-specific techniques\n\
         • Irrigation and water management\n\
         • Nutrient deficiencies\n\
         • Regional crop recommendations",
        question
    );
    KnowledgeAnswer::new(text, FALLBACK_TITLE, FALLBACK_CONFIDENCE, SourceKind::None)
        .with_source_count(0)
}

/// Answer part of a learned payload, if it has one
fn parse_learned_payload(text: &str) -> Option<&str> {
    let (_, answer) = LearnedAnswer::parse_payload(text)?;
    let answer = answer.trim();
    (!answer.is_empty()).then_some(answer)
}

/// Ordered knowledge source cascade
pub struct KnowledgeCascade {
    data: Arc<KnowledgeData>,
    intents: RuleBasedIntentResponder,
    capabilities: CapabilityRegistry,
    config: CascadeConfig,
}

impl KnowledgeCascade {
    pub fn new(data: Arc<KnowledgeData>, capabilities: CapabilityRegistry, config: CascadeConfig) -> Self {
        Self {
            intents: RuleBasedIntentResponder::new(Arc::clone(&data)),
            data,
            capabilities,
            config,
        }
    }

    /// Cascade over the built-in knowledge tables with default tunables
    pub fn builtin(capabilities: CapabilityRegistry) -> Result<Self> {
        Ok(Self::new(Arc::new(KnowledgeData::builtin()?), capabilities, CascadeConfig::default()))
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Answer a free-text question
    pub async fn answer(&self, question: &str) -> KnowledgeAnswer {
        self.resolve(question).await.answer
    }

    /// Answer a question and report which stages were tried
    pub async fn resolve(&self, question: &str) -> CascadeOutcome {
        let mut attempted = Vec::new();
        let q_lower = question.to_lowercase();

        attempted.push(CascadeStage::Hardcoded);
        if let Some(answer) = self.stage_hardcoded(&q_lower) {
            return Self::finish(CascadeStage::Hardcoded, answer, attempted);
        }

        attempted.push(CascadeStage::Seasonal);
        if self.intents.is_seasonal(question) {
            if let Some(answer) = self.intents.respond(question, IntentScope::All) {
                return Self::finish(CascadeStage::Seasonal, answer, attempted);
            }
        }

        if !question.trim().is_empty() {
            attempted.push(CascadeStage::Learned);
            if let Some(answer) = self.stage_learned(question).await {
                return Self::finish(CascadeStage::Learned, answer, attempted);
            }

            attempted.push(CascadeStage::KnowledgeBase);
            if let Some(answer) = self.stage_knowledge_base(&q_lower) {
                return Self::finish(CascadeStage::KnowledgeBase, answer, attempted);
            }

            attempted.push(CascadeStage::IntentResponder);
            if let Some(answer) = self.intents.respond(question, IntentScope::TopicalOnly) {
                return Self::finish(CascadeStage::IntentResponder, answer, attempted);
            }

            attempted.push(CascadeStage::DocumentRetrieval);
            if let Some(answer) = self.stage_documents(question).await {
                return Self::finish(CascadeStage::DocumentRetrieval, answer, attempted);
            }

            if self.config.use_generation && self.capabilities.generator.is_some() {
                attempted.push(CascadeStage::Generative);
                if let Some(answer) = self.stage_generative(question).await {
                    return Self::finish(CascadeStage::Generative, answer, attempted);
                }
            }
        }

        attempted.push(CascadeStage::Fallback);
        Self::finish(CascadeStage::Fallback, fallback_answer(question), attempted)
    }

    fn finish(stage: CascadeStage, answer: KnowledgeAnswer, attempted: Vec<CascadeStage>) -> CascadeOutcome {
        info!(
            stage = %stage,
            confidence = answer.confidence,
            title = %answer.title,
            "Question answered"
        );
        CascadeOutcome { answer, stage, attempted }
    }

    fn stage_hardcoded(&self, q_lower: &str) -> Option<KnowledgeAnswer> {
        let topic = self.data.match_topic(q_lower)?;
        Some(
            KnowledgeAnswer::new(&topic.answer, &topic.title, topic.confidence, SourceKind::Hardcoded)
                .with_sources(topic.sources.clone()),
        )
    }

    fn learned_answer(&self, answer: &str, title: &str) -> KnowledgeAnswer {
        KnowledgeAnswer::new(
            truncate_chars(answer, self.config.learned_answer_max_chars),
            title,
            LEARNED_CONFIDENCE,
            SourceKind::Learned,
        )
    }

    async fn stage_learned(&self, question: &str) -> Option<KnowledgeAnswer> {
        if let Some(search) = &self.capabilities.embeddings {
            match search.search(question, self.config.learned_top_k).await {
                Ok(hits) => {
                    let best = hits.first()?;
                    if best.score < self.config.learned_similarity_floor {
                        debug!(score = best.score, "Best learned hit below similarity floor");
                        return None;
                    }
                    return parse_learned_payload(&best.text)
                        .map(|a| self.learned_answer(a, title_from_question(question)));
                }
                Err(e) => warn!(error = %e, "Embedding search failed"),
            }
        }

        let learning = self.capabilities.learning.as_ref()?;
        match learning.recent_candidates(question).await {
            Ok(candidates) => candidates
                .first()
                .map(|record| self.learned_answer(&record.answer, &record.title)),
            Err(e) => {
                warn!(error = %e, "Learning store lookup failed");
                None
            }
        }
    }

    fn stage_knowledge_base(&self, q_lower: &str) -> Option<KnowledgeAnswer> {
        let (entry, score) = self.data.best_entry(q_lower)?;
        if score < self.config.kb_min_score {
            debug!(entry = %entry.id, score, "Knowledge base match below threshold");
            return None;
        }
        let confidence = (0.5 + score as f32 * 0.03).min(0.95);
        Some(KnowledgeAnswer::new(&entry.answer, &entry.title, confidence, SourceKind::KnowledgeBase))
    }

    async fn stage_documents(&self, question: &str) -> Option<KnowledgeAnswer> {
        let documents = self.capabilities.documents.as_ref()?;
        let words = question_words(question);
        if words.is_empty() {
            return None;
        }

        let hits = match documents.lookup_by_keywords(&words, self.config.document_top_k).await {
            Ok(hits) if !hits.is_empty() => hits,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Document cache lookup failed");
                return None;
            }
        };

        let mut sources: Vec<String> = Vec::new();
        for hit in &hits {
            if !sources.contains(&hit.source_id) {
                sources.push(hit.source_id.clone());
            }
        }
        let text = hits
            .iter()
            .map(|h| h.excerpt.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Some(
            KnowledgeAnswer::new(
                truncate_chars(&text, self.config.document_answer_max_chars),
                DOCUMENT_TITLE,
                DOCUMENT_CONFIDENCE,
                SourceKind::DocumentRetrieval,
            )
            .with_sources(sources),
        )
    }

    async fn generation_context(&self, question: &str) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(search) = &self.capabilities.embeddings {
            match search.search(question, self.config.context_learned_top_k).await {
                Ok(hits) => parts.extend(hits.into_iter().map(|h| h.text)),
                Err(e) => warn!(error = %e, "Embedding search failed while building context"),
            }
        }

        if let Some(documents) = &self.capabilities.documents {
            let words = question_words(question);
            if !words.is_empty() {
                match documents.lookup_by_keywords(&words, self.config.context_document_top_k).await {
                    Ok(hits) => parts.extend(hits.into_iter().map(|h| h.excerpt)),
                    Err(e) => warn!(error = %e, "Document lookup failed while building context"),
                }
            }
        }

        parts.truncate(self.config.context_max_parts);
        parts.join("\n\n")
    }

    async fn stage_generative(&self, question: &str) -> Option<KnowledgeAnswer> {
        let generator = self.capabilities.generator.as_ref()?;
        let context = self.generation_context(question).await;
        let prompt = build_prompt(question, &context);

        let text = match generator.generate(&prompt).await {
            Ok(result) => result.text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Generation failed");
                return None;
            }
        };
        if text.is_empty() {
            debug!("Generator returned empty text");
            return None;
        }

        let title = title_from_question(question);
        self.learn(LearnedAnswer::new(question, text.as_str(), title)).await;

        Some(KnowledgeAnswer::new(text, title, GENERATIVE_CONFIDENCE, SourceKind::Generative))
    }

    /// Persist an accepted answer and make it searchable
    async fn learn(&self, record: LearnedAnswer) {
        let (id, question, payload) = (record.id.clone(), record.question.clone(), record.payload());
        if let Some(learning) = &self.capabilities.learning {
            if let Err(e) = learning.append(record).await {
                warn!(error = %e, "Failed to store learned answer");
            }
        }
        if let Some(search) = &self.capabilities.embeddings {
            if let Err(e) = search.index(&id, &question, &payload).await {
                warn!(error = %e, "Failed to index learned answer");
            }
        }
    }
}
