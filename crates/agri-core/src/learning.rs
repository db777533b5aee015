//! Learned answer store trait and types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// How many leading question words are kept as keywords
pub const LEARNED_KEYWORD_COUNT: usize = 5;

/// An accepted generative answer, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedAnswer {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub learned_at: DateTime<Utc>,
}

impl LearnedAnswer {
    /// Build a complete record ready to be published
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let question = question.into();
        let keywords = question
            .to_lowercase()
            .split_whitespace()
            .take(LEARNED_KEYWORD_COUNT)
            .map(str::to_string)
            .collect();

        Self {
            id: format!("learned_{}", Uuid::new_v4().simple()),
            question,
            answer: answer.into(),
            title: title.into(),
            keywords,
            learned_at: Utc::now(),
        }
    }

    /// Payload stored in the embedding index, parsed back by the cascade.
    ///
    /// The question is kept on one line so the first `"\nA: "` always
    /// separates it from the answer.
    pub fn payload(&self) -> String {
        let question = self.question.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("Q: {}\nA: {}", question, self.answer)
    }

    /// Split a payload back into `(question, answer)`
    pub fn parse_payload(payload: &str) -> Option<(&str, &str)> {
        let rest = payload.strip_prefix("Q: ")?;
        let (question, answer) = rest.split_once("\nA: ")?;
        Some((question, answer))
    }
}

/// Append-only store of accepted answers
///
/// Records are never updated or removed. Implementations must publish a
/// record only once it is complete so concurrent readers never observe a
/// partial write.
#[async_trait]
pub trait LearningStore: Send + Sync {
    /// Append a new record
    async fn append(&self, record: LearnedAnswer) -> Result<()>;

    /// Records whose questions resemble `question`, best match first
    async fn recent_candidates(&self, question: &str) -> Result<Vec<LearnedAnswer>>;

    /// All records in insertion order
    async fn all(&self) -> Result<Vec<LearnedAnswer>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_first_five_lowercase_words() {
        let record = LearnedAnswer::new(
            "How Do I Grow Saffron In Kashmir Valley",
            "Plant corms in August.",
            "How To Guide",
        );
        assert_eq!(record.keywords, vec!["how", "do", "i", "grow", "saffron"]);
        assert!(record.id.starts_with("learned_"));
    }

    #[test]
    fn test_payload_format() {
        let record = LearnedAnswer::new("what is biochar", "Charcoal for soil.", "Information");
        assert_eq!(record.payload(), "Q: what is biochar\nA: Charcoal for soil.");
    }

    #[test]
    fn test_payload_survives_colons_in_answer_and_question() {
        let record = LearnedAnswer::new(
            "Plan A: sow\nA: early?",
            "SOUTH INDIA: sow in August.\nA: not before rains. DATA: none.",
            "Information",
        );
        let payload = record.payload();
        assert_eq!(
            LearnedAnswer::parse_payload(&payload),
            Some(("Plan A: sow A: early?", record.answer.as_str()))
        );
        assert_eq!(LearnedAnswer::parse_payload("no markers here"), None);
    }
}
