//! Static knowledge tables: curated topics, the keyword knowledge base and
//! the intent rules. The text lives in JSON resources compiled into the
//! binary; selection logic stays in code.

use agri_core::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

const HARDCODED_TOPICS: &str = include_str!("../resources/hardcoded_topics.json");
const KNOWLEDGE_BASE: &str = include_str!("../resources/knowledge_base.json");
const INTENTS: &str = include_str!("../resources/intents.json");

/// Points for a keyword found verbatim in the question
pub const PHRASE_HIT_SCORE: u32 = 10;
/// Points for each word of a multi-word keyword found in the question
pub const WORD_HIT_SCORE: u32 = 5;

/// Curated, authoritative topic text
#[derive(Debug, Clone, Deserialize)]
pub struct HardcodedTopic {
    pub id: String,
    pub title: String,
    pub triggers: Vec<String>,
    pub confidence: f32,
    #[serde(default)]
    pub sources: Vec<String>,
    pub answer: String,
}

impl HardcodedTopic {
    pub fn matches(&self, question_lower: &str) -> bool {
        self.triggers.iter().any(|t| question_lower.contains(t.as_str()))
    }
}

/// Keyword-scored knowledge base entry
#[derive(Debug, Clone, Deserialize)]
pub struct KbEntry {
    pub id: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub answer: String,
}

impl KbEntry {
    /// Keyword hit score against a lower-cased question.
    ///
    /// Single-character keywords are ignored. A keyword found as a substring
    /// scores 10; otherwise each of its words longer than one character that
    /// appears in the question scores 5.
    pub fn score(&self, question_lower: &str) -> u32 {
        let mut score = 0;
        for keyword in &self.keywords {
            if keyword.chars().count() <= 1 {
                continue;
            }
            if question_lower.contains(keyword.as_str()) {
                score += PHRASE_HIT_SCORE;
            } else {
                for word in keyword.split_whitespace() {
                    if word.chars().count() > 1 && question_lower.contains(word) {
                        score += WORD_HIT_SCORE;
                    }
                }
            }
        }
        score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Seasonal,
    Pest,
    Disease,
    Irrigation,
    Crop,
    SoilTesting,
}

/// One keyword-triggered intent of the rule-based responder
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRule {
    pub id: String,
    pub kind: IntentKind,
    pub triggers: Vec<String>,
    pub title: String,
    pub confidence: f32,
    /// Fixed answer text; `{region}` is filled in for seasonal rules
    #[serde(default)]
    pub answer: Option<String>,
    /// Crop name substituted for `{crop}` in a shared template
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl IntentRule {
    pub fn matches(&self, question_lower: &str) -> bool {
        self.triggers.iter().any(|t| question_lower.contains(t.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentTable {
    pub season_triggers: Vec<String>,
    pub region_triggers: Vec<String>,
    pub rules: Vec<IntentRule>,
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl IntentTable {
    /// Every rule must be able to produce text
    fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            match (&rule.answer, &rule.template) {
                (Some(_), _) => {}
                (None, Some(name)) if self.templates.contains_key(name) => {}
                (None, Some(name)) => {
                    return Err(Error::Configuration(format!(
                        "intent rule '{}' references unknown template '{}'",
                        rule.id, name
                    )));
                }
                (None, None) => {
                    return Err(Error::Configuration(format!(
                        "intent rule '{}' has neither answer nor template",
                        rule.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn has_season_trigger(&self, question_lower: &str) -> bool {
        self.season_triggers.iter().any(|t| question_lower.contains(t.as_str()))
    }

    pub fn has_region_trigger(&self, question_lower: &str) -> bool {
        self.region_triggers.iter().any(|t| question_lower.contains(t.as_str()))
    }
}

#[derive(Deserialize)]
struct TopicFile {
    topics: Vec<HardcodedTopic>,
}

#[derive(Deserialize)]
struct KbFile {
    entries: Vec<KbEntry>,
}

/// All static knowledge consulted by the cascade
#[derive(Debug, Clone)]
pub struct KnowledgeData {
    pub topics: Vec<HardcodedTopic>,
    pub entries: Vec<KbEntry>,
    pub intents: IntentTable,
}

impl KnowledgeData {
    /// Tables compiled into the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(HARDCODED_TOPICS, KNOWLEDGE_BASE, INTENTS)
    }

    pub fn from_json(topics: &str, knowledge_base: &str, intents: &str) -> Result<Self> {
        let topics: TopicFile = serde_json::from_str(topics)?;
        let kb: KbFile = serde_json::from_str(knowledge_base)?;
        let intents: IntentTable = serde_json::from_str(intents)?;
        intents.validate()?;

        Ok(Self {
            topics: topics.topics,
            entries: kb.entries,
            intents,
        })
    }

    /// First curated topic with a trigger in the question
    pub fn match_topic(&self, question_lower: &str) -> Option<&HardcodedTopic> {
        self.topics.iter().find(|t| t.matches(question_lower))
    }

    /// Highest-scoring knowledge base entry; the earlier entry wins ties
    pub fn best_entry(&self, question_lower: &str) -> Option<(&KbEntry, u32)> {
        let mut best: Option<(&KbEntry, u32)> = None;
        for entry in &self.entries {
            let score = entry.score(question_lower);
            if score > best.map(|(_, s)| s).unwrap_or(0) {
                best = Some((entry, score));
            }
        }
        best
    }
}
