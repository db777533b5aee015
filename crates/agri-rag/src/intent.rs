//! Rule-based intent responder for natural language questions

use agri_core::{KnowledgeAnswer, SourceKind};
use std::sync::Arc;
use tracing::debug;

use crate::knowledge::{IntentKind, IntentRule, KnowledgeData};

const DEFAULT_REGION: &str = "India";
const MATCHED_REGION: &str = "Karnataka";

/// Which rules a lookup may consider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentScope {
    /// Seasonal rules (when the question has timing vocabulary) then topical ones
    All,
    /// Pest, disease, irrigation, crop and soil-testing rules only
    TopicalOnly,
}

/// Ordered, first-match-wins keyword intents
pub struct RuleBasedIntentResponder {
    data: Arc<KnowledgeData>,
}

impl RuleBasedIntentResponder {
    pub fn new(data: Arc<KnowledgeData>) -> Self {
        Self { data }
    }

    /// True when the question carries season or timing vocabulary
    pub fn is_seasonal(&self, question: &str) -> bool {
        self.data.intents.has_season_trigger(&question.to_lowercase())
    }

    /// Answer from the first matching intent, or `None` when no trigger fires
    pub fn try_respond(&self, question: &str) -> Option<KnowledgeAnswer> {
        self.respond(question, IntentScope::All)
    }

    pub fn respond(&self, question: &str, scope: IntentScope) -> Option<KnowledgeAnswer> {
        let q = question.to_lowercase();
        let intents = &self.data.intents;
        let seasonal_allowed = scope == IntentScope::All && intents.has_season_trigger(&q);

        let rule = intents.rules.iter().find(|rule| {
            if rule.kind == IntentKind::Seasonal && !seasonal_allowed {
                return false;
            }
            rule.matches(&q)
        })?;

        debug!(intent = %rule.id, "Intent matched");
        self.render(rule, &q)
    }

    fn render(&self, rule: &IntentRule, question_lower: &str) -> Option<KnowledgeAnswer> {
        let intents = &self.data.intents;
        let (title, text) = match rule.kind {
            IntentKind::Crop => {
                let subject = rule.subject.as_deref().unwrap_or_default();
                let template = match (&rule.answer, &rule.template) {
                    (Some(answer), _) => answer,
                    (None, Some(name)) => intents.templates.get(name)?,
                    (None, None) => return None,
                };
                (
                    rule.title.replace("{crop}", subject),
                    template.replace("{crop}", subject),
                )
            }
            _ => {
                let region = if intents.has_region_trigger(question_lower) {
                    MATCHED_REGION
                } else {
                    DEFAULT_REGION
                };
                let answer = rule.answer.as_deref()?;
                (
                    rule.title.replace("{region}", region),
                    answer.replace("{region}", region),
                )
            }
        };

        Some(KnowledgeAnswer::new(text, title, rule.confidence, SourceKind::RuleBased))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> RuleBasedIntentResponder {
        RuleBasedIntentResponder::new(Arc::new(KnowledgeData::builtin().unwrap()))
    }

    #[test]
    fn test_seasonal_cabbage_with_region() {
        let answer = responder()
            .try_respond("When should I sow cabbage in Karnataka?")
            .unwrap();
        assert_eq!(answer.title, "Cabbage Cultivation - Best Season in Karnataka");
        assert_eq!(answer.confidence, 0.95);
        assert!(answer.answer.contains("Karnataka"));
        assert!(!answer.answer.contains("{region}"));
        assert_eq!(answer.source_kind, SourceKind::RuleBased);
    }

    #[test]
    fn test_seasonal_cabbage_defaults_to_india() {
        let answer = responder().try_respond("best month for cabbage").unwrap();
        assert_eq!(answer.title, "Cabbage Cultivation - Best Season in India");
    }

    #[test]
    fn test_cabbage_without_timing_is_a_crop_question() {
        let r = responder();
        assert!(!r.is_seasonal("cabbage yield per acre"));
        let answer = r.try_respond("cabbage yield per acre").unwrap();
        assert_eq!(answer.title, "Vegetables Cultivation & Management");
        assert!(answer.answer.starts_with("🌾 Vegetables Cultivation Guide"));
    }

    #[test]
    fn test_topical_scope_skips_seasonal_rules() {
        let answer = responder()
            .respond("when to sow cabbage", IntentScope::TopicalOnly)
            .unwrap();
        assert_eq!(answer.title, "Vegetables Cultivation & Management");
    }

    #[test]
    fn test_priority_order() {
        let r = responder();
        // pest outranks crop
        assert_eq!(
            r.try_respond("aphid attack on cotton").unwrap().title,
            "Pest Management & Prevention"
        );
        assert_eq!(
            r.try_respond("blight on potatoes").unwrap().title,
            "Disease Management & Treatment"
        );
        assert_eq!(r.try_respond("drip lines for sugarcane").unwrap().confidence, 0.82);
        assert_eq!(
            r.try_respond("maize yield").unwrap().title,
            "Maize Cultivation & Management"
        );
        assert_eq!(
            r.try_respond("compost heap").unwrap().title,
            "Soil Health & Fertility Management"
        );
    }

    #[test]
    fn test_no_intent() {
        assert!(responder().try_respond("saffron corm dormancy").is_none());
        assert!(responder().try_respond("").is_none());
    }
}
