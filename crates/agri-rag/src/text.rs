//! Small text helpers shared by the retrieval stages

/// Words ignored when matching questions against documents
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "of", "to", "is", "are", "was", "were", "be",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lower-cased question words with stop words removed, first occurrence order
pub fn question_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for raw in text.to_lowercase().split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() || is_stop_word(word) {
            continue;
        }
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Title for answers whose source carries none
pub fn title_from_question(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("how") {
        "How To Guide"
    } else if q.contains("what") {
        "Information"
    } else if q.contains("when") {
        "Timing Guide"
    } else if q.contains("which") || q.contains("best") {
        "Recommendation"
    } else if q.contains("why") {
        "Explanation"
    } else if q.contains("problem") || q.contains("issue") {
        "Solution"
    } else {
        "Agricultural Information"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_words_drop_stop_words_and_punctuation() {
        assert_eq!(
            question_words("What is the role of Zinc in rice? zinc!"),
            vec!["what", "role", "zinc", "rice"]
        );
        assert!(question_words("   ").is_empty());
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("✓✓✓✓", 2), "✓✓");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_titles() {
        assert_eq!(title_from_question("How do I prune?"), "How To Guide");
        assert_eq!(title_from_question("What is biochar"), "Information");
        assert_eq!(title_from_question("When to harvest"), "Timing Guide");
        assert_eq!(title_from_question("Best fertilizer"), "Recommendation");
        assert_eq!(title_from_question("Why do leaves curl"), "Explanation");
        assert_eq!(title_from_question("drainage issue"), "Solution");
        assert_eq!(title_from_question("saffron"), "Agricultural Information");
    }
}
