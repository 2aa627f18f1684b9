use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{Result, ValidatorError},
    llm::ChatClient,
};

#[async_trait]
pub trait KeywordGenerator: Send + Sync {
    async fn generate(&self, business_idea: &str, count: usize) -> Result<Vec<String>>;
}

pub struct LlmKeywordGenerator {
    chat: ChatClient,
}

impl LlmKeywordGenerator {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[derive(Deserialize)]
struct KeywordReply {
    #[serde(default)]
    keywords: Vec<String>,
}

fn keyword_prompt(business_idea: &str, count: usize) -> String {
    format!(
        r#"For the business idea: "{business_idea}"

Generate {count} specific search keywords that would help validate this idea.
These should be phrases people might use when discussing pain points, needs, or solutions related to this idea.

ONLY return a valid JSON object with a 'keywords' array like this:
{{
    "keywords": ["keyword1", "keyword2", "keyword3"]
}}"#
    )
}

#[async_trait]
impl KeywordGenerator for LlmKeywordGenerator {
    async fn generate(&self, business_idea: &str, count: usize) -> Result<Vec<String>> {
        let value = self
            .chat
            .complete_json(&keyword_prompt(business_idea, count), 0.7)
            .await?;
        let reply: KeywordReply =
            serde_json::from_value(value).map_err(|e| ValidatorError::KeywordGenerationFailed {
                reason: e.to_string(),
            })?;
        let mut keywords = normalize_keywords(reply.keywords);
        keywords.truncate(count);
        Ok(with_business_idea(keywords, business_idea))
    }
}

/// Trims, drops blanks and repeats (case-insensitive), keeps order.
pub fn normalize_keywords(keywords: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() || out.iter().any(|k| k.eq_ignore_ascii_case(&keyword)) {
            continue;
        }
        out.push(keyword);
    }
    out
}

/// The idea itself is always searched as well.
pub fn with_business_idea(mut keywords: Vec<String>, business_idea: &str) -> Vec<String> {
    let idea = business_idea.trim();
    if !idea.is_empty() && !keywords.iter().any(|k| k.eq_ignore_ascii_case(idea)) {
        keywords.push(idea.to_string());
    }
    keywords
}

/// Word-based keywords for when no LLM is reachable: the first two words,
/// words two and three, the first word, then further single words.
pub fn fallback_keywords(business_idea: &str, count: usize) -> Vec<String> {
    let lowered = business_idea.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut candidates = Vec::new();
    if words.len() >= 2 {
        candidates.push(words[..2].join(" "));
    }
    if words.len() >= 3 {
        candidates.push(words[1..3].join(" "));
    }
    if let Some(first) = words.first() {
        candidates.push(first.to_string());
    }
    candidates.extend(words.iter().skip(1).map(|w| w.to_string()));

    let mut keywords = normalize_keywords(candidates);
    keywords.truncate(count);
    with_business_idea(keywords, business_idea)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_builds_word_combinations() {
        assert_eq!(
            fallback_keywords("Meal prep app for students", 3),
            vec!["meal prep", "prep app", "meal", "Meal prep app for students"]
        );
    }

    #[test]
    fn fallback_fills_with_single_words() {
        assert_eq!(
            fallback_keywords("pet sitter marketplace", 5),
            vec![
                "pet sitter",
                "sitter marketplace",
                "pet",
                "sitter",
                "marketplace",
                "pet sitter marketplace",
            ]
        );
    }

    #[test]
    fn single_word_idea_is_not_repeated() {
        assert_eq!(fallback_keywords("Invoicing", 3), vec!["invoicing"]);
    }

    #[test]
    fn blank_idea_yields_no_keywords() {
        assert!(fallback_keywords("   ", 3).is_empty());
    }

    #[test]
    fn normalize_drops_blanks_and_repeats() {
        let keywords = normalize_keywords(vec![
            " budget app ".to_string(),
            String::new(),
            "Budget App".to_string(),
            "expense tracker".to_string(),
        ]);
        assert_eq!(keywords, vec!["budget app", "expense tracker"]);
    }

    #[test]
    fn business_idea_is_appended_once() {
        let keywords = with_business_idea(vec!["a".to_string()], "Idea");
        assert_eq!(keywords, vec!["a", "Idea"]);
        assert_eq!(with_business_idea(keywords.clone(), "idea"), keywords);
    }
}
