use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::{Result, ValidatorError},
    llm::ChatClient,
    types::ExtractionRecord,
};

/// Turns the text of one scraped page into structured findings.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str, keyword: &str) -> Result<ExtractionRecord>;
}

pub struct LlmExtractor {
    chat: ChatClient,
    max_chars: usize,
}

impl LlmExtractor {
    pub fn new(chat: ChatClient, max_chars: usize) -> Self {
        Self { chat, max_chars }
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn extraction_prompt(text: &str, keyword: &str) -> String {
    format!(
        r#"You are a business idea validator.
Analyze the following text in the context of the keyword: "{keyword}"

Find:
1. Pain points people mention
2. Excitement signals (desires, positive needs)
3. Competitors mentioned
4. Notable quotes (max 2 short quotes)
5. Red flags (warning signs for anyone entering this market)

Rate every item's relevance to the keyword from 0 (unrelated) to 10 (central).

ONLY return valid JSON like this:

{{
    "pain_points": [{{"text": "...", "relevance": 8}}],
    "excitement_signals": [{{"text": "...", "relevance": 6}}],
    "mentions_of_competitors": [{{"text": "...", "relevance": 7}}],
    "notable_quotes": [{{"text": "...", "relevance": 5}}],
    "red_flags": [{{"text": "...", "relevance": 4}}]
}}

Use empty arrays when nothing applies.

Text to analyze:
{text}"#
    )
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, text: &str, keyword: &str) -> Result<ExtractionRecord> {
        let prompt = extraction_prompt(truncate_chars(text, self.max_chars), keyword);
        let value = self.chat.complete_json(&prompt, 0.2).await?;
        parse_extraction(value, keyword)
    }
}

pub fn parse_extraction(value: Value, keyword: &str) -> Result<ExtractionRecord> {
    if !value.is_object() {
        return Err(ValidatorError::ExtractionFailed {
            keyword: keyword.to_string(),
            reason: format!("expected a JSON object, got {value}"),
        });
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Item;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn parse_extraction_accepts_partial_objects() {
        let record = parse_extraction(
            json!({"pain_points": [{"text": "slow", "relevance": 7}]}),
            "k",
        )
        .unwrap();
        assert_eq!(record.pain_points, vec![Item::scored("slow", 7.0)]);
        assert!(record.notable_quotes.is_empty());
    }

    #[test]
    fn parse_extraction_rejects_non_objects() {
        let err = parse_extraction(json!(["slow"]), "k").unwrap_err();
        assert!(matches!(err, ValidatorError::ExtractionFailed { .. }));
    }

    #[test]
    fn prompt_embeds_keyword_and_text() {
        let prompt = extraction_prompt("page body", "meal prep");
        assert!(prompt.contains("\"meal prep\""));
        assert!(prompt.ends_with("page body"));
    }
}
