use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::{
    error::{Result, ValidatorError},
    provider::Provider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Chat-completions client that asks for, and parses, a JSON object reply.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    provider: Provider,
    api_key: String,
}

impl ChatClient {
    pub fn new(provider: Provider) -> Result<Self> {
        let api_key = provider.api_key()?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            provider,
            api_key,
        })
    }

    pub async fn complete_json(&self, prompt: &str, temperature: f32) -> Result<Value> {
        let config = self.provider.config();
        debug!(provider = self.provider.name(), model = config.model, "sending completion");

        let response = self
            .http
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": temperature,
                "response_format": {"type": "json_object"},
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ValidatorError::InvalidApiResponse {
                reason: format!("no message content in {response}"),
            })?;

        Ok(serde_json::from_str(json_block(content))?)
    }
}

/// Strips markdown code fences and any prose around the outermost JSON object.
pub fn json_block(content: &str) -> &str {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_block_strips_fences() {
        let content = "```json\n{\"keywords\": [\"a\"]}\n```";
        assert_eq!(json_block(content), "{\"keywords\": [\"a\"]}");
    }

    #[test]
    fn json_block_leaves_plain_json_alone() {
        assert_eq!(json_block("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(json_block("not json"), "not json");
    }
}
