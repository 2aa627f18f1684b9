use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidatorError};

/// Environment variable holding the ScraperAPI key used by the page fetcher.
pub const SCRAPER_API_KEY_ENV: &str = "SCRAPERAPI_KEY";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Openai,
    Gemini,
    Grok,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-1.5-flash",
                env_var: "GEMINI_API_KEY",
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Grok => "Grok",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn api_key(&self) -> Result<String> {
        require_env(self.config().env_var)
    }
}

/// Reads a non-empty secret from the environment.
pub fn require_env(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidatorError::MissingApiKey {
            env_var: env_var.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip_through_config_keys() {
        let provider: Provider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(provider, Provider::Gemini);
        assert_eq!(Provider::default(), Provider::Openai);
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = require_env("IDEA_VALIDATOR_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("IDEA_VALIDATOR_TEST_SURELY_UNSET_KEY"));
    }
}
