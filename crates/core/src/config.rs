use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::{
    error::{Result, ValidatorError},
    provider::Provider,
    types::MAX_RELEVANCE,
};

pub const ENV_PREFIX: &str = "IDEA_VALIDATOR_";

/// Weights may drift from 1.0 by floating point addition error only.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub pain_points: f64,
    pub excitement_signals: f64,
    pub competitors: f64,
    pub keyword_relevance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            pain_points: 0.35,
            excitement_signals: 0.30,
            competitors: 0.20,
            keyword_relevance: 0.15,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.pain_points + self.excitement_signals + self.competitors + self.keyword_relevance
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.pain_points,
            self.excitement_signals,
            self.competitors,
            self.keyword_relevance,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ValidatorError::invalid_config(
                "scoring weights must be finite and non-negative",
            ));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidatorError::invalid_config(format!(
                "scoring weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Lower bounds (inclusive) of each validation status on the 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    pub strongly_validated: f64,
    pub validated: f64,
    pub partially_validated: f64,
    pub weakly_validated: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            strongly_validated: 80.0,
            validated: 65.0,
            partially_validated: 50.0,
            weakly_validated: 35.0,
        }
    }
}

impl StatusThresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = [
            100.0,
            self.strongly_validated,
            self.validated,
            self.partially_validated,
            self.weakly_validated,
            0.0,
        ];
        let decreasing = ordered.windows(2).all(|w| w[0] >= w[1]);
        let strict = ordered[1..5].windows(2).all(|w| w[0] > w[1]);
        if !decreasing || !strict {
            return Err(ValidatorError::invalid_config(
                "status thresholds must be strictly decreasing within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// A searchable discussion platform. `url_template` takes `{query}` and `{page}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url_template: String,
}

impl SourceConfig {
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }

    /// Fills the template with the form-encoded keyword, so reserved
    /// characters like `&`, `#` and `+` stay inside the query value.
    pub fn search_url(&self, keyword: &str, page: u32) -> String {
        let words = keyword.split_whitespace().collect::<Vec<_>>().join(" ");
        let query: String = form_urlencoded::byte_serialize(words.as_bytes()).collect();
        self.url_template
            .replace("{query}", &query)
            .replace("{page}", &page.to_string())
    }
}

pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "Reddit",
            "https://www.reddit.com/search/?q={query}&page={page}",
        ),
        SourceConfig::new("HackerNews", "https://hn.algolia.com/?q={query}&page={page}"),
        SourceConfig::new(
            "ProductHunt",
            "https://www.producthunt.com/search?q={query}&page={page}",
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub provider: Provider,
    pub num_keywords: usize,
    pub pages_per_source: u32,
    /// Pause after every extraction call.
    pub request_delay_ms: u64,
    /// Page text beyond this many characters is not sent to the extractor.
    pub max_page_chars: usize,
    /// Scored items below this relevance are hidden from summary lists.
    pub min_relevance: f64,
    pub top_n: usize,
    pub scoring: ScoringWeights,
    pub thresholds: StatusThresholds,
    pub sources: Vec<SourceConfig>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            num_keywords: 5,
            pages_per_source: 2,
            request_delay_ms: 1000,
            max_page_chars: 12_000,
            min_relevance: 5.0,
            top_n: 5,
            scoring: ScoringWeights::default(),
            thresholds: StatusThresholds::default(),
            sources: default_sources(),
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.thresholds.validate()?;
        if !(0.0..=MAX_RELEVANCE).contains(&self.min_relevance) {
            return Err(ValidatorError::invalid_config(format!(
                "min_relevance must be within [0, {MAX_RELEVANCE}], got {}",
                self.min_relevance
            )));
        }
        if self.sources.is_empty() {
            return Err(ValidatorError::invalid_config(
                "at least one source is required",
            ));
        }
        if self.pages_per_source == 0 {
            return Err(ValidatorError::invalid_config(
                "pages_per_source must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }
}

/// `<config_dir>/idea-validator/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("idea-validator").join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`IDEA_VALIDATOR_SCORING__PAIN_POINTS`, ...)
/// 2. Explicit config file (`--config`), which must exist
/// 3. User config (`~/.config/idea-validator/config.toml`)
/// 4. Built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<ValidatorConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ValidatorError::invalid_config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
    }
    let figment = layered(user_config_path().as_deref(), explicit)
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

fn layered(user: Option<&Path>, explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(ValidatorConfig::default()));
    if let Some(user) = user.filter(|p| p.exists()) {
        figment = figment.merge(Toml::file(user));
    }
    if let Some(explicit) = explicit {
        figment = figment.merge(Toml::file(explicit));
    }
    figment
}

fn extract(figment: Figment) -> Result<ValidatorConfig> {
    let config: ValidatorConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<ValidatorConfig> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        extract(layered(None, Some(&path)))
    }

    #[test]
    fn default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(weights.validate().is_ok());
        assert!(ValidatorConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_overrides_individual_fields() {
        let config = from_toml(
            r#"
            min_relevance = 7.0
            provider = "gemini"

            [scoring]
            pain_points = 0.40
            excitement_signals = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.min_relevance, 7.0);
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.scoring.pain_points, 0.40);
        assert_eq!(config.scoring.competitors, 0.20);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.sources.len(), 3);
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let err = from_toml("[scoring]\npain_points = 0.9\n").unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidConfig { .. }));
    }

    #[test]
    fn out_of_range_relevance_threshold_is_rejected() {
        assert!(from_toml("min_relevance = 11.0\n").is_err());
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        assert!(from_toml("[thresholds]\nvalidated = 85.0\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidConfig { .. }));
    }

    #[test]
    fn search_url_fills_query_and_page() {
        let source = SourceConfig::new("Reddit", "https://r.example/?q={query}&page={page}");
        assert_eq!(
            source.search_url("meal  prep app", 2),
            "https://r.example/?q=meal+prep+app&page=2"
        );
        assert_eq!(
            source.search_url("AT&T alternative #1", 1),
            "https://r.example/?q=AT%26T+alternative+%231&page=1"
        );
        assert_eq!(
            source.search_url("C++ course?", 1),
            "https://r.example/?q=C%2B%2B+course%3F&page=1"
        );
    }
}
