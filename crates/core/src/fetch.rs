use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::{Result, ValidatorError},
    provider::{SCRAPER_API_KEY_ENV, require_env},
};

const SCRAPER_API_URL: &str = "https://api.scraperapi.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(70);

/// Fetches the text content of a search results page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Routes requests through the ScraperAPI proxy, which renders the page and
/// returns its text.
pub struct ScraperApiFetcher {
    http: reqwest::Client,
    api_key: String,
}

impl ScraperApiFetcher {
    pub fn new(api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, api_key })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(require_env(SCRAPER_API_KEY_ENV)?)
    }
}

#[async_trait]
impl PageFetcher for ScraperApiFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching page");
        let response = self
            .http
            .get(SCRAPER_API_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("output_format", "text"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValidatorError::FetchFailed {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        Ok(response.text().await?)
    }
}
