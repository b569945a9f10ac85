//! Seed URL suggestion through a `generateContent`-style language model API
//!
//! When a crawl starts without seed URLs, the keywords are sent to the
//! configured endpoint and every `http(s)` line of the reply becomes a seed.
//! Any failure falls back to [`DEFAULT_SEED_URLS`].

use crate::config::SeedSuggestionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Seeds used when suggestion is disabled or fails
pub const DEFAULT_SEED_URLS: &[&str] = &[
    "https://en.wikipedia.org/wiki/Web_crawler",
    "https://www.python.org/",
    "https://news.ycombinator.com/",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API key header; the key must never appear in a request URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Errors raised while asking for seed suggestions
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("API key variable {0} is not set")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Unexpected response format: {0}")]
    Format(&'static str),

    #[error("Response contained no valid URLs")]
    NoUrls,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Client for the seed suggestion endpoint
pub struct SeedSuggester {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for SeedSuggester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedSuggester")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SeedSuggester {
    pub fn new(client: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Builds a suggester, reading the API key from the configured
    /// environment variable
    pub fn from_config(config: &SeedSuggestionConfig) -> Result<Self, SeedError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SeedError::MissingApiKey(config.api_key_env.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::new(client, &config.endpoint, &api_key))
    }

    /// Asks the endpoint for up to `count` seed URLs for `keywords`
    pub async fn suggest_seeds(
        &self,
        keywords: &[String],
        count: usize,
    ) -> Result<Vec<String>, SeedError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(keywords, count),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SeedError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SeedError::Status { status, body });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SeedError::Http(e.without_url()))?;
        if let Some(error) = reply.error {
            return Err(SeedError::Api(error.message));
        }

        let candidate = reply
            .candidates
            .into_iter()
            .next()
            .ok_or(SeedError::Format("missing candidates"))?;
        let content = candidate
            .content
            .ok_or(SeedError::Format("missing content field"))?;
        let part = content
            .parts
            .into_iter()
            .next()
            .ok_or(SeedError::Format("empty parts array"))?;

        let urls = extract_urls(&part.text, count);
        if urls.is_empty() {
            return Err(SeedError::NoUrls);
        }

        tracing::info!("Generated {} seed URLs", urls.len());
        for url in &urls {
            tracing::debug!("  - {}", url);
        }
        Ok(urls)
    }
}

fn build_prompt(keywords: &[String], count: usize) -> String {
    format!(
        "Generate {} relevant and high-quality website URLs (full URLs including https://) \
         that would be good starting points for a web crawler searching for information about: {}.\n\n\
         Only return the URLs, one per line, without any additional text or explanation.\n\
         Make sure these are real, existing websites that are likely to have relevant content and good outgoing links.",
        count,
        keywords.join(", ")
    )
}

/// Lines of `text` that parse as http(s) URLs with a host, at most `limit`
fn extract_urls(text: &str, limit: usize) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| l.starts_with("http")) {
        match Url::parse(line) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
                if !urls.iter().any(|u| u == line) {
                    urls.push(line.to_string());
                }
            }
            _ => tracing::warn!("Ignoring invalid suggested URL: {}", line),
        }
        if urls.len() >= limit {
            break;
        }
    }

    urls
}

fn default_seeds() -> Vec<String> {
    DEFAULT_SEED_URLS.iter().map(|s| s.to_string()).collect()
}

/// Picks the seed list for a session
///
/// Configured seeds win. Otherwise seeds are suggested when enabled; any
/// failure, or suggestion being disabled, yields [`DEFAULT_SEED_URLS`] with a
/// warning.
pub async fn resolve_seeds(
    configured: &[String],
    keywords: &[String],
    config: &SeedSuggestionConfig,
) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }

    if !config.enabled {
        tracing::warn!("No seed URLs configured and suggestion disabled, using default seed URLs");
        return default_seeds();
    }

    let suggested = match SeedSuggester::from_config(config) {
        Ok(suggester) => suggester.suggest_seeds(keywords, config.count).await,
        Err(e) => Err(e),
    };

    match suggested {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!("Seed suggestion failed ({}), using default seed URLs", e);
            default_seeds()
        }
    }
}
