use serde::Deserialize;
use std::time::Duration;

/// Shortest allowed interval between automatic checkpoints (seconds)
pub const MIN_CHECKPOINT_INTERVAL_SECS: u64 = 60;

/// Longest allowed interval between automatic checkpoints (seconds)
pub const MAX_CHECKPOINT_INTERVAL_SECS: u64 = 3600;

/// Main configuration structure for the keyword crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub domains: DomainConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "seed-suggestion", default)]
    pub seed_suggestion: SeedSuggestionConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Keywords to search for
    #[serde(default)]
    pub keywords: Vec<String>,

    /// URLs to start crawling from
    #[serde(rename = "seed-urls", default)]
    pub seed_urls: Vec<String>,

    /// Maximum depth to crawl from seed URLs
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Minimum time between requests to the same domain (seconds)
    #[serde(default = "default_delay")]
    pub delay: f64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            seed_urls: Vec::new(),
            max_depth: default_max_depth(),
            delay: default_delay(),
            user_agent: default_user_agent(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

/// Keyword processing and relevance scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(rename = "use-stemming", default)]
    pub use_stemming: bool,

    #[serde(rename = "use-lemmatization", default)]
    pub use_lemmatization: bool,

    #[serde(rename = "remove-stopwords", default)]
    pub remove_stopwords: bool,

    /// Case-insensitive pattern; when set it replaces keyword matching
    #[serde(rename = "regex-pattern", default)]
    pub regex_pattern: Option<String>,

    /// Score pages with the incremental TF-IDF heuristic
    #[serde(rename = "use-tfidf", default)]
    pub use_tfidf: bool,

    /// Minimum score for a page to count as relevant (TF-IDF only)
    #[serde(rename = "min-relevance-score", default = "default_min_relevance_score")]
    pub min_relevance_score: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            use_stemming: false,
            use_lemmatization: false,
            remove_stopwords: false,
            regex_pattern: None,
            use_tfidf: false,
            min_relevance_score: default_min_relevance_score(),
        }
    }
}

/// Domain filtering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainConfig {
    /// Only crawl domains that appear in the seed list
    #[serde(rename = "stay-in-domain", default)]
    pub stay_in_domain: bool,

    /// If non-empty, only these domains are crawled
    #[serde(default)]
    pub allowed: Vec<String>,

    /// Domains that are never crawled
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Checkpoint scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Seconds between automatic checkpoints
    #[serde(default = "default_checkpoint_interval")]
    pub interval: u64,

    /// Directory that holds checkpoint files
    #[serde(default = "default_checkpoint_dir")]
    pub directory: String,
}

impl CheckpointConfig {
    /// Returns the checkpoint interval clamped to the supported range
    pub fn effective_interval(&self) -> Duration {
        let secs = self
            .interval
            .clamp(MIN_CHECKPOINT_INTERVAL_SECS, MAX_CHECKPOINT_INTERVAL_SECS);
        if secs != self.interval {
            tracing::warn!(
                "Checkpoint interval {}s is outside [{}, {}], using {}s",
                self.interval,
                MIN_CHECKPOINT_INTERVAL_SECS,
                MAX_CHECKPOINT_INTERVAL_SECS,
                secs
            );
        }
        Duration::from_secs(secs)
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: default_checkpoint_interval(),
            directory: default_checkpoint_dir(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file; storage is disabled when absent
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// File the final result list is written to
    #[serde(rename = "results-path", default)]
    pub results_path: Option<String>,

    #[serde(rename = "results-format", default)]
    pub results_format: ResultsFormat,

    #[serde(rename = "pretty-print", default)]
    pub pretty_print: bool,

    /// Keep extracted page text in the written results
    #[serde(rename = "include-content", default)]
    pub include_content: bool,
}

/// File format for exported results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultsFormat {
    #[default]
    Json,
    Csv,
}

/// Seed URL suggestion service configuration
///
/// The API key itself is never part of the configuration; only the name of the
/// environment variable that holds it.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSuggestionConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_suggestion_endpoint")]
    pub endpoint: String,

    /// Number of seed URLs to request
    #[serde(default = "default_suggestion_count")]
    pub count: usize,

    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for SeedSuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_suggestion_endpoint(),
            count: default_suggestion_count(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_delay() -> f64 {
    1.0
}

fn default_user_agent() -> String {
    "KeywordCrawler/1.0 (+https://example.com/crawler)".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_min_relevance_score() -> f64 {
    0.03
}

fn default_checkpoint_interval() -> u64 {
    300
}

fn default_checkpoint_dir() -> String {
    "checkpoints".to_string()
}

fn default_suggestion_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}

fn default_suggestion_count() -> usize {
    5
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
