use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use keyword_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Keywords: {:?}", config.crawler.keywords);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored with every storage session so runs made with different
/// configurations can be told apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResultsFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
keywords = ["rust", "async"]
seed-urls = ["https://example.com/"]
max-depth = 2
delay = 0.5
user-agent = "TestCrawler/1.0"

[matching]
use-stemming = true
use-tfidf = true
min-relevance-score = 0.1

[domains]
stay-in-domain = true
excluded = ["ads.example.com"]

[checkpoint]
interval = 120
directory = "./ckpt"

[output]
database-path = "./test.db"
results-format = "csv"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.keywords, vec!["rust", "async"]);
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.delay, 0.5);
        assert!(config.matching.use_stemming);
        assert!(!config.matching.use_lemmatization);
        assert!(config.domains.stay_in_domain);
        assert_eq!(config.checkpoint.interval, 120);
        assert_eq!(config.output.database_path.as_deref(), Some("./test.db"));
        assert_eq!(config.output.results_format, ResultsFormat::Csv);
        assert!(!config.seed_suggestion.enabled);
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(
            r#"
[crawler]
keywords = ["rust"]
seed-urls = ["https://example.com/"]
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.delay, 1.0);
        assert_eq!(config.crawler.fetch_timeout, 10);
        assert_eq!(config.matching.min_relevance_score, 0.03);
        assert_eq!(config.checkpoint.interval, 300);
        assert_eq!(config.checkpoint.directory, "checkpoints");
        assert_eq!(config.seed_suggestion.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
keywords = ["rust"]
seed-urls = ["https://example.com/"]
delay = -1.0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash_matches_file_hash() {
        let file = create_temp_config(
            r#"
[crawler]
keywords = ["rust"]
"#,
        );
        let (_, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
