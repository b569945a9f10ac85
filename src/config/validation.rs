use crate::config::types::{
    CheckpointConfig, Config, CrawlerConfig, DomainConfig, MatchingConfig, OutputConfig,
    SeedSuggestionConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Keywords may be empty here; they can still be supplied on the command line,
/// and the coordinator refuses to start without a keyword or pattern.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_matching_config(&config.matching)?;
    validate_domain_config(&config.domains)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_output_config(&config.output)?;
    validate_seed_suggestion_config(&config.seed_suggestion)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.fetch_timeout < 1 {
        return Err(ConfigError::Validation(
            "fetch_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for seed in &config.seed_urls {
        validate_seed_url(seed)?;
    }

    Ok(())
}

/// Validates a seed URL: must parse and use HTTP or HTTPS
pub(crate) fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates matching configuration
fn validate_matching_config(config: &MatchingConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.min_relevance_score) {
        return Err(ConfigError::Validation(format!(
            "min_relevance_score must be between 0 and 1, got {}",
            config.min_relevance_score
        )));
    }

    if let Some(pattern) = &config.regex_pattern {
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    Ok(())
}

/// Validates allowed and excluded domain lists
fn validate_domain_config(config: &DomainConfig) -> Result<(), ConfigError> {
    for domain in config.allowed.iter().chain(config.excluded.iter()) {
        validate_domain_string(domain)?;
    }
    Ok(())
}

/// Validates a domain string, optionally followed by `:port`
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "Domain cannot be empty".to_string(),
        ));
    }

    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };

    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidDomain(format!(
                "Domain '{}' has an invalid port",
                domain
            )));
        }
    }

    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if matches!(&config.database_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.results_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_seed_suggestion_config(config: &SeedSuggestionConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid seed suggestion endpoint '{}': {}",
            config.endpoint, e
        ))
    })?;

    if config.count < 1 {
        return Err(ConfigError::Validation(
            "seed suggestion count must be >= 1".to_string(),
        ));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}
