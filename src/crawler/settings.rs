use crate::config::Config;
use crate::url::{seed_domains, DomainFilter};
use std::time::Duration;

/// Session configuration carried by the coordinator and persisted in
/// checkpoints
///
/// Holds no credentials; the seed-suggestion API key never reaches this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub keywords: Vec<String>,
    pub seed_urls: Vec<String>,
    pub max_depth: u32,
    /// Seconds between requests to the same domain
    pub delay: f64,
    pub user_agent: String,
    pub use_stemming: bool,
    pub use_lemmatization: bool,
    pub remove_stopwords: bool,
    pub use_tfidf: bool,
    pub min_relevance_score: f64,
    pub stay_in_domain: bool,
    pub allowed_domains: Vec<String>,
    pub excluded_domains: Vec<String>,
    pub regex_pattern: Option<String>,
    /// Sorted domain keys of the seed URLs, fixed at session start
    pub seed_domains: Vec<String>,
}

impl SessionSettings {
    /// Extracts session settings from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let mut domains: Vec<String> = seed_domains(&config.crawler.seed_urls)
            .into_iter()
            .collect();
        domains.sort();

        Self {
            keywords: config.crawler.keywords.clone(),
            seed_urls: config.crawler.seed_urls.clone(),
            max_depth: config.crawler.max_depth,
            delay: config.crawler.delay,
            user_agent: config.crawler.user_agent.clone(),
            use_stemming: config.matching.use_stemming,
            use_lemmatization: config.matching.use_lemmatization,
            remove_stopwords: config.matching.remove_stopwords,
            use_tfidf: config.matching.use_tfidf,
            min_relevance_score: config.matching.min_relevance_score,
            stay_in_domain: config.domains.stay_in_domain,
            allowed_domains: config.domains.allowed.clone(),
            excluded_domains: config.domains.excluded.clone(),
            regex_pattern: config.matching.regex_pattern.clone(),
            seed_domains: domains,
        }
    }

    /// Configured per-domain delay; negative or non-finite values count as zero
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// Builds the domain filter for these settings
    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter::from_parts(
            self.excluded_domains.iter().cloned(),
            self.allowed_domains.iter().cloned(),
            self.stay_in_domain,
            self.seed_domains.iter().cloned().collect(),
        )
    }

    /// Matching options in configuration form, for building a scorer
    pub fn matching(&self) -> crate::config::MatchingConfig {
        crate::config::MatchingConfig {
            use_stemming: self.use_stemming,
            use_lemmatization: self.use_lemmatization,
            remove_stopwords: self.remove_stopwords,
            regex_pattern: self.regex_pattern.clone(),
            use_tfidf: self.use_tfidf,
            min_relevance_score: self.min_relevance_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.crawler.keywords = vec!["rust".to_string()];
        config.crawler.seed_urls = vec![
            "https://b.example/".to_string(),
            "https://A.example/x".to_string(),
            "https://b.example/y".to_string(),
        ];
        config.domains.stay_in_domain = true;

        let settings = SessionSettings::from_config(&config);

        assert_eq!(settings.seed_domains, vec!["a.example", "b.example"]);
        assert!(settings.domain_filter().should_crawl("https://a.example/z"));
        assert!(!settings.domain_filter().should_crawl("https://c.example/"));
    }

    #[test]
    fn test_delay_duration() {
        let mut settings = SessionSettings::from_config(&Config::default());
        settings.delay = 0.25;
        assert_eq!(settings.delay_duration(), Duration::from_millis(250));

        settings.delay = -1.0;
        assert_eq!(settings.delay_duration(), Duration::ZERO);
    }
}
