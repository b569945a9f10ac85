//! URL handling module for the keyword crawler
//!
//! This module provides URL normalization, domain key extraction, and the
//! allow/deny/stay-in-domain filter applied to every dequeued URL.

mod domain;
mod normalize;

use crate::config::DomainConfig;
use std::collections::HashSet;

// Re-export main functions
pub use domain::{domain_key, domain_key_of, extract_domain};
pub use normalize::normalize_url;

/// Domain keys of the seed URLs, ignoring seeds that do not normalize
pub fn seed_domains<S: AsRef<str>>(seed_urls: &[S]) -> HashSet<String> {
    seed_urls
        .iter()
        .filter_map(|seed| normalize_url(seed.as_ref()).ok())
        .filter_map(|url| domain_key(&url))
        .collect()
}

/// Outcome of evaluating a URL against the domain policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainDecision {
    /// Domain is on the excluded list
    Excluded,
    /// An allow list is configured and the domain is not on it
    NotAllowed,
    /// Stay-in-domain is on and the domain is not a seed domain
    OutsideSeedDomains,
    /// URL has no usable domain
    NoDomain,
    /// URL may be crawled
    Accepted,
}

impl DomainDecision {
    /// Returns true if the URL should be crawled
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Domain allow/deny policy
///
/// Rules are evaluated in priority order:
/// 1. Excluded domains (highest priority)
/// 2. Allowed domains, when the list is non-empty
/// 3. Seed domains, when stay-in-domain is enabled
/// 4. Accept
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    excluded: HashSet<String>,
    allowed: HashSet<String>,
    stay_in_domain: bool,
    seed_domains: HashSet<String>,
}

impl DomainFilter {
    /// Builds a filter from configuration; seed domains are computed once from
    /// the seed URLs
    pub fn new(config: &DomainConfig, seed_urls: &[String]) -> Self {
        Self::from_parts(
            config.excluded.iter().cloned(),
            config.allowed.iter().cloned(),
            config.stay_in_domain,
            seed_domains(seed_urls),
        )
    }

    /// Builds a filter from explicit domain sets, as restored from a checkpoint
    pub fn from_parts(
        excluded: impl IntoIterator<Item = String>,
        allowed: impl IntoIterator<Item = String>,
        stay_in_domain: bool,
        seed_domains: HashSet<String>,
    ) -> Self {
        Self {
            excluded: excluded.into_iter().map(|d| d.to_lowercase()).collect(),
            allowed: allowed.into_iter().map(|d| d.to_lowercase()).collect(),
            stay_in_domain,
            seed_domains,
        }
    }

    /// Evaluates a URL against the policy
    pub fn evaluate(&self, url: &str) -> DomainDecision {
        match domain_key_of(url) {
            Some(domain) => self.evaluate_domain(&domain),
            None => DomainDecision::NoDomain,
        }
    }

    /// Evaluates a domain key against the policy
    pub fn evaluate_domain(&self, domain: &str) -> DomainDecision {
        if self.excluded.contains(domain) {
            return DomainDecision::Excluded;
        }

        if !self.allowed.is_empty() && !self.allowed.contains(domain) {
            return DomainDecision::NotAllowed;
        }

        if self.stay_in_domain && !self.seed_domains.contains(domain) {
            return DomainDecision::OutsideSeedDomains;
        }

        DomainDecision::Accepted
    }

    /// Returns true if the URL passes the domain policy
    pub fn should_crawl(&self, url: &str) -> bool {
        self.evaluate(url).should_crawl()
    }

    pub fn seed_domains(&self) -> &HashSet<String> {
        &self.seed_domains
    }

    pub fn stay_in_domain(&self) -> bool {
        self.stay_in_domain
    }

    pub fn allowed(&self) -> &HashSet<String> {
        &self.allowed
    }

    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_filter(stay_in_domain: bool) -> DomainFilter {
        let config = DomainConfig {
            stay_in_domain,
            allowed: vec![],
            excluded: vec!["bad.com".to_string()],
        };
        DomainFilter::new(&config, &["https://Seed.com/start".to_string()])
    }

    #[test]
    fn test_seed_domains_from_seed_urls() {
        let filter = create_test_filter(true);
        assert!(filter.seed_domains().contains("seed.com"));
        assert_eq!(filter.seed_domains().len(), 1);
    }

    #[test]
    fn test_excluded_domain_rejected() {
        let filter = create_test_filter(false);
        assert_eq!(
            filter.evaluate("https://bad.com/page"),
            DomainDecision::Excluded
        );
    }

    #[test]
    fn test_unrestricted_domain_accepted() {
        let filter = create_test_filter(false);
        assert!(filter.should_crawl("https://random.com/"));
    }

    #[test]
    fn test_stay_in_domain() {
        let filter = create_test_filter(true);
        assert!(filter.should_crawl("https://seed.com/other"));
        assert_eq!(
            filter.evaluate("https://random.com/"),
            DomainDecision::OutsideSeedDomains
        );
    }

    #[test]
    fn test_allowed_list() {
        let config = DomainConfig {
            stay_in_domain: false,
            allowed: vec!["Docs.example.com".to_string()],
            excluded: vec![],
        };
        let filter = DomainFilter::new(&config, &[]);

        assert!(filter.should_crawl("https://docs.example.com/a"));
        assert_eq!(
            filter.evaluate("https://example.com/a"),
            DomainDecision::NotAllowed
        );
    }

    #[test]
    fn test_priority_excluded_over_allowed() {
        let config = DomainConfig {
            stay_in_domain: false,
            allowed: vec!["conflict.com".to_string()],
            excluded: vec!["conflict.com".to_string()],
        };
        let filter = DomainFilter::new(&config, &[]);

        assert_eq!(
            filter.evaluate("https://conflict.com/"),
            DomainDecision::Excluded
        );
    }

    #[test]
    fn test_priority_allowed_over_seed_domains() {
        let config = DomainConfig {
            stay_in_domain: true,
            allowed: vec!["other.com".to_string()],
            excluded: vec![],
        };
        let filter = DomainFilter::new(&config, &["https://seed.com/".to_string()]);

        // Allowed but not a seed domain: passes rule 2, fails rule 3
        assert_eq!(
            filter.evaluate("https://other.com/"),
            DomainDecision::OutsideSeedDomains
        );
        // Seed domain but not allowed: fails rule 2 first
        assert_eq!(
            filter.evaluate("https://seed.com/"),
            DomainDecision::NotAllowed
        );
    }

    #[test]
    fn test_port_is_part_of_domain() {
        let filter = DomainFilter::new(
            &DomainConfig {
                stay_in_domain: true,
                ..Default::default()
            },
            &["http://127.0.0.1:4000/".to_string()],
        );

        assert!(filter.should_crawl("http://127.0.0.1:4000/page"));
        assert!(!filter.should_crawl("http://127.0.0.1:4001/page"));
    }

    #[test]
    fn test_url_without_domain() {
        let filter = create_test_filter(false);
        assert_eq!(filter.evaluate("not a url"), DomainDecision::NoDomain);
        assert!(!filter.should_crawl("not a url"));
    }
}
