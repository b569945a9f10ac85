//! Per-session robots.txt cache
//!
//! Each domain is fetched at most once per session; entries are never
//! invalidated while the crawl runs.

use crate::robots::ParsedRobots;
use std::collections::HashMap;

/// Domain key → robots.txt rules
#[derive(Debug, Clone, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rules for a domain, if any
    pub fn get(&self, domain: &str) -> Option<&ParsedRobots> {
        self.entries.get(domain)
    }

    /// Installs rules for a domain unless some are already cached
    ///
    /// Returns a reference to whichever rules are now in place.
    pub fn insert(&mut self, domain: &str, rules: ParsedRobots) -> &ParsedRobots {
        self.entries.entry(domain.to_string()).or_insert(rules)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entries.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = RobotsCache::new();
        assert!(cache.get("example.com").is_none());

        cache.insert("example.com", ParsedRobots::from_content("User-agent: *\nDisallow: /"));

        let rules = cache.get("example.com").unwrap();
        assert!(!rules.is_allowed("/page", "TestBot"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_entry_is_never_replaced() {
        let mut cache = RobotsCache::new();
        cache.insert("example.com", ParsedRobots::from_content("User-agent: *\nDisallow: /"));
        let rules = cache.insert("example.com", ParsedRobots::allow_all());

        assert!(!rules.is_permissive());
        assert!(!cache.get("example.com").unwrap().is_allowed("/x", "TestBot"));
    }
}
