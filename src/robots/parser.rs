//! Robots.txt rule evaluation
//!
//! Allow/Disallow matching is delegated to the `robotstxt` crate. The
//! `Crawl-delay` extension is not part of that crate's model, so it is read
//! here with a small group-aware scan.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data for one site
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Permissive fallback installed when robots.txt could not be fetched
    allow_all: bool,
}

impl ParsedRobots {
    /// Wraps fetched robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ruleset that allows everything
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this is the permissive fallback
    pub fn is_permissive(&self) -> bool {
        self.allow_all
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// `url` may be a full URL or a bare path. `user_agent` may be a full
    /// User-Agent header; only its product token is matched against the
    /// `User-agent` lines.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }

    /// Gets the `Crawl-delay` (seconds) that applies to the user agent
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.allow_all {
            return None;
        }

        let agent = product_token(user_agent).to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut specific = None;
        let mut wildcard = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if !delay.is_finite() || delay < 0.0 {
                        continue;
                    }
                    if group_agents.iter().any(|ua| !ua.is_empty() && *ua == agent) {
                        specific = specific.or(Some(delay));
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        wildcard = wildcard.or(Some(delay));
                    }
                }
                _ => in_rules = true,
            }
        }

        specific.or(wildcard)
    }
}

/// Extracts the product token from a User-Agent string
///
/// `"KeywordCrawler/1.0 (+https://example.com)"` becomes `"KeywordCrawler"`.
pub fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or(user_agent)
}
