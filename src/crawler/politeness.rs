//! Politeness controller: robots.txt checks and per-domain request spacing

use crate::robots::{fetch_robots, RobotsCache};
use crate::state::DomainClock;
use crate::url::{domain_key, domain_key_of};
use std::time::{Duration, Instant};
use url::Url;

/// Upper bound applied to robots.txt `Crawl-delay` values
const MAX_ROBOTS_DELAY: Duration = Duration::from_secs(60);

/// Enforces robots.txt rules and the minimum interval between requests to the
/// same domain
pub struct Politeness {
    client: reqwest::Client,
    user_agent: String,
    delay: Duration,
    robots: RobotsCache,
    clock: DomainClock,
}

impl Politeness {
    /// Creates a controller
    ///
    /// `client` is used for robots.txt requests and should carry the same
    /// User-Agent as page fetches.
    pub fn new(client: reqwest::Client, user_agent: &str, delay: Duration) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
            delay,
            robots: RobotsCache::new(),
            clock: DomainClock::new(),
        }
    }

    /// Checks robots.txt for `url`, fetching the domain's rules on first use
    ///
    /// URLs without a domain are allowed; the domain filter rejects them first.
    pub async fn can_fetch(&mut self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let Some(domain) = domain_key(&parsed) else {
            return true;
        };

        if !self.robots.contains(&domain) {
            let rules = fetch_robots(&self.client, parsed.scheme(), &domain).await;
            self.robots.insert(&domain, rules);
        }

        self.robots
            .get(&domain)
            .map(|rules| rules.is_allowed(url, &self.user_agent))
            .unwrap_or(true)
    }

    /// Minimum interval between requests to `domain`
    ///
    /// This is the configured delay, raised to the robots.txt `Crawl-delay`
    /// when that is larger.
    pub fn interval_for(&self, domain: &str) -> Duration {
        let robots_delay = self
            .robots
            .get(domain)
            .and_then(|rules| rules.crawl_delay(&self.user_agent))
            .map(|secs| Duration::from_secs_f64(secs.min(MAX_ROBOTS_DELAY.as_secs_f64())))
            .unwrap_or(Duration::ZERO);

        self.delay.max(robots_delay)
    }

    /// Waits until a request to `url`'s domain is permitted, then records the
    /// access
    ///
    /// The last-access instant is taken after the wait. If the URL has no
    /// domain the full configured delay is slept.
    ///
    /// Returns the time spent waiting.
    pub async fn await_turn(&mut self, url: &str) -> Duration {
        let Some(domain) = domain_key_of(url) else {
            tracing::warn!("No domain for {}, sleeping the full delay", url);
            tokio::time::sleep(self.delay).await;
            return self.delay;
        };

        let interval = self.interval_for(&domain);
        let wait = self
            .clock
            .time_until_next_request(&domain, interval, Instant::now())
            .unwrap_or(Duration::ZERO);

        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request to {}", wait, domain);
            tokio::time::sleep(wait).await;
        }

        self.clock.record_access(&domain, Instant::now());
        wait
    }

    /// Number of domains with cached robots.txt rules
    pub fn robots_cached(&self) -> usize {
        self.robots.len()
    }
}
