use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks when each domain was last accessed, for per-domain rate limiting
///
/// The clock only stores instants; the caller decides the interval, which may
/// differ per domain when robots.txt asks for a longer crawl delay.
#[derive(Debug, Clone, Default)]
pub struct DomainClock {
    last_access: HashMap<String, Instant>,
}

impl DomainClock {
    /// Creates an empty clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request to `domain` may start
    ///
    /// Returns None if a request can be made now, or the duration to wait
    /// otherwise.
    pub fn time_until_next_request(
        &self,
        domain: &str,
        interval: Duration,
        now: Instant,
    ) -> Option<Duration> {
        let last = self.last_access.get(domain)?;
        let elapsed = now.saturating_duration_since(*last);
        if elapsed < interval {
            Some(interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request to `domain` started at `now`
    pub fn record_access(&mut self, domain: &str, now: Instant) {
        self.last_access.insert(domain.to_string(), now);
    }

    /// Returns the instant of the last recorded access to `domain`
    pub fn last_access(&self, domain: &str) -> Option<Instant> {
        self.last_access.get(domain).copied()
    }

    /// Number of domains seen this session
    pub fn len(&self) -> usize {
        self.last_access.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_access.is_empty()
    }
}
