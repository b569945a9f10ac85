//! Breadth-first crawl frontier
//!
//! The frontier is a strict FIFO of `(url, depth)` entries plus the set of
//! normalized keys that have already been visited. Keys are produced by
//! [`normalize_url`]; the queue keeps each URL as it was discovered so the
//! fetch goes to the exact address the page linked to.

use crate::url::normalize_url;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// FIFO queue of URLs to crawl with visited-set deduplication
///
/// Invariants:
/// - every queued entry has `depth <= max_depth`
/// - a key is never both queued and visited
/// - a key is queued at most once
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Rebuilds a frontier from persisted queue and visited lists
    ///
    /// Entries that would break the frontier invariants (too deep, already
    /// visited, duplicated or unparseable) are dropped.
    pub fn restore(
        max_depth: u32,
        queue: impl IntoIterator<Item = (String, u32)>,
        visited: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut frontier = Self::new(max_depth);

        for url in visited {
            let key = normalize_url(&url).map(|u| u.to_string()).unwrap_or(url);
            frontier.visited.insert(key);
        }

        for (url, depth) in queue {
            frontier.enqueue(&url, depth);
        }

        frontier
    }

    /// Adds a URL to the back of the queue
    ///
    /// Returns false without changing anything if the URL cannot be
    /// normalized, exceeds the depth limit, or its key is already visited or
    /// queued.
    pub fn enqueue(&mut self, url: &str, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        let key = match normalize_url(url) {
            Ok(normalized) => normalized.to_string(),
            Err(e) => {
                tracing::trace!("Not queueing {}: {}", url, e);
                return false;
            }
        };

        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }

        self.queued.insert(key);
        self.queue.push_back(FrontierEntry {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Removes and returns the oldest entry
    ///
    /// The caller is expected to [`mark_visited`](Self::mark_visited) the
    /// entry immediately, whatever happens to it afterwards.
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        if let Ok(normalized) = normalize_url(&entry.url) {
            self.queued.remove(normalized.as_str());
        }
        Some(entry)
    }

    /// Records a URL as visited; returns false if it was already visited
    pub fn mark_visited(&mut self, url: &str) -> bool {
        let key = normalize_url(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.visited.insert(key)
    }

    /// Returns true if the URL's key has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        match normalize_url(url) {
            Ok(normalized) => self.visited.contains(normalized.as_str()),
            Err(_) => self.visited.contains(url),
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of visited keys
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Queued entries in FIFO order
    pub fn entries(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }

    /// Visited keys, in no particular order
    pub fn visited(&self) -> impl Iterator<Item = &String> {
        self.visited.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frontier() {
        let frontier = Frontier::new(2);
        assert!(frontier.is_empty());
        assert_eq!(frontier.visited_count(), 0);
        assert_eq!(frontier.max_depth(), 2);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(3);
        frontier.enqueue("https://example.com/a", 0);
        frontier.enqueue("https://example.com/b", 1);
        frontier.enqueue("https://example.com/c", 1);

        let order: Vec<String> = std::iter::from_fn(|| frontier.dequeue())
            .map(|e| e.url)
            .collect();

        assert_eq!(
            order,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
    }

    #[test]
    fn test_reject_depth_over_limit() {
        let mut frontier = Frontier::new(1);
        assert!(frontier.enqueue("https://example.com/a", 1));
        assert!(!frontier.enqueue("https://example.com/b", 2));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_reject_duplicate_key_while_queued() {
        let mut frontier = Frontier::new(3);
        assert!(frontier.enqueue("https://example.com/page", 0));
        assert!(!frontier.enqueue("https://EXAMPLE.com/page/#top", 1));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_reject_visited() {
        let mut frontier = Frontier::new(3);
        frontier.enqueue("https://example.com/page", 0);
        let entry = frontier.dequeue().unwrap();
        assert!(frontier.mark_visited(&entry.url));

        assert!(!frontier.enqueue("https://example.com/page", 1));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_mark_visited_once() {
        let mut frontier = Frontier::new(3);
        assert!(frontier.mark_visited("https://example.com/a"));
        assert!(!frontier.mark_visited("https://example.com/a/"));
        assert_eq!(frontier.visited_count(), 1);
        assert!(frontier.is_visited("https://Example.com/a"));
    }

    #[test]
    fn test_reject_invalid_url() {
        let mut frontier = Frontier::new(3);
        assert!(!frontier.enqueue("mailto:someone@example.com", 0));
        assert!(!frontier.enqueue("not a url", 0));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_keeps_original_url_for_fetching() {
        let mut frontier = Frontier::new(3);
        frontier.enqueue("https://example.com/item.php?id=4", 0);
        assert_eq!(
            frontier.dequeue().unwrap().url,
            "https://example.com/item.php?id=4"
        );
    }

    #[test]
    fn test_restore_enforces_invariants() {
        let frontier = Frontier::restore(
            1,
            vec![
                ("https://example.com/a".to_string(), 0),
                ("https://example.com/a/".to_string(), 1),
                ("https://example.com/visited".to_string(), 1),
                ("https://example.com/deep".to_string(), 2),
            ],
            vec!["https://example.com/visited".to_string()],
        );

        let urls: Vec<&str> = frontier.entries().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/a"]);
        assert_eq!(frontier.visited_count(), 1);
    }
}
