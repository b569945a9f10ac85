use crate::crawler::Frontier;
use crate::scoring::RelevanceState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page judged relevant during the crawl
///
/// Appended once per relevant page. Only the rescoring pass mutates
/// `relevance_score` afterwards; `content` is kept for that pass and dropped
/// once the crawl ends unless the caller asked to keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub url: String,
    pub title: String,
    pub relevance_score: f64,
    pub depth: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// All mutable crawl state, owned by the crawl loop and passed explicitly
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    pub frontier: Frontier,
    pub results: Vec<ResultRecord>,
    pub relevance: RelevanceState,
}

impl CrawlState {
    /// Creates an empty state with the given depth limit
    pub fn new(max_depth: u32) -> Self {
        Self {
            frontier: Frontier::new(max_depth),
            results: Vec::new(),
            relevance: RelevanceState::default(),
        }
    }

    /// Enqueues every seed URL at depth 0, returning how many were accepted
    pub fn seed<S: AsRef<str>>(&mut self, seeds: &[S]) -> usize {
        seeds
            .iter()
            .filter(|seed| self.frontier.enqueue(seed.as_ref(), 0))
            .count()
    }

    /// Drops retained page text from every result
    pub fn discard_content(&mut self) {
        for result in &mut self.results {
            result.content = None;
        }
    }
}
