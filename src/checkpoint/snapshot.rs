use crate::checkpoint::CheckpointError;
use crate::crawler::{Frontier, SessionSettings};
use crate::scoring::RelevanceState;
use crate::state::{CrawlState, ResultRecord};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Serialized form of a crawl session
///
/// Settings fields are optional so snapshots written by older versions, or
/// edited by hand, still load: a missing field falls back to the value in the
/// running session. State fields default to empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrawlSnapshot {
    #[serde(default)]
    pub timestamp: String,

    // ===== Session settings =====
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub seed_urls: Option<Vec<String>>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub delay: Option<f64>,
    #[serde(default)]
    pub use_stemming: Option<bool>,
    #[serde(default)]
    pub use_lemmatization: Option<bool>,
    #[serde(default)]
    pub remove_stopwords: Option<bool>,
    #[serde(default)]
    pub use_tfidf: Option<bool>,
    #[serde(default)]
    pub min_relevance_score: Option<f64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub stay_in_domain: Option<bool>,
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(default)]
    pub excluded_domains: Option<Vec<String>>,
    /// Outer `None`: field absent. `Some(None)`: explicitly no pattern.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub regex_pattern: Option<Option<String>>,
    #[serde(default)]
    pub seed_domains: Option<Vec<String>>,

    // ===== Crawl state =====
    #[serde(default)]
    pub visited: Vec<String>,
    #[serde(default)]
    pub queue: Vec<(String, u32)>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub document_frequencies: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_documents: u64,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl CrawlSnapshot {
    /// Captures the live session
    pub fn capture(settings: &SessionSettings, state: &CrawlState) -> Self {
        let mut visited: Vec<String> = state.frontier.visited().cloned().collect();
        visited.sort();

        Self {
            timestamp: Utc::now().to_rfc3339(),
            keywords: Some(settings.keywords.clone()),
            seed_urls: Some(settings.seed_urls.clone()),
            max_depth: Some(settings.max_depth),
            delay: Some(settings.delay),
            use_stemming: Some(settings.use_stemming),
            use_lemmatization: Some(settings.use_lemmatization),
            remove_stopwords: Some(settings.remove_stopwords),
            use_tfidf: Some(settings.use_tfidf),
            min_relevance_score: Some(settings.min_relevance_score),
            user_agent: Some(settings.user_agent.clone()),
            stay_in_domain: Some(settings.stay_in_domain),
            allowed_domains: Some(settings.allowed_domains.clone()),
            excluded_domains: Some(settings.excluded_domains.clone()),
            regex_pattern: Some(settings.regex_pattern.clone()),
            seed_domains: Some(settings.seed_domains.clone()),
            visited,
            queue: state
                .frontier
                .entries()
                .map(|entry| (entry.url.clone(), entry.depth))
                .collect(),
            results: state.results.clone(),
            document_frequencies: state.relevance.document_frequencies.clone(),
            total_documents: state.relevance.total_documents,
        }
    }

    /// Rebuilds settings and state, filling absent settings from `current`
    ///
    /// Nothing outside the returned values is touched, so a validation error
    /// leaves the caller's session as it was.
    pub fn restore(
        self,
        current: &SessionSettings,
    ) -> Result<(SessionSettings, CrawlState), CheckpointError> {
        let settings = SessionSettings {
            keywords: self.keywords.unwrap_or_else(|| current.keywords.clone()),
            seed_urls: self.seed_urls.unwrap_or_else(|| current.seed_urls.clone()),
            max_depth: self.max_depth.unwrap_or(current.max_depth),
            delay: self.delay.unwrap_or(current.delay),
            user_agent: self.user_agent.unwrap_or_else(|| current.user_agent.clone()),
            use_stemming: self.use_stemming.unwrap_or(current.use_stemming),
            use_lemmatization: self.use_lemmatization.unwrap_or(current.use_lemmatization),
            remove_stopwords: self.remove_stopwords.unwrap_or(current.remove_stopwords),
            use_tfidf: self.use_tfidf.unwrap_or(current.use_tfidf),
            min_relevance_score: self
                .min_relevance_score
                .unwrap_or(current.min_relevance_score),
            stay_in_domain: self.stay_in_domain.unwrap_or(current.stay_in_domain),
            allowed_domains: self
                .allowed_domains
                .unwrap_or_else(|| current.allowed_domains.clone()),
            excluded_domains: self
                .excluded_domains
                .unwrap_or_else(|| current.excluded_domains.clone()),
            regex_pattern: self
                .regex_pattern
                .unwrap_or_else(|| current.regex_pattern.clone()),
            seed_domains: self
                .seed_domains
                .unwrap_or_else(|| current.seed_domains.clone()),
        };

        if !settings.delay.is_finite() || settings.delay < 0.0 {
            return Err(CheckpointError::Invalid(format!(
                "delay must be a non-negative number, got {}",
                settings.delay
            )));
        }

        if !(0.0..=1.0).contains(&settings.min_relevance_score) {
            return Err(CheckpointError::Invalid(format!(
                "min_relevance_score must be between 0 and 1, got {}",
                settings.min_relevance_score
            )));
        }

        if let Some(result) = self
            .results
            .iter()
            .find(|r| !(0.0..=1.0).contains(&r.relevance_score))
        {
            return Err(CheckpointError::Invalid(format!(
                "result {} has score {} outside [0, 1]",
                result.url, result.relevance_score
            )));
        }

        let state = CrawlState {
            frontier: Frontier::restore(settings.max_depth, self.queue, self.visited),
            results: self.results,
            relevance: RelevanceState {
                document_frequencies: self.document_frequencies,
                total_documents: self.total_documents,
            },
        };

        Ok((settings, state))
    }

    /// Number of entries in each state collection: (visited, queued, results)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.visited.len(), self.queue.len(), self.results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn settings() -> SessionSettings {
        let mut config = Config::default();
        config.crawler.keywords = vec!["rust".to_string()];
        config.crawler.seed_urls = vec!["https://example.com/".to_string()];
        config.crawler.max_depth = 2;
        SessionSettings::from_config(&config)
    }

    fn populated_state() -> CrawlState {
        let mut state = CrawlState::new(2);
        state.seed(&["https://example.com/"]);
        let entry = state.frontier.dequeue().unwrap();
        state.frontier.mark_visited(&entry.url);
        state.frontier.enqueue("https://example.com/a", 1);
        state.frontier.enqueue("https://example.com/b", 2);
        state.results.push(ResultRecord {
            url: "https://example.com/".to_string(),
            title: "Home".to_string(),
            relevance_score: 0.75,
            depth: 0,
            timestamp: Utc::now(),
            matched_keywords: vec!["rust".to_string()],
            content: Some("rust home".to_string()),
        });
        state.relevance.observe(&["rust".to_string(), "home".to_string()]);
        state
    }

    #[test]
    fn test_round_trip_through_json() {
        let settings = settings();
        let state = populated_state();

        let json = serde_json::to_string_pretty(&CrawlSnapshot::capture(&settings, &state)).unwrap();
        let snapshot: CrawlSnapshot = serde_json::from_str(&json).unwrap();
        let (restored_settings, restored) = snapshot.restore(&settings).unwrap();

        assert_eq!(restored_settings, settings);
        assert_eq!(restored.results, state.results);
        assert_eq!(restored.relevance, state.relevance);
        assert_eq!(
            restored.frontier.entries().collect::<Vec<_>>(),
            state.frontier.entries().collect::<Vec<_>>()
        );
        assert!(restored.frontier.is_visited("https://example.com/"));
        assert_eq!(restored.frontier.visited_count(), 1);
    }

    #[test]
    fn test_queue_serialized_as_pairs() {
        let json = serde_json::to_value(CrawlSnapshot::capture(&settings(), &populated_state())).unwrap();
        assert_eq!(json["queue"][0][0], "https://example.com/a");
        assert_eq!(json["queue"][0][1], 1);
    }

    #[test]
    fn test_missing_fields_fall_back_to_current() {
        let current = settings();
        let snapshot: CrawlSnapshot =
            serde_json::from_str(r#"{"visited": ["https://example.com/x"], "max_depth": 5}"#).unwrap();

        let (restored, state) = snapshot.restore(&current).unwrap();

        assert_eq!(restored.max_depth, 5);
        assert_eq!(restored.keywords, current.keywords);
        assert_eq!(restored.user_agent, current.user_agent);
        assert_eq!(state.frontier.max_depth(), 5);
        assert!(state.results.is_empty());
    }

    #[test]
    fn test_explicit_null_pattern_clears_current() {
        let mut current = settings();
        current.regex_pattern = Some("rust".to_string());

        let explicit: CrawlSnapshot = serde_json::from_str(r#"{"regex_pattern": null}"#).unwrap();
        let (restored, _) = explicit.restore(&current).unwrap();
        assert_eq!(restored.regex_pattern, None);

        let absent: CrawlSnapshot = serde_json::from_str("{}").unwrap();
        let (restored, _) = absent.restore(&current).unwrap();
        assert_eq!(restored.regex_pattern, Some("rust".to_string()));
    }

    #[test]
    fn test_absent_pattern_survives_round_trip() {
        let partial = CrawlSnapshot {
            max_depth: Some(4),
            ..Default::default()
        };

        let json = serde_json::to_string(&partial).unwrap();
        assert!(!json.contains("regex_pattern"));

        let reloaded: CrawlSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, partial);
        assert_eq!(reloaded.regex_pattern, None);

        let cleared = CrawlSnapshot {
            regex_pattern: Some(None),
            ..Default::default()
        };
        let reloaded: CrawlSnapshot =
            serde_json::from_str(&serde_json::to_string(&cleared).unwrap()).unwrap();
        assert_eq!(reloaded.regex_pattern, Some(None));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let snapshot: CrawlSnapshot = serde_json::from_str(r#"{"delay": -2.0}"#).unwrap();
        assert!(matches!(
            snapshot.restore(&settings()),
            Err(CheckpointError::Invalid(_))
        ));
    }

    #[test]
    fn test_snapshot_has_no_secret_fields() {
        let json = serde_json::to_string(&CrawlSnapshot::capture(&settings(), &populated_state())).unwrap();
        assert!(!json.to_lowercase().contains("api_key"));
    }
}
