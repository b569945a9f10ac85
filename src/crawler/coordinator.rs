//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and resuming from checkpoints
//! - Domain filtering, robots.txt checks and rate limiting
//! - Fetching, scoring and recording pages
//! - Periodic checkpoints and orderly shutdown

use crate::checkpoint::{CheckpointError, CheckpointKind, CheckpointManager, CheckpointTimer, CrawlSnapshot};
use crate::config::Config;
use crate::crawler::{build_http_client, fetch_url, parse_html, FetchResult, FrontierEntry, Politeness, SessionSettings};
use crate::scoring::{Assessment, Scorer};
use crate::state::{CrawlPhase, CrawlState, ResultRecord};
use crate::storage::{RunStatus, Storage};
use crate::url::{normalize_url, DomainFilter};
use crate::{ConfigError, CrawlerError};
use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Characters of page text kept in the stored snippet
const SNIPPET_CHARS: usize = 500;

/// Newly relevant documents between two rescoring passes
const RESCORE_EVERY: usize = 10;

/// Pages fetched between two progress log lines
const PROGRESS_EVERY: usize = 10;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// URLs marked visited, including ones skipped by filters
    pub pages_visited: usize,
    /// URLs actually requested
    pub pages_fetched: usize,
    pub relevant_found: usize,
    pub fetch_errors: usize,
    /// Relevant pages; ordered by score when TF-IDF is active
    pub results: Vec<ResultRecord>,
    pub final_checkpoint: Option<PathBuf>,
    /// True if the crawl stopped on a shutdown request
    pub interrupted: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct LoopStats {
    fetched: usize,
    skipped: usize,
    fetch_errors: usize,
    since_rescore: usize,
}

/// Main crawler coordinator structure
///
/// Owns the whole session: settings, crawl state, scorer and politeness
/// controller. The phase machine `Idle -> Running -> Terminating -> Done`
/// guards resume (Idle only), automatic checkpoints (Running only) and the
/// final checkpoint (once, on entering Terminating).
pub struct Coordinator {
    settings: SessionSettings,
    state: CrawlState,
    scorer: Scorer,
    filter: DomainFilter,
    politeness: Politeness,
    client: Client,
    fetch_timeout: Duration,
    checkpoints: CheckpointManager,
    checkpoint_interval: Duration,
    include_content: bool,
    storage: Option<Box<dyn Storage + Send>>,
    config_hash: String,
    phase: CrawlPhase,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator and seeds the frontier
    ///
    /// # Arguments
    ///
    /// * `config` - A validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to [`run`](Self::run)
    /// * `Err(CrawlerError)` - No keywords or pattern, a bad pattern, or the
    ///   HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, CrawlerError> {
        let settings = SessionSettings::from_config(config);
        let has_pattern = settings
            .regex_pattern
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        if settings.keywords.is_empty() && !has_pattern {
            return Err(ConfigError::Validation(
                "at least one keyword or a regex pattern is required".to_string(),
            )
            .into());
        }

        let fetch_timeout = Duration::from_secs(config.crawler.fetch_timeout.max(1));
        let (scorer, filter, politeness, client) = Self::build_session(&settings, fetch_timeout)?;

        let mut state = CrawlState::new(settings.max_depth);
        let seeded = state.seed(&settings.seed_urls);
        tracing::info!(
            "Seeded frontier with {} of {} seed URLs",
            seeded,
            settings.seed_urls.len()
        );

        Ok(Self {
            settings,
            state,
            scorer,
            filter,
            politeness,
            client,
            fetch_timeout,
            checkpoints: CheckpointManager::new(&config.checkpoint.directory),
            checkpoint_interval: config.checkpoint.effective_interval(),
            include_content: config.output.include_content,
            storage: None,
            config_hash: String::new(),
            phase: CrawlPhase::Idle,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Attaches a storage backend; a session row is opened when the crawl starts
    pub fn with_storage(mut self, storage: Box<dyn Storage + Send>, config_hash: &str) -> Self {
        self.storage = Some(storage);
        self.config_hash = config_hash.to_string();
        self
    }

    #[cfg(test)]
    fn with_checkpoint_interval(mut self, interval: Duration) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Builds everything derived from session settings
    fn build_session(
        settings: &SessionSettings,
        fetch_timeout: Duration,
    ) -> Result<(Scorer, DomainFilter, Politeness, Client), CrawlerError> {
        let scorer = Scorer::from_settings(&settings.keywords, &settings.matching())?;
        let client = build_http_client(&settings.user_agent, fetch_timeout)?;
        let politeness = Politeness::new(
            client.clone(),
            &settings.user_agent,
            settings.delay_duration(),
        );
        Ok((scorer, settings.domain_filter(), politeness, client))
    }

    /// Flag that stops the crawl loop at its next iteration when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn checkpoints(&self) -> &CheckpointManager {
        &self.checkpoints
    }

    /// Replaces the session with the contents of a checkpoint file
    ///
    /// Only allowed before the crawl starts. On any error the current
    /// session is left exactly as it was.
    pub fn resume(&mut self, path: &Path) -> Result<(), CheckpointError> {
        if !self.phase.accepts_resume() {
            return Err(CheckpointError::NotIdle(self.phase));
        }

        let snapshot = CheckpointManager::load(path)?;
        let timestamp = snapshot.timestamp.clone();
        let (settings, state) = snapshot.restore(&self.settings)?;
        let (scorer, filter, politeness, client) =
            Self::build_session(&settings, self.fetch_timeout)
                .map_err(|e| CheckpointError::Invalid(e.to_string()))?;

        tracing::info!(
            "Resumed from {} (saved {}): {} visited, {} queued, {} results",
            path.display(),
            timestamp,
            state.frontier.visited_count(),
            state.frontier.len(),
            state.results.len()
        );

        self.settings = settings;
        self.state = state;
        self.scorer = scorer;
        self.filter = filter;
        self.politeness = politeness;
        self.client = client;
        Ok(())
    }

    /// Writes a checkpoint of the current session
    ///
    /// Automatic checkpoints are skipped unless the crawl is running. Save
    /// failures are logged and reported as `None`.
    pub fn save_checkpoint(&self, kind: CheckpointKind) -> Option<PathBuf> {
        if kind == CheckpointKind::Auto && !self.phase.is_running() {
            tracing::debug!("Skipping automatic checkpoint while {}", self.phase);
            return None;
        }

        let snapshot = CrawlSnapshot::capture(&self.settings, &self.state);
        match self.checkpoints.save(kind, &snapshot) {
            Ok(path) => {
                tracing::info!("Saved {} checkpoint to {}", kind, path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Failed to save {} checkpoint: {}", kind, e);
                None
            }
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the main crawl loop until the frontier is empty or shutdown is
    /// requested, then terminates the session
    ///
    /// Each iteration:
    /// 1. Saves an automatic checkpoint if one is due
    /// 2. Dequeues the next URL and marks it visited
    /// 3. Applies the domain filter, robots.txt and the storage dedup check
    /// 4. Waits for the domain's turn, fetches and scores the page
    /// 5. Records relevant pages and enqueues links one level deeper
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlerError> {
        self.transition(CrawlPhase::Running)?;

        let session_id = match self.storage.as_mut() {
            Some(storage) => Some(storage.start_session(&self.settings.keywords, &self.config_hash)?),
            None => None,
        };
        tracing::info!(
            "Starting crawl with {} scoring: {} keywords, max depth {}, {} queued",
            self.scorer.name(),
            self.settings.keywords.len(),
            self.settings.max_depth,
            self.state.frontier.len()
        );

        let started = Instant::now();
        let mut timer = CheckpointTimer::start(self.checkpoint_interval);
        let mut stats = LoopStats::default();

        while !self.shutdown.load(Ordering::SeqCst) {
            if timer.due() {
                self.save_checkpoint(CheckpointKind::Auto);
            }

            let Some(entry) = self.state.frontier.dequeue() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let fetched_before = stats.fetched;
            self.process_entry(entry, &mut stats).await;

            if stats.fetched != fetched_before && stats.fetched % PROGRESS_EVERY == 0 {
                let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages fetched, {} queued, {} relevant, {:.2} pages/sec",
                    stats.fetched,
                    self.state.frontier.len(),
                    self.state.results.len(),
                    stats.fetched as f64 / elapsed
                );
            }
        }

        let interrupted = self.shutdown.load(Ordering::SeqCst);
        if interrupted {
            tracing::warn!("Shutdown requested, stopping crawl");
        }
        timer.cancel();

        self.terminate(session_id, stats, started, interrupted)
    }

    async fn process_entry(&mut self, entry: FrontierEntry, stats: &mut LoopStats) {
        let FrontierEntry { url, depth } = entry;
        self.state.frontier.mark_visited(&url);

        let decision = self.filter.evaluate(&url);
        if !decision.should_crawl() {
            tracing::debug!("Skipping {} (domain filter: {:?})", url, decision);
            stats.skipped += 1;
            return;
        }

        if !self.politeness.can_fetch(&url).await {
            tracing::debug!("Skipping {} (disallowed by robots.txt)", url);
            stats.skipped += 1;
            return;
        }

        let key = normalize_url(&url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.clone());
        if self.already_stored(&key) {
            tracing::debug!("Skipping {} (already in database)", url);
            stats.skipped += 1;
            return;
        }

        self.politeness.await_turn(&url).await;

        tracing::info!("Crawling: {} (depth: {})", url, depth);
        stats.fetched += 1;

        let (final_url, body) = match fetch_url(&self.client, &url).await {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            failure => {
                tracing::warn!("Error crawling {}: {}", url, failure.describe());
                stats.fetch_errors += 1;
                return;
            }
        };

        let base = match Url::parse(&final_url).or_else(|_| Url::parse(&url)) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Error crawling {}: {}", url, e);
                stats.fetch_errors += 1;
                return;
            }
        };

        let page = parse_html(&body, &base);
        let assessment = self.scorer.assess(&page.text, &mut self.state.relevance);

        if assessment.relevant {
            let title = page.title.clone().unwrap_or_else(|| url.clone());
            self.record(&url, &key, title, depth, assessment, &page.text);
            stats.since_rescore += 1;

            if self.scorer.uses_tfidf() && stats.since_rescore >= RESCORE_EVERY {
                self.rescore();
                stats.since_rescore = 0;
            }
        }

        if depth < self.settings.max_depth {
            let queued = page
                .links
                .iter()
                .filter(|link| self.state.frontier.enqueue(link, depth + 1))
                .count();
            tracing::debug!("Queued {} of {} links from {}", queued, page.links.len(), url);
        }
    }

    fn already_stored(&self, key: &str) -> bool {
        let Some(storage) = self.storage.as_ref() else {
            return false;
        };
        match storage.is_url_crawled(key) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Storage lookup failed for {}: {}", key, e);
                false
            }
        }
    }

    fn record(
        &mut self,
        url: &str,
        key: &str,
        title: String,
        depth: u32,
        assessment: Assessment,
        text: &str,
    ) {
        let matched_keywords = self.scorer.matched_keywords(text);
        let keep_content = self.scorer.uses_tfidf() || self.include_content;

        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.add_page(
                key,
                &title,
                &snippet(text),
                assessment.score,
                depth,
                &matched_keywords,
            ) {
                tracing::warn!("Failed to store {}: {}", url, e);
            }
        }

        tracing::info!(
            "Found relevant page: {} (score {:.3})",
            title,
            assessment.score
        );
        self.state.results.push(ResultRecord {
            url: url.to_string(),
            title,
            relevance_score: assessment.score,
            depth,
            timestamp: Utc::now(),
            matched_keywords,
            content: keep_content.then(|| text.to_string()),
        });
    }

    fn rescore(&mut self) {
        self.scorer
            .rescore(&mut self.state.results, &self.state.relevance);
        tracing::debug!(
            "Rescored {} results against {} documents",
            self.state.results.len(),
            self.state.relevance.total_documents
        );
    }

    fn terminate(
        &mut self,
        session_id: Option<i64>,
        stats: LoopStats,
        started: Instant,
        interrupted: bool,
    ) -> Result<CrawlReport, CrawlerError> {
        self.transition(CrawlPhase::Terminating)?;

        let final_checkpoint = self.save_checkpoint(CheckpointKind::Final);

        if self.scorer.uses_tfidf() {
            self.rescore();
        }
        if !self.include_content {
            self.state.discard_content();
        }

        let pages_visited = self.state.frontier.visited_count();
        let relevant_found = self.state.results.len();

        if let (Some(storage), Some(id)) = (self.storage.as_mut(), session_id) {
            let status = if interrupted {
                RunStatus::Interrupted
            } else {
                RunStatus::Completed
            };
            if let Err(e) = storage.end_session(id, pages_visited as u64, relevant_found as u64, status) {
                tracing::error!("Failed to close session {}: {}", id, e);
            }
        }

        let elapsed = started.elapsed();
        tracing::info!(
            "Crawl finished in {:.1}s: {} visited, {} fetched, {} skipped, {} errors, {} relevant",
            elapsed.as_secs_f64(),
            pages_visited,
            stats.fetched,
            stats.skipped,
            stats.fetch_errors,
            relevant_found
        );

        self.transition(CrawlPhase::Done)?;

        Ok(CrawlReport {
            pages_visited,
            pages_fetched: stats.fetched,
            relevant_found,
            fetch_errors: stats.fetch_errors,
            results: self.state.results.clone(),
            final_checkpoint,
            interrupted,
            elapsed,
        })
    }
}

/// First [`SNIPPET_CHARS`] characters of `text`, with an ellipsis if cut
fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
