//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{PageRecord, RunStatus, SessionRecord, StorageStatistics};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The crawler records one session per run and one row per relevant page.
/// Page URLs are normalized keys, unique across sessions.
pub trait Storage {
    // ===== Session Management =====

    /// Opens a new crawl session
    ///
    /// # Arguments
    ///
    /// * `keywords` - Keywords the session searches for
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created session
    fn start_session(&mut self, keywords: &[String], config_hash: &str) -> StorageResult<i64>;

    /// Closes a session with its final counters and status
    fn end_session(
        &mut self,
        session_id: i64,
        pages_crawled: u64,
        relevant_found: u64,
        status: RunStatus,
    ) -> StorageResult<()>;

    /// Lists sessions, newest first
    fn get_sessions(&self, limit: usize, offset: usize) -> StorageResult<Vec<SessionRecord>>;

    // ===== Page Management =====

    /// Returns true if the URL was stored by this or an earlier session
    fn is_url_crawled(&self, url: &str) -> StorageResult<bool>;

    /// Stores a relevant page
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The page was inserted
    /// * `Ok(false)` - A page with this URL already exists
    fn add_page(
        &mut self,
        url: &str,
        title: &str,
        snippet: &str,
        relevance_score: f64,
        depth: u32,
        keywords_matched: &[String],
    ) -> StorageResult<bool>;

    /// Pages with score >= `min_score`, highest score first
    fn get_relevant_pages(
        &self,
        limit: usize,
        offset: usize,
        min_score: f64,
    ) -> StorageResult<Vec<PageRecord>>;

    /// Pages in reverse crawl order
    fn get_recent_pages(&self, limit: usize, offset: usize) -> StorageResult<Vec<PageRecord>>;

    // ===== Statistics =====

    /// Totals across every session
    fn get_statistics(&self) -> StorageResult<StorageStatistics>;

    // ===== Maintenance =====

    /// Reclaims unused space in the database file
    fn vacuum(&mut self) -> StorageResult<()>;
}
