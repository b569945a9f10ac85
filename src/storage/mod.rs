//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Relevant page persistence, deduplicated across sessions
//! - Session tracking and aggregate statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlerError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteStorage::new(path)
}

/// A relevant page stored in the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub content_snippet: Option<String>,
    pub relevance_score: f64,
    pub depth: u32,
    pub crawled_at: String,
    pub keywords_matched: Vec<String>,
}

/// A crawl session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub keywords: Vec<String>,
    pub config_hash: String,
    pub pages_crawled: u64,
    pub relevant_found: u64,
    pub status: RunStatus,
}

/// Totals across all sessions in a database
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageStatistics {
    pub total_pages: u64,
    /// Mean relevance score of stored pages, 0.0 when there are none
    pub average_relevance: f64,
    pub total_sessions: u64,
    /// Wall-clock seconds summed over finished sessions
    pub total_elapsed_seconds: f64,
}

/// Status of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}
