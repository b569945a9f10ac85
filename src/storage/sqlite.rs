//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{PageRecord, RunStatus, SessionRecord, StorageStatistics};
use crate::CrawlerError;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlerError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, CrawlerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Timestamp format understood by SQLite's date functions
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_sql_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn to_sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn from_sql_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn parse_json_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

const PAGE_COLUMNS: &str = "id, url, title, content_snippet, relevance_score, depth, crawled_at, keywords_matched";

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content_snippet: row.get(3)?,
        relevance_score: row.get(4)?,
        depth: row.get(5)?,
        crawled_at: row.get(6)?,
        keywords_matched: parse_json_list(row.get(7)?),
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        keywords: parse_json_list(row.get(3)?),
        config_hash: row.get(4)?,
        pages_crawled: from_sql_count(row.get(5)?),
        relevant_found: from_sql_count(row.get(6)?),
        status: RunStatus::from_db_string(&row.get::<_, String>(7)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Session Management =====

    fn start_session(&mut self, keywords: &[String], config_hash: &str) -> StorageResult<i64> {
        let keywords_json = serde_json::to_string(keywords)?;
        self.conn.execute(
            "INSERT INTO sessions (started_at, keywords, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                now_timestamp(),
                keywords_json,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn end_session(
        &mut self,
        session_id: i64,
        pages_crawled: u64,
        relevant_found: u64,
        status: RunStatus,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE sessions
             SET finished_at = ?1, pages_crawled = ?2, relevant_found = ?3, status = ?4
             WHERE id = ?5",
            params![
                now_timestamp(),
                to_sql_count(pages_crawled),
                to_sql_count(relevant_found),
                status.to_db_string(),
                session_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::SessionNotFound(session_id));
        }
        Ok(())
    }

    fn get_sessions(&self, limit: usize, offset: usize) -> StorageResult<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, keywords, config_hash,
                    pages_crawled, relevant_found, status
             FROM sessions
             ORDER BY id DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let sessions = stmt
            .query_map(
                params![to_sql_limit(limit), to_sql_limit(offset)],
                session_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    // ===== Page Management =====

    fn is_url_crawled(&self, url: &str) -> StorageResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM crawled_pages WHERE url = ?1",
                params![url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn add_page(
        &mut self,
        url: &str,
        title: &str,
        snippet: &str,
        relevance_score: f64,
        depth: u32,
        keywords_matched: &[String],
    ) -> StorageResult<bool> {
        let keywords_json = serde_json::to_string(keywords_matched)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO crawled_pages
                (url, title, content_snippet, relevance_score, depth, crawled_at, keywords_matched)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                url,
                title,
                snippet,
                relevance_score,
                depth,
                now_timestamp(),
                keywords_json
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get_relevant_pages(
        &self,
        limit: usize,
        offset: usize,
        min_score: f64,
    ) -> StorageResult<Vec<PageRecord>> {
        let sql = format!(
            "SELECT {} FROM crawled_pages
             WHERE relevance_score >= ?1
             ORDER BY relevance_score DESC, id ASC
             LIMIT ?2 OFFSET ?3",
            PAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let pages = stmt
            .query_map(
                params![min_score, to_sql_limit(limit), to_sql_limit(offset)],
                page_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn get_recent_pages(&self, limit: usize, offset: usize) -> StorageResult<Vec<PageRecord>> {
        let sql = format!(
            "SELECT {} FROM crawled_pages ORDER BY id DESC LIMIT ?1 OFFSET ?2",
            PAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let pages = stmt
            .query_map(
                params![to_sql_limit(limit), to_sql_limit(offset)],
                page_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    // ===== Statistics =====

    fn get_statistics(&self) -> StorageResult<StorageStatistics> {
        let (total_pages, average_relevance): (i64, f64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(AVG(relevance_score), 0.0) FROM crawled_pages",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (total_sessions, total_elapsed_seconds): (i64, f64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM((julianday(finished_at) - julianday(started_at)) * 86400.0), 0.0)
             FROM sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StorageStatistics {
            total_pages: from_sql_count(total_pages),
            average_relevance,
            total_sessions: from_sql_count(total_sessions),
            total_elapsed_seconds: total_elapsed_seconds.max(0.0),
        })
    }

    // ===== Maintenance =====

    fn vacuum(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("VACUUM;")?;
        Ok(())
    }
}
