//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the crawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl session
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    keywords TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    pages_crawled INTEGER NOT NULL DEFAULT 0,
    relevant_found INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL
);

-- Relevant pages, unique by normalized URL across all sessions
CREATE TABLE IF NOT EXISTS crawled_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT,
    content_snippet TEXT,
    relevance_score REAL NOT NULL,
    depth INTEGER NOT NULL,
    crawled_at TEXT NOT NULL,
    keywords_matched TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_crawled_pages_score ON crawled_pages(relevance_score);
CREATE INDEX IF NOT EXISTS idx_crawled_pages_crawled_at ON crawled_pages(crawled_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;
