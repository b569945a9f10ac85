//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The FIFO frontier with visited-set deduplication
//! - robots.txt checks and per-domain rate limiting
//! - HTTP fetching and HTML parsing
//! - Overall crawl coordination and shutdown

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod politeness;
mod settings;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, resolve_link, ParsedPage};
pub use politeness::Politeness;
pub use settings::SessionSettings;
