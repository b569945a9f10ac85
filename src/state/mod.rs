//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Lifecycle of a crawl session (idle, running, terminating, done)
//! - `CrawlState`: Frontier, result list and relevance statistics owned by the crawl loop
//! - `DomainClock`: Per-domain last-access instants for rate limiting

mod crawl_phase;
mod crawl_state;
mod domain_clock;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlState, ResultRecord};
pub use domain_clock::DomainClock;
