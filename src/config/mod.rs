//! Configuration module for the keyword crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use keyword_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckpointConfig, Config, CrawlerConfig, DomainConfig, MatchingConfig, OutputConfig,
    ResultsFormat, SeedSuggestionConfig, MAX_CHECKPOINT_INTERVAL_SECS,
    MIN_CHECKPOINT_INTERVAL_SECS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;
