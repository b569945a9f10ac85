//! Output module for crawl results and reports
//!
//! This module handles:
//! - Writing session results to JSON or CSV
//! - Exporting stored pages from the database
//! - Printing crawl reports, storage statistics and checkpoint listings

mod report;
mod results;
pub mod stats;

pub use report::{print_checkpoint_list, print_crawl_report, print_page_list};
pub use results::{export_pages, write_results};
pub use stats::{format_duration, print_statistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
