//! Statistics display for the crawl database
//!
//! This module formats the aggregate totals returned by
//! [`Storage::get_statistics`](crate::storage::Storage::get_statistics).

use crate::storage::{SessionRecord, StorageStatistics};

/// Formats seconds as `1h 02m 03s`, `2m 03s` or `3.0s`
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }

    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, secs)
    } else {
        format!("{}m {:02}s", minutes, secs)
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - Totals across every session
/// * `sessions` - Most recent sessions, newest first
pub fn print_statistics(stats: &StorageStatistics, sessions: &[SessionRecord]) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Relevant pages stored: {}", stats.total_pages);
    println!("  Average relevance score: {:.4}", stats.average_relevance);
    println!("  Crawl sessions: {}", stats.total_sessions);
    println!(
        "  Total crawl time: {}",
        format_duration(stats.total_elapsed_seconds)
    );
    println!();

    if sessions.is_empty() {
        return;
    }

    println!("Recent Sessions:");
    for session in sessions {
        println!(
            "  #{} [{}] started {}: {} pages crawled, {} relevant (keywords: {})",
            session.id,
            session.status.to_db_string(),
            session.started_at,
            session.pages_crawled,
            session.relevant_found,
            session.keywords.join(", ")
        );
    }
    println!();
}
