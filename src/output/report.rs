use crate::checkpoint::CheckpointInfo;
use crate::crawler::CrawlReport;
use crate::output::format_duration;
use crate::storage::PageRecord;

/// Prints the outcome of a crawl and its top `limit` results
pub fn print_crawl_report(report: &CrawlReport, limit: usize) {
    println!("=== Crawl Summary ===\n");

    if report.interrupted {
        println!("Crawl was interrupted; resume from the final checkpoint to continue.");
    }
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Fetch errors: {}", report.fetch_errors);
    println!("  Relevant pages: {}", report.relevant_found);
    println!("  Elapsed: {}", format_duration(report.elapsed.as_secs_f64()));
    if let Some(path) = &report.final_checkpoint {
        println!("  Final checkpoint: {}", path.display());
    }
    println!();

    if report.results.is_empty() {
        println!("No relevant pages found.");
        return;
    }

    println!("Top results:");
    for (i, result) in report.results.iter().take(limit).enumerate() {
        println!(
            "{}. {} ({:.3}, depth {})",
            i + 1,
            result.title,
            result.relevance_score,
            result.depth
        );
        println!("   {}", result.url);
        if !result.matched_keywords.is_empty() {
            println!("   Matched: {}", result.matched_keywords.join(", "));
        }
    }
    if report.results.len() > limit {
        println!("... and {} more", report.results.len() - limit);
    }
}

/// Formats one stored page as a numbered, multi-line entry
fn format_page_entry(position: usize, page: &PageRecord) -> String {
    let mut entry = format!(
        "{}. {}\n   URL: {}\n   Relevance score: {:.4}\n   Depth: {}\n   Crawled at: {}",
        position,
        page.title.as_deref().unwrap_or(&page.url),
        page.url,
        page.relevance_score,
        page.depth,
        page.crawled_at
    );
    if !page.keywords_matched.is_empty() {
        entry.push_str(&format!(
            "\n   Keywords matched: {}",
            page.keywords_matched.join(", ")
        ));
    }
    entry
}

/// Prints stored pages under `heading`, numbered from `offset + 1`
pub fn print_page_list(heading: &str, pages: &[PageRecord], offset: usize) {
    println!("=== {} ===\n", heading);

    if pages.is_empty() {
        println!("No pages found in the database.");
        return;
    }

    for (i, page) in pages.iter().enumerate() {
        println!("{}\n", format_page_entry(offset + i + 1, page));
    }
}

/// Prints checkpoint files, newest first
pub fn print_checkpoint_list(checkpoints: &[CheckpointInfo]) {
    if checkpoints.is_empty() {
        println!("No checkpoints found.");
        return;
    }

    println!("=== Checkpoints ({}) ===\n", checkpoints.len());
    for info in checkpoints {
        let name = info
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| info.path.display().to_string());
        println!(
            "{} [{}] {} ({} bytes)",
            name,
            info.kind,
            info.modified.format("%Y-%m-%d %H:%M:%S UTC"),
            info.size_bytes
        );
        match &info.summary {
            Some((timestamp, (visited, queued, results))) => println!(
                "   saved {}: {} visited, {} queued, {} results",
                timestamp, visited, queued, results
            ),
            None => println!("   (unreadable)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: Option<&str>, keywords: &[&str]) -> PageRecord {
        PageRecord {
            id: 1,
            url: "https://example.com/rust".to_string(),
            title: title.map(str::to_string),
            content_snippet: None,
            relevance_score: 0.5,
            depth: 2,
            crawled_at: "2024-01-01T00:00:00.000Z".to_string(),
            keywords_matched: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_format_page_entry() {
        let entry = format_page_entry(3, &page(Some("Rust"), &["rust", "tokio"]));

        assert!(entry.starts_with("3. Rust\n"));
        assert!(entry.contains("URL: https://example.com/rust"));
        assert!(entry.contains("Relevance score: 0.5000"));
        assert!(entry.contains("Depth: 2"));
        assert!(entry.ends_with("Keywords matched: rust, tokio"));
    }

    #[test]
    fn test_format_page_entry_without_title_or_keywords() {
        let entry = format_page_entry(1, &page(None, &[]));

        assert!(entry.starts_with("1. https://example.com/rust\n"));
        assert!(!entry.contains("Keywords matched"));
    }
}
