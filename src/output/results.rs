use crate::config::ResultsFormat;
use crate::output::OutputResult;
use crate::state::ResultRecord;
use crate::storage::PageRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Separator used for list fields in CSV output
const LIST_SEPARATOR: &str = "; ";

fn create(path: &Path) -> OutputResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes session results to `path`
///
/// Retained page text is written only when `include_content` is set.
pub fn write_results(
    path: &Path,
    results: &[ResultRecord],
    format: ResultsFormat,
    pretty: bool,
    include_content: bool,
) -> OutputResult<()> {
    let mut writer = create(path)?;

    match format {
        ResultsFormat::Json => {
            let records: Vec<ResultRecord> = results
                .iter()
                .cloned()
                .map(|mut r| {
                    if !include_content {
                        r.content = None;
                    }
                    r
                })
                .collect();
            if pretty {
                serde_json::to_writer_pretty(&mut writer, &records)?;
            } else {
                serde_json::to_writer(&mut writer, &records)?;
            }
            writer.write_all(b"\n")?;
        }
        ResultsFormat::Csv => {
            let mut csv = csv::Writer::from_writer(&mut writer);
            let mut header = vec![
                "url",
                "title",
                "relevance_score",
                "depth",
                "timestamp",
                "matched_keywords",
            ];
            if include_content {
                header.push("content");
            }
            csv.write_record(&header)?;

            for r in results {
                let mut row = vec![
                    r.url.clone(),
                    r.title.clone(),
                    format!("{:.6}", r.relevance_score),
                    r.depth.to_string(),
                    r.timestamp.to_rfc3339(),
                    r.matched_keywords.join(LIST_SEPARATOR),
                ];
                if include_content {
                    row.push(r.content.clone().unwrap_or_default());
                }
                csv.write_record(&row)?;
            }
            csv.flush()?;
        }
    }

    writer.flush()?;
    tracing::info!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// Exports stored pages to `path`, returning how many were written
pub fn export_pages(path: &Path, pages: &[PageRecord], format: ResultsFormat) -> OutputResult<usize> {
    let mut writer = create(path)?;

    match format {
        ResultsFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, pages)?;
            writer.write_all(b"\n")?;
        }
        ResultsFormat::Csv => {
            let mut csv = csv::Writer::from_writer(&mut writer);
            csv.write_record([
                "id",
                "url",
                "title",
                "content_snippet",
                "relevance_score",
                "depth",
                "crawled_at",
                "keywords_matched",
            ])?;
            for page in pages {
                csv.write_record([
                    page.id.to_string(),
                    page.url.clone(),
                    page.title.clone().unwrap_or_default(),
                    page.content_snippet.clone().unwrap_or_default(),
                    format!("{:.6}", page.relevance_score),
                    page.depth.to_string(),
                    page.crawled_at.clone(),
                    page.keywords_matched.join(LIST_SEPARATOR),
                ])?;
            }
            csv.flush()?;
        }
    }

    writer.flush()?;
    Ok(pages.len())
}
