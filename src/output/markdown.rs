//! Markdown report generation
//!
//! This module writes the human-readable final report of a crawl:
//! run metadata, page counts and the full processed-URL list.

use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for `summary` to `output_path`
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_report(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;
    file.flush()?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_report(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Tidecrawl Crawl Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Scope Domain**: {}\n", summary.scope_domain));
    md.push_str(&format!(
        "- **Nodes / Threads**: {} node(s), {} thread(s) each\n",
        summary.expected_nodes, summary.threads_per_worker
    ));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Elapsed**: {:.2} minutes\n",
        summary.elapsed_minutes
    ));
    md.push_str(&format!("- **Ended By**: {}\n", summary.shutdown_reason));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Counts
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Total URLs Processed | {} |\n",
        summary.total_processed
    ));
    md.push_str(&format!("| HTML Pages | {} |\n", summary.html_pages));
    md.push_str(&format!("| Files / Media | {} |\n", summary.file_count));
    md.push_str(&format!(
        "| Skipped (non-HTML) | {} |\n",
        summary.skipped_count
    ));
    md.push_str(&format!("| Unique URLs Seen | {} |\n", summary.unique_urls));
    md.push_str(&format!("| Dispatched | {} |\n", summary.dispatched));
    md.push_str(&format!(
        "| Still Pending | {} |\n\n",
        summary.pending_remaining
    ));

    md.push_str(&format!(
        "- **Throughput**: {:.2} pages/min\n",
        summary.pages_per_minute()
    ));
    md.push_str(&format!(
        "- **Completion Rate**: {:.1}% of dispatched URLs\n\n",
        summary.completion_rate()
    ));

    // Processed list
    md.push_str("## Processed URLs\n\n");
    if summary.processed.is_empty() {
        md.push_str("_No URLs were processed._\n");
    } else {
        for (idx, entry) in summary.processed.iter().enumerate() {
            md.push_str(&format!(
                "{}. {} | {}\n",
                idx + 1,
                escape_markdown(&entry.descriptor),
                entry.url
            ));
        }
    }

    md
}

// Titles come from arbitrary pages; keep them from breaking list items
// or the ` | ` separator before the URL
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '_' | '`' | '[' | ']' | '<' | '>' | '|') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
