//! Output types shared by the report writers

use crate::frontier::ProcessedUrl;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the final crawl report needs
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub start_url: String,
    pub scope_domain: String,
    pub expected_nodes: u32,
    pub threads_per_worker: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_minutes: f64,
    pub shutdown_reason: String,
    pub config_hash: Option<String>,

    // Counts
    pub total_processed: u64,
    pub html_pages: u64,
    pub file_count: u64,
    pub skipped_count: u64,
    pub unique_urls: u64,
    pub dispatched: u64,
    pub pending_remaining: u64,

    /// Processed URLs in completion order
    pub processed: Vec<ProcessedUrl>,
}

impl CrawlSummary {
    /// Processed URLs per minute of wall-clock crawl time
    pub fn pages_per_minute(&self) -> f64 {
        if self.elapsed_minutes <= 0.0 {
            return 0.0;
        }
        self.total_processed as f64 / self.elapsed_minutes
    }

    /// Share of dispatched URLs that came back with a result
    ///
    /// Resubmissions can push this over 100 in principle; it is capped.
    pub fn completion_rate(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        ((self.total_processed as f64 / self.dispatched as f64) * 100.0).min(100.0)
    }
}

#[cfg(test)]
pub(crate) fn create_test_summary() -> CrawlSummary {
    CrawlSummary {
        start_url: "https://www.example.com".to_string(),
        scope_domain: "example.com".to_string(),
        expected_nodes: 2,
        threads_per_worker: 4,
        started_at: Utc::now(),
        finished_at: Utc::now(),
        elapsed_minutes: 2.0,
        shutdown_reason: "deadline elapsed".to_string(),
        config_hash: Some("abc123".to_string()),
        total_processed: 3,
        html_pages: 2,
        file_count: 1,
        skipped_count: 0,
        unique_urls: 5,
        dispatched: 4,
        pending_remaining: 1,
        processed: vec![
            ProcessedUrl {
                url: "https://www.example.com".to_string(),
                descriptor: "Home".to_string(),
            },
            ProcessedUrl {
                url: "https://www.example.com/about".to_string(),
                descriptor: "About | Example".to_string(),
            },
            ProcessedUrl {
                url: "https://www.example.com/brochure.pdf".to_string(),
                descriptor: "[FILE] PDF".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_per_minute() {
        let summary = create_test_summary();
        assert!((summary.pages_per_minute() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_completion_rate() {
        let mut summary = create_test_summary();
        assert!((summary.completion_rate() - 75.0).abs() < 1e-9);

        summary.dispatched = 0;
        assert_eq!(summary.completion_rate(), 0.0);
    }

    #[test]
    fn test_zero_elapsed() {
        let mut summary = create_test_summary();
        summary.elapsed_minutes = 0.0;
        assert_eq!(summary.pages_per_minute(), 0.0);
    }
}
