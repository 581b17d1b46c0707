//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Throughput and success-rate arithmetic
//! - The [`CrawlSummary`] the master builds at shutdown
//! - Writing the final markdown report

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, write_report};
pub use stats::ThroughputReport;
pub use traits::{CrawlSummary, OutputError, OutputResult};
