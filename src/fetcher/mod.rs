//! Page fetching for worker sessions
//!
//! This module contains everything a worker does with a single URL:
//! - the [`PageFetcher`] seam sessions call through
//! - the HTTP implementation with politeness delay, retries and backoff
//! - HTML parsing for the descriptor and outgoing links
//! - the [`Descriptor`] and [`FetchError`] outcome types

mod descriptor;
mod error;
mod http;
mod parser;

pub use descriptor::{
    file_extension, is_file_descriptor, is_skipped_descriptor, Descriptor, FILE_EXTENSIONS,
    FILE_PREFIX, NO_TITLE, SKIPPED_PREFIX,
};
pub use error::FetchError;
pub use http::{
    build_http_client, is_html_content_type, is_retryable_status, FetchSettings, HttpPageFetcher,
};
pub use parser::{parse_html, ParsedPage, PARAGRAPH_EXCERPT_CHARS};

use async_trait::async_trait;

/// What a successful fetch hands back to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub descriptor: Descriptor,
    /// Absolute URLs discovered on the page; empty for files and skipped content
    pub links: Vec<String>,
}

/// Turns a URL into a descriptor and its outgoing links
///
/// Failures come back as a typed [`FetchError`]; implementations never
/// panic on bad pages. Shared by every session in a worker process.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
