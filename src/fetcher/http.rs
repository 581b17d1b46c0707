//! HTTP page fetcher
//!
//! This module handles all HTTP requests a worker makes, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - A randomized politeness delay before each request
//! - Short-circuiting downloadable files without touching the network
//! - Bounded retries with exponential backoff
//! - Content-Type handling and HTML parsing

use crate::config::WorkerConfig;
use crate::fetcher::descriptor::{file_extension, Descriptor};
use crate::fetcher::error::FetchError;
use crate::fetcher::parser::parse_html;
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::url::parse_http_url;
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Retry and pacing knobs for [`HttpPageFetcher`]
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub politeness_min: Duration,
    pub politeness_max: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl From<&WorkerConfig> for FetchSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            politeness_min: Duration::from_millis(config.politeness_min_ms),
            politeness_max: Duration::from_millis(config.politeness_max_ms),
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

impl FetchSettings {
    /// Delay before attempt `attempt + 1`, where `attempt` counts from 1
    ///
    /// | after attempt | wait        |
    /// |---------------|-------------|
    /// | 1             | base        |
    /// | 2             | base * 2    |
    /// | n             | base * 2^(n-1) |
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }

    /// A uniformly random politeness delay within the configured bounds
    pub fn politeness_delay(&self) -> Duration {
        if self.politeness_max <= self.politeness_min {
            return self.politeness_min;
        }
        rand::rng().random_range(self.politeness_min..=self.politeness_max)
    }
}

/// Builds the HTTP client used by every session of a worker process
///
/// # Example
///
/// ```no_run
/// use tidecrawl::config::WorkerConfig;
/// use tidecrawl::fetcher::build_http_client;
///
/// let client = build_http_client(&WorkerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &WorkerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Status codes worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// True for content types parsed as HTML
///
/// A missing Content-Type is given the benefit of the doubt.
pub fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

/// Fetches pages over HTTP with politeness, retries and backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429 | Retry with backoff |
/// | HTTP 5xx | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Other non-2xx | Immediate → `Status` |
/// | Connection refused, DNS, TLS | Immediate → `Network` |
/// | Attempts used up | `RetriesExhausted` |
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    settings: FetchSettings,
}

impl HttpPageFetcher {
    pub fn new(config: &WorkerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, FetchSettings::from(config)))
    }

    pub fn with_client(client: Client, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Sends GET until a non-retryable response arrives or attempts run out
    async fn get_with_retries(&self, url: &str) -> Result<Response, FetchError> {
        let mut last_status = None;

        for attempt in 1..=self.settings.max_attempts {
            match self.client.get(url).send().await {
                Ok(response) if is_retryable_status(response.status()) => {
                    let status = response.status().as_u16();
                    tracing::debug!(
                        "Attempt {}/{} for {} returned {}",
                        attempt,
                        self.settings.max_attempts,
                        url,
                        status
                    );
                    last_status = Some(status);
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_timeout() => {
                    tracing::debug!(
                        "Attempt {}/{} for {} timed out",
                        attempt,
                        self.settings.max_attempts,
                        url
                    );
                    last_status = None;
                }
                Err(e) => return Err(FetchError::from_reqwest(&e)),
            }

            if attempt < self.settings.max_attempts {
                tokio::time::sleep(self.settings.backoff(attempt)).await;
            }
        }

        Err(match (self.settings.max_attempts, last_status) {
            (1, None) => FetchError::Timeout,
            (1, Some(status)) => FetchError::Status(status),
            (_, last_status) => FetchError::RetriesExhausted { last_status },
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = parse_http_url(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        if let Some(ext) = file_extension(&parsed) {
            return Ok(FetchedPage {
                descriptor: Descriptor::File(ext.to_ascii_uppercase()),
                links: Vec::new(),
            });
        }

        let delay = self.settings.politeness_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let response = self.get_with_retries(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Ok(FetchedPage {
                descriptor: Descriptor::Skipped(content_type),
                links: Vec::new(),
            });
        }

        // Relative links resolve against where redirects ended up
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let page = parse_html(&body, &final_url);

        Ok(FetchedPage {
            descriptor: Descriptor::Page(page.descriptor),
            links: page.links,
        })
    }
}
