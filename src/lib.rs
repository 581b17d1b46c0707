//! Tidecrawl: a time-boxed, distributed focused web crawler
//!
//! One master process owns the URL frontier and hands out work over a
//! line-delimited JSON protocol; any number of worker processes run
//! independent sessions that fetch pages and report discovered links back.

pub mod config;
pub mod coordinator;
pub mod fetcher;
pub mod frontier;
pub mod output;
pub mod protocol;
pub mod sink;
pub mod url;
pub mod worker;

use thiserror::Error;

/// Main error type for Tidecrawl operations
#[derive(Debug, Error)]
pub enum TideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Result sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Coordinator connection error: {0}")]
    Client(#[from] worker::ClientError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Remote call rejected: {0}")]
    Call(#[from] coordinator::CallError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Tidecrawl operations
pub type Result<T> = std::result::Result<T, TideError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Coordinator, Phase};
pub use fetcher::{Descriptor, FetchError, HttpPageFetcher, PageFetcher};
pub use frontier::Frontier;
pub use protocol::CrawlTask;
pub use worker::{AggregateStats, WorkerPool, WorkerSession};
