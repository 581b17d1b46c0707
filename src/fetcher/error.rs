use thiserror::Error;

/// Why a fetch produced no result
///
/// Every variant is a recoverable, per-URL outcome: the worker counts it
/// as an error and moves on to its next task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Gave up after retries (last status: {last_status:?})")]
    RetriesExhausted { last_status: Option<u16> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read or parse body: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Maps a transport-level reqwest error onto the fetch taxonomy
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Network(format!("Connection failed: {}", e))
        } else if e.is_body() || e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
