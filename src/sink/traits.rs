//! Result sink trait and error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while writing crawl records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// One line of the results log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkRecord {
    pub url: String,
    pub descriptor: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, durable log of processed URLs
///
/// The coordinator calls `append` once per accepted submission behind its
/// own sink lock, so implementations need not be `Sync`.
pub trait ResultSink: Send {
    /// Appends one record; implementations persist it before returning
    fn append(&mut self, record: &SinkRecord) -> SinkResult<()>;

    /// Flushes anything still buffered
    fn flush(&mut self) -> SinkResult<()> {
        Ok(())
    }
}
