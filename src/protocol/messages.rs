//! Remote call messages exchanged between workers and the coordinator

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a worker should do next
///
/// Control values are distinct variants, so no URL can ever be mistaken
/// for a control signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum CrawlTask {
    /// Fetch this URL
    Url(String),
    /// Frontier momentarily empty; pause and ask again
    Wait,
    /// Crawl finished; the worker must terminate
    Stop,
}

impl fmt::Display for CrawlTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::Wait => write!(f, "WAIT"),
            Self::Stop => write!(f, "STOP"),
        }
    }
}

/// Calls a worker can make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    RequestTask {
        worker_id: String,
    },
    SubmitResult {
        worker_id: String,
        source_url: String,
        descriptor: String,
        links: Vec<String>,
    },
    GetConfig,
}

impl Request {
    /// Short name used in logs
    pub fn method(&self) -> &'static str {
        match self {
            Self::RequestTask { .. } => "request_task",
            Self::SubmitResult { .. } => "submit_result",
            Self::GetConfig => "get_config",
        }
    }
}

/// Coordinator replies, one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Task { task: CrawlTask },
    Ack,
    Config { threads: u32 },
    Error { message: String },
}
