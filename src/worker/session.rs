//! A single worker session: request, fetch, submit, repeat
//!
//! Loop rules:
//! - `STOP` ends the session; no further calls are made after it
//! - `WAIT` sleeps a fixed interval and polls again
//! - a URL is fetched, counted, and its result submitted
//! - a transport failure while requesting work gets one reconnect attempt
//! - a transport failure while submitting ends the session and the result is lost

use crate::fetcher::PageFetcher;
use crate::protocol::CrawlTask;
use crate::worker::client::{ClientError, CoordinatorClient};
use crate::worker::stats::AggregateStats;
use std::sync::Arc;
use std::time::Duration;

/// Why a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// The coordinator answered STOP
    Stopped,
    /// The connection failed and could not be restored
    Disconnected(ClientError),
}

/// What one session did over its lifetime
#[derive(Debug)]
pub struct SessionReport {
    pub worker_id: String,
    pub successes: u64,
    pub errors: u64,
    pub end: SessionEnd,
}

impl SessionReport {
    /// Report for a session whose first connection never came up
    pub(crate) fn unstarted(worker_id: String, error: ClientError) -> Self {
        Self {
            worker_id,
            successes: 0,
            errors: 0,
            end: SessionEnd::Disconnected(error),
        }
    }
}

/// Timing knobs for a session
#[derive(Debug, Clone, Copy)]
pub struct SessionTiming {
    pub wait_interval: Duration,
    pub reconnect_delay: Duration,
}

/// One execution loop owning its own coordinator connection
pub struct WorkerSession<C> {
    worker_id: String,
    client: C,
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<AggregateStats>,
    timing: SessionTiming,
    successes: u64,
    errors: u64,
}

impl<C: CoordinatorClient> WorkerSession<C> {
    pub fn new(
        worker_id: impl Into<String>,
        client: C,
        fetcher: Arc<dyn PageFetcher>,
        stats: Arc<AggregateStats>,
        timing: SessionTiming,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            client,
            fetcher,
            stats,
            timing,
            successes: 0,
            errors: 0,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Runs the loop to completion
    pub async fn run(mut self) -> SessionReport {
        let _active = self.stats.enter_session();
        tracing::info!(
            "[{}] Session started ({} active)",
            self.worker_id,
            self.stats.active_sessions()
        );

        let end = loop {
            let task = match self.next_task().await {
                Ok(task) => task,
                Err(e) => {
                    tracing::error!("[{}] Lost the coordinator: {}", self.worker_id, e);
                    break SessionEnd::Disconnected(e);
                }
            };

            match task {
                CrawlTask::Stop => {
                    tracing::info!("[{}] Received STOP, exiting", self.worker_id);
                    break SessionEnd::Stopped;
                }
                CrawlTask::Wait => {
                    tracing::debug!("[{}] Frontier empty, waiting", self.worker_id);
                    tokio::time::sleep(self.timing.wait_interval).await;
                }
                CrawlTask::Url(url) => {
                    if let Err(e) = self.process(&url).await {
                        tracing::error!(
                            "[{}] Failed to submit {}, result lost: {}",
                            self.worker_id,
                            url,
                            e
                        );
                        break SessionEnd::Disconnected(e);
                    }
                }
            }
        };

        SessionReport {
            worker_id: self.worker_id,
            successes: self.successes,
            errors: self.errors,
            end,
        }
    }

    /// Asks for work, reconnecting once if the connection has failed
    async fn next_task(&mut self) -> Result<CrawlTask, ClientError> {
        match self.client.request_task(&self.worker_id).await {
            Err(e) if e.is_transport() => {
                tracing::warn!(
                    "[{}] Connection failed ({}), reconnecting in {:?}",
                    self.worker_id,
                    e,
                    self.timing.reconnect_delay
                );
                tokio::time::sleep(self.timing.reconnect_delay).await;
                self.client.reconnect().await?;
                self.client.request_task(&self.worker_id).await
            }
            other => other,
        }
    }

    /// Fetches one URL and submits its result
    ///
    /// Fetch failures are counted and swallowed. Only a transport failure
    /// during submission is returned.
    async fn process(&mut self, url: &str) -> Result<(), ClientError> {
        tracing::info!("[{}] Crawling {}", self.worker_id, url);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => {
                self.successes += 1;
                self.stats.record_success();
                page
            }
            Err(e) => {
                self.errors += 1;
                self.stats.record_error();
                tracing::warn!("[{}] Failed to crawl {}: {}", self.worker_id, url, e);
                return Ok(());
            }
        };

        let descriptor = page.descriptor.to_string();
        if descriptor.is_empty() {
            return Ok(());
        }

        match self
            .client
            .submit_result(&self.worker_id, url, &descriptor, page.links)
            .await
        {
            Ok(()) => Ok(()),
            Err(ClientError::Rejected(message)) => {
                tracing::warn!(
                    "[{}] Coordinator rejected result for {}: {}",
                    self.worker_id,
                    url,
                    message
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
