//! The coordinator: frontier owner and task dispenser
//!
//! Every remote call lands here. All frontier mutation, including the
//! compound "record result + admit links" step, runs under one mutex so
//! the read-check-insert over the seen set cannot interleave.
//!
//! The result sink has its own lock. A submission takes it before
//! releasing the frontier lock, so log order matches completion order
//! while task requests no longer wait on disk writes.

use crate::fetcher::{is_file_descriptor, is_skipped_descriptor};
use crate::frontier::{Frontier, FrontierSnapshot};
use crate::output::CrawlSummary;
use crate::protocol::CrawlTask;
use crate::sink::{ResultSink, SinkRecord};
use crate::config::DEFAULT_DURATION_MINUTES;
use crate::url::parse_http_url;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors a remote call can be answered with
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    #[error("Rejected call: {0}")]
    Rejected(String),

    #[error("Coordinator is closed")]
    Closed,
}

/// Where the coordinator is in its lifecycle at a given instant
///
/// Derived from the wall clock on every call rather than stored, so two
/// callers racing the deadline may briefly disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dispatching tasks and accepting results
    Accepting,
    /// Past the deadline: every task request gets STOP, results still land
    Draining,
    /// Past the grace period: nothing is accepted
    Closed,
}

/// Fixed parameters of one crawl
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub start_url: String,
    pub scope_domain: String,
    pub duration: Duration,
    pub grace_period: Duration,
    pub threads_per_worker: u32,
    pub expected_nodes: u32,
}

/// Shared-state coordinator serving concurrent workers
pub struct Coordinator {
    frontier: Mutex<Frontier>,
    sink: Mutex<Box<dyn ResultSink>>,
    settings: CoordinatorSettings,
    started_at: Instant,
    started_wall: DateTime<Utc>,
    deadline: Instant,
    grace_deadline: Instant,
}

impl Coordinator {
    /// Creates a coordinator whose deadline is `settings.duration` from now
    ///
    /// A duration too large to represent as an instant falls back to the
    /// default crawl length.
    pub fn new(settings: CoordinatorSettings, sink: Box<dyn ResultSink>) -> Self {
        let now = Instant::now();
        let deadline = match now.checked_add(settings.duration) {
            Some(deadline) => deadline,
            None => {
                tracing::warn!(
                    "Crawl duration {:?} is out of range, using {} minutes",
                    settings.duration,
                    DEFAULT_DURATION_MINUTES
                );
                now + Duration::from_secs(DEFAULT_DURATION_MINUTES * 60)
            }
        };
        Self::with_deadline(settings, sink, deadline)
    }

    /// Creates a coordinator with an explicit deadline
    ///
    /// The grace deadline is `deadline + settings.grace_period`, or the
    /// deadline itself if that sum overflows.
    pub fn with_deadline(
        settings: CoordinatorSettings,
        sink: Box<dyn ResultSink>,
        deadline: Instant,
    ) -> Self {
        let frontier = Frontier::new(settings.start_url.clone(), settings.scope_domain.clone());
        let grace_deadline = deadline.checked_add(settings.grace_period).unwrap_or_else(|| {
            tracing::warn!(
                "Grace period {:?} is out of range, closing at the deadline",
                settings.grace_period
            );
            deadline
        });

        tracing::info!(
            "Coordinator initialized: seed {}, scope '{}', crawling for {:.1} minutes",
            settings.start_url,
            settings.scope_domain,
            settings.duration.as_secs_f64() / 60.0
        );

        Self {
            frontier: Mutex::new(frontier),
            sink: Mutex::new(sink),
            settings,
            started_at: Instant::now(),
            started_wall: Utc::now(),
            deadline,
            grace_deadline,
        }
    }

    // Critical sections never leave the frontier half-updated, so a
    // poisoned lock still guards consistent data
    fn frontier(&self) -> MutexGuard<'_, Frontier> {
        self.frontier.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sink(&self) -> MutexGuard<'_, Box<dyn ResultSink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn grace_deadline(&self) -> Instant {
        self.grace_deadline
    }

    pub fn phase_at(&self, now: Instant) -> Phase {
        if now <= self.deadline {
            Phase::Accepting
        } else if now <= self.grace_deadline {
            Phase::Draining
        } else {
            Phase::Closed
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase_at(Instant::now())
    }

    /// Hands the calling worker its next task
    ///
    /// Past the deadline this is always [`CrawlTask::Stop`] without touching
    /// the frontier. An empty frontier yields [`CrawlTask::Wait`].
    pub fn request_task(&self, worker_id: &str) -> Result<CrawlTask, CallError> {
        if worker_id.trim().is_empty() {
            return Err(CallError::Rejected("worker id cannot be empty".to_string()));
        }

        if Instant::now() > self.deadline {
            return Ok(CrawlTask::Stop);
        }

        let next = self.frontier().pop_next();

        match next {
            Some(url) => {
                tracing::info!("Dispatching {} to worker {}", url, worker_id);
                Ok(CrawlTask::Url(url))
            }
            None => {
                tracing::debug!("Frontier empty, telling worker {} to wait", worker_id);
                Ok(CrawlTask::Wait)
            }
        }
    }

    /// Records a worker's result and folds its in-scope links into the frontier
    ///
    /// Accepted while accepting or draining; rejected once closed.
    /// Malformed arguments are rejected before any state is touched. A
    /// failing result sink is logged and does not undo the frontier update.
    ///
    /// Returns how many links were new to the frontier.
    pub fn submit_result(
        &self,
        worker_id: &str,
        source_url: &str,
        descriptor: &str,
        links: &[String],
    ) -> Result<usize, CallError> {
        if self.phase() == Phase::Closed {
            return Err(CallError::Closed);
        }

        if worker_id.trim().is_empty() {
            return Err(CallError::Rejected("worker id cannot be empty".to_string()));
        }

        if let Err(e) = parse_http_url(source_url) {
            return Err(CallError::Rejected(format!(
                "invalid source url '{}': {}",
                source_url, e
            )));
        }

        if descriptor.is_empty() {
            return Err(CallError::Rejected("descriptor cannot be empty".to_string()));
        }

        let record = SinkRecord {
            url: source_url.to_string(),
            descriptor: descriptor.to_string(),
            timestamp: Utc::now(),
        };

        let mut frontier = self.frontier();
        frontier.record_result(source_url, descriptor);
        let admitted = frontier.admit_links(links);

        // Lock order is frontier then sink
        let mut sink = self.sink();
        drop(frontier);

        if let Err(e) = sink.append(&record) {
            tracing::warn!("Failed to log result for {}: {}", source_url, e);
        }
        drop(sink);

        tracing::info!(
            "Worker {} finished {}. Found {} links ({} new)",
            worker_id,
            source_url,
            links.len(),
            admitted
        );

        Ok(admitted)
    }

    /// Sessions each worker process should run
    pub fn threads_per_worker(&self) -> u32 {
        self.settings.threads_per_worker
    }

    pub fn snapshot(&self) -> FrontierSnapshot {
        self.frontier().snapshot()
    }

    pub fn flush_sink(&self) {
        if let Err(e) = self.sink().flush() {
            tracing::warn!("Failed to flush results log: {}", e);
        }
    }

    /// Builds the final report from the current frontier
    pub fn summary(&self, config_hash: Option<String>, shutdown_reason: &str) -> CrawlSummary {
        let snapshot = self.snapshot();

        let file_count = snapshot
            .results
            .iter()
            .filter(|r| is_file_descriptor(&r.descriptor))
            .count() as u64;
        let skipped_count = snapshot
            .results
            .iter()
            .filter(|r| is_skipped_descriptor(&r.descriptor))
            .count() as u64;
        let total_processed = snapshot.results.len() as u64;

        CrawlSummary {
            start_url: self.settings.start_url.clone(),
            scope_domain: self.settings.scope_domain.clone(),
            expected_nodes: self.settings.expected_nodes,
            threads_per_worker: self.settings.threads_per_worker,
            started_at: self.started_wall,
            finished_at: Utc::now(),
            elapsed_minutes: self.started_at.elapsed().as_secs_f64() / 60.0,
            shutdown_reason: shutdown_reason.to_string(),
            config_hash,
            total_processed,
            html_pages: total_processed - file_count,
            file_count,
            skipped_count,
            unique_urls: snapshot.seen.len() as u64,
            dispatched: snapshot.dispatched as u64,
            pending_remaining: snapshot.pending.len() as u64,
            processed: snapshot.results,
        }
    }
}
