//! Worker process: a pool of independent sessions
//!
//! The pool asks the coordinator once for its thread count, then runs
//! that many sessions side by side, each over its own connection. When
//! the last session ends it reports throughput and success rate.

use crate::config::{WorkerConfig, MAX_THREADS_PER_WORKER};
use crate::fetcher::PageFetcher;
use crate::output::ThroughputReport;
use crate::worker::client::{CoordinatorClient, RemoteCoordinator};
use crate::worker::session::{SessionReport, SessionTiming, WorkerSession};
use crate::worker::stats::AggregateStats;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Random node prefix like `Node-4821`
pub fn generate_node_prefix() -> String {
    format!("Node-{}", rand::rng().random_range(1000..=9999))
}

/// Session identifier: `<prefix>-T<n>`, `n` counting from 1
pub fn session_id(prefix: &str, index: usize) -> String {
    format!("{}-T{}", prefix, index + 1)
}

/// Outcome of a whole worker process run
#[derive(Debug)]
pub struct PoolReport {
    pub sessions: Vec<SessionReport>,
    pub throughput: ThroughputReport,
}

/// Runs `N` sessions against one coordinator and aggregates their counts
pub struct WorkerPool {
    coordinator_address: String,
    node_prefix: String,
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<AggregateStats>,
    timing: SessionTiming,
}

impl WorkerPool {
    pub fn new(config: &WorkerConfig, node_prefix: String, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            coordinator_address: config.coordinator_address.clone(),
            node_prefix,
            fetcher,
            stats: Arc::new(AggregateStats::new()),
            timing: SessionTiming {
                wait_interval: Duration::from_millis(config.wait_interval_ms),
                reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            },
        }
    }

    pub fn stats(&self) -> &Arc<AggregateStats> {
        &self.stats
    }

    /// Session count from the coordinator; 1 if it cannot be obtained
    pub async fn fetch_thread_count(&self) -> usize {
        let threads = match RemoteCoordinator::connect(&self.coordinator_address).await {
            Ok(mut client) => client.get_config().await,
            Err(e) => Err(e),
        };

        match threads {
            Ok(0) => 1,
            Ok(n) => n.min(MAX_THREADS_PER_WORKER) as usize,
            Err(e) => {
                tracing::warn!(
                    "Could not read config from {}: {}; running 1 session",
                    self.coordinator_address,
                    e
                );
                1
            }
        }
    }

    /// Runs every session to completion
    pub async fn run(&self) -> PoolReport {
        let started = Instant::now();
        let threads = self.fetch_thread_count().await;

        tracing::info!(
            "{} starting {} session(s) against {}",
            self.node_prefix,
            threads,
            self.coordinator_address
        );

        let mut sessions = JoinSet::new();
        for index in 0..threads {
            let worker_id = session_id(&self.node_prefix, index);
            let address = self.coordinator_address.clone();
            let fetcher = self.fetcher.clone();
            let stats = self.stats.clone();
            let timing = self.timing;

            sessions.spawn(async move {
                match RemoteCoordinator::connect(&address).await {
                    Ok(client) => {
                        WorkerSession::new(worker_id, client, fetcher, stats, timing)
                            .run()
                            .await
                    }
                    Err(e) => {
                        tracing::error!("[{}] Cannot reach coordinator: {}", worker_id, e);
                        SessionReport::unstarted(worker_id, e)
                    }
                }
            });
        }

        let mut reports = Vec::with_capacity(threads);
        while let Some(joined) = sessions.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Session task failed: {}", e),
            }
        }

        let throughput = self.stats.report(started.elapsed());
        tracing::info!(
            "{} finished: {} ({} session(s) still active)",
            self.node_prefix,
            throughput,
            self.stats.active_sessions()
        );

        PoolReport {
            sessions: reports,
            throughput,
        }
    }
}
