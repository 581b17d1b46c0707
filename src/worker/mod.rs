//! Worker-side crawling
//!
//! This module contains:
//! - [`RemoteCoordinator`]: one TCP connection per session
//! - [`WorkerSession`]: the request / fetch / submit loop
//! - [`AggregateStats`]: counters shared by a process's sessions
//! - [`WorkerPool`] and [`run_worker`]: sizing, spawning and reporting

mod client;
mod pool;
mod session;
mod stats;

pub use client::{ClientError, CoordinatorClient, RemoteCoordinator};
pub use pool::{generate_node_prefix, session_id, PoolReport, WorkerPool};
pub use session::{SessionEnd, SessionReport, SessionTiming, WorkerSession};
pub use stats::{ActiveSession, AggregateStats};

use crate::config::WorkerConfig;
use crate::fetcher::HttpPageFetcher;
use std::sync::Arc;

/// Runs a worker process until every session has stopped
///
/// # Arguments
///
/// * `config` - The `[worker]` section
/// * `node_prefix` - Session id prefix; a random `Node-NNNN` when `None`
pub async fn run_worker(
    config: &WorkerConfig,
    node_prefix: Option<String>,
) -> crate::Result<PoolReport> {
    let fetcher = Arc::new(HttpPageFetcher::new(config)?);
    let node_prefix = node_prefix.unwrap_or_else(generate_node_prefix);

    tracing::info!(
        "{} connecting to coordinator at {}",
        node_prefix,
        config.coordinator_address
    );

    let pool = WorkerPool::new(config, node_prefix, fetcher);
    Ok(pool.run().await)
}
