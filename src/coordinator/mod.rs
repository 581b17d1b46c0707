//! Master-side coordination
//!
//! This module contains:
//! - [`Coordinator`]: the shared frontier behind requestTask / submitResult / getConfig
//! - the lifecycle [`Phase`] derived from the deadline and grace period
//! - [`CoordinatorServer`]: the TCP transport workers connect to
//! - the shutdown watcher and [`run_master`], which ties them together

mod server;
mod shutdown;
mod state;

pub use server::{dispatch, CoordinatorServer};
pub use shutdown::{ctrl_c, run_shutdown_watcher, ShutdownReason};
pub use state::{CallError, Coordinator, CoordinatorSettings, Phase};

use crate::config::Config;
use crate::output::{write_report, CrawlSummary};
use crate::sink::open_sink;
use crate::url::derive_scope_domain;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

impl CoordinatorSettings {
    /// Resolves the `[master]` section, deriving the scope domain if unset
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let master = &config.master;

        let scope_domain = match &master.scope_domain {
            Some(scope) => scope.trim().to_lowercase(),
            None => derive_scope_domain(&master.start_url)?,
        };

        Ok(Self {
            start_url: master.start_url.clone(),
            scope_domain,
            duration: Duration::from_secs(master.duration_minutes.saturating_mul(60)),
            grace_period: Duration::from_secs(master.grace_period_secs),
            threads_per_worker: master.threads_per_worker,
            expected_nodes: master.expected_nodes,
        })
    }
}

/// Runs a complete crawl as the master and writes the final report
///
/// The report is produced whether the crawl ran out its deadline or was
/// interrupted with Ctrl-C.
pub async fn run_master(
    config: &Config,
    config_hash: Option<String>,
) -> crate::Result<CrawlSummary> {
    run_master_until(config, config_hash, ctrl_c()).await
}

/// [`run_master`] with a caller-supplied interrupt future
pub async fn run_master_until<F>(
    config: &Config,
    config_hash: Option<String>,
    interrupt: F,
) -> crate::Result<CrawlSummary>
where
    F: Future<Output = ()>,
{
    let settings = CoordinatorSettings::from_config(config)?;
    let sink = open_sink(&config.output)?;
    let coordinator = Arc::new(Coordinator::new(settings, sink));

    let server = CoordinatorServer::bind(&config.master.bind_address, coordinator.clone()).await?;
    tracing::info!(
        "Coordinator listening on {}, expecting {} node(s) with {} thread(s) each",
        server.local_addr()?,
        config.master.expected_nodes,
        config.master.threads_per_worker
    );

    let (close_tx, close_rx) = watch::channel(false);
    let server_task = tokio::spawn(server.serve(close_rx));

    let reason = run_shutdown_watcher(coordinator.clone(), close_tx, interrupt).await;

    if let Err(e) = server_task.await {
        tracing::warn!("Transport task ended abnormally: {}", e);
    }

    coordinator.flush_sink();

    let summary = coordinator.summary(config_hash, &reason.to_string());
    write_report(&summary, Path::new(&config.output.summary_path))?;

    tracing::info!(
        "Crawl finished ({}): {} URLs processed, {} unique seen; report written to {}",
        reason,
        summary.total_processed,
        summary.unique_urls,
        config.output.summary_path
    );

    Ok(summary)
}
