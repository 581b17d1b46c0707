//! Deadline watcher that drives the coordinator's lifecycle

use crate::coordinator::state::Coordinator;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Why the crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Deadline and grace period both ran out
    DeadlineElapsed,
    /// The operator interrupted the master
    Interrupted,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineElapsed => write!(f, "deadline elapsed"),
            Self::Interrupted => write!(f, "operator interrupt"),
        }
    }
}

/// Waits out the deadline and grace period, then closes the transport
///
/// `interrupt` ends the wait early from either phase; the transport is
/// closed in both cases so the caller can always go on to write the report.
pub async fn run_shutdown_watcher<F>(
    coordinator: Arc<Coordinator>,
    close: watch::Sender<bool>,
    interrupt: F,
) -> ShutdownReason
where
    F: Future<Output = ()>,
{
    let deadline = tokio::time::Instant::from_std(coordinator.deadline());
    let grace_deadline = tokio::time::Instant::from_std(coordinator.grace_deadline());
    let grace_secs = coordinator.settings().grace_period.as_secs();

    let timeline = async {
        tokio::time::sleep_until(deadline).await;
        tracing::info!(
            "Deadline reached, answering STOP; accepting results for {} more seconds",
            grace_secs
        );
        tokio::time::sleep_until(grace_deadline).await;
        tracing::info!("Grace period over, shutting down");
    };

    let reason = tokio::select! {
        _ = timeline => ShutdownReason::DeadlineElapsed,
        _ = interrupt => {
            tracing::warn!("Interrupted, shutting down early");
            ShutdownReason::Interrupted
        }
    };

    // Receivers may already be gone; nothing left to tell then
    let _ = close.send(true);

    reason
}

/// Resolves on Ctrl-C; never resolves where signals cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorSettings;
    use crate::sink::MemorySink;
    use std::time::{Duration, Instant};

    fn coordinator(deadline_in: Duration, grace: Duration) -> Arc<Coordinator> {
        let settings = CoordinatorSettings {
            start_url: "https://example.com/".to_string(),
            scope_domain: "example.com".to_string(),
            duration: deadline_in,
            grace_period: grace,
            threads_per_worker: 1,
            expected_nodes: 1,
        };
        Arc::new(Coordinator::with_deadline(
            settings,
            Box::new(MemorySink::new()),
            Instant::now() + deadline_in,
        ))
    }

    #[tokio::test]
    async fn test_closes_after_deadline_and_grace() {
        let coordinator = coordinator(Duration::from_millis(50), Duration::from_millis(50));
        let (tx, rx) = watch::channel(false);
        let started = Instant::now();

        let reason =
            run_shutdown_watcher(coordinator, tx, std::future::pending::<()>()).await;

        assert_eq!(reason, ShutdownReason::DeadlineElapsed);
        assert!(*rx.borrow());
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_interrupt_closes_early() {
        let coordinator = coordinator(Duration::from_secs(3600), Duration::from_secs(15));
        let (tx, rx) = watch::channel(false);

        let reason = run_shutdown_watcher(coordinator, tx, async {}).await;

        assert_eq!(reason, ShutdownReason::Interrupted);
        assert!(*rx.borrow());
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(ShutdownReason::DeadlineElapsed.to_string(), "deadline elapsed");
        assert_eq!(ShutdownReason::Interrupted.to_string(), "operator interrupt");
    }
}
