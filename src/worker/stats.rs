//! Counters shared by every session of one worker process

use crate::output::ThroughputReport;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    successes: u64,
    errors: u64,
    active_sessions: u64,
}

/// Success, error and live-session counts across one worker process
///
/// One instance is created per pool and handed to each session; the lock
/// is only ever held for a counter bump, never across an await.
#[derive(Debug, Default)]
pub struct AggregateStats {
    counters: Mutex<Counters>,
}

/// Marks one session as active until dropped
#[derive(Debug)]
pub struct ActiveSession {
    stats: Arc<AggregateStats>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        let mut counters = self.stats.lock();
        counters.active_sessions = counters.active_sessions.saturating_sub(1);
    }
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_success(&self) {
        self.lock().successes += 1;
    }

    pub fn record_error(&self) {
        self.lock().errors += 1;
    }

    /// Counts a session as active for as long as the guard lives
    pub fn enter_session(self: &Arc<Self>) -> ActiveSession {
        self.lock().active_sessions += 1;
        ActiveSession {
            stats: self.clone(),
        }
    }

    /// `(successes, errors)` at this instant
    pub fn counts(&self) -> (u64, u64) {
        let counters = *self.lock();
        (counters.successes, counters.errors)
    }

    /// Sessions currently inside their run loop
    pub fn active_sessions(&self) -> u64 {
        self.lock().active_sessions
    }

    pub fn report(&self, elapsed: Duration) -> ThroughputReport {
        let (successes, errors) = self.counts();
        ThroughputReport::new(successes, errors, elapsed)
    }
}
