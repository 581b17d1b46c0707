//! Throughput and success-rate arithmetic
//!
//! Shared by the worker pool's shutdown report and the master's final
//! report so both compute rates the same way.

use std::fmt;
use std::time::Duration;

/// Operation counts over an elapsed wall-clock window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputReport {
    pub successes: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

impl ThroughputReport {
    pub fn new(successes: u64, errors: u64, elapsed: Duration) -> Self {
        Self {
            successes,
            errors,
            elapsed,
        }
    }

    pub fn total(&self) -> u64 {
        self.successes + self.errors
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    /// Operations (successes and errors) per minute; 0 for an empty window
    pub fn pages_per_minute(&self) -> f64 {
        let minutes = self.elapsed_minutes();
        if minutes <= 0.0 {
            return 0.0;
        }
        self.total() as f64 / minutes
    }

    /// Successes as a percentage of all operations; 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.successes as f64 / total as f64) * 100.0
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages ({} ok, {} failed) in {:.2} minutes: {:.2} pages/min, {:.1}% success",
            self.total(),
            self.successes,
            self.errors,
            self.elapsed_minutes(),
            self.pages_per_minute(),
            self.success_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let report = ThroughputReport::new(7, 3, Duration::from_secs(120));
        assert_eq!(report.total(), 10);
        assert!((report.pages_per_minute() - 5.0).abs() < f64::EPSILON);
        assert!((report.success_rate() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_operations() {
        let report = ThroughputReport::new(0, 0, Duration::from_secs(60));
        assert_eq!(report.pages_per_minute(), 0.0);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_zero_elapsed() {
        let report = ThroughputReport::new(3, 0, Duration::ZERO);
        assert_eq!(report.pages_per_minute(), 0.0);
        assert_eq!(report.success_rate(), 100.0);
    }

    #[test]
    fn test_display_precision() {
        let report = ThroughputReport::new(7, 3, Duration::from_secs(120));
        let text = report.to_string();
        assert!(text.contains("5.00 pages/min"));
        assert!(text.contains("70.0% success"));
    }
}
