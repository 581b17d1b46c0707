use serde::Deserialize;

/// Default crawl duration when none (or garbage) is supplied
pub const DEFAULT_DURATION_MINUTES: u64 = 5;

/// Default number of sessions each worker process runs
pub const DEFAULT_THREADS_PER_WORKER: u32 = 1;

/// Main configuration structure for Tidecrawl
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub master: MasterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Coordinator-side crawl settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MasterConfig {
    /// The seed URL the frontier starts from
    pub start_url: String,

    /// Domain substring a link's host must contain to be admitted.
    /// Derived from the start URL when absent.
    pub scope_domain: Option<String>,

    /// Crawl time budget in minutes
    pub duration_minutes: u64,

    /// How long submissions are still accepted after the deadline (seconds)
    pub grace_period_secs: u64,

    /// Number of sessions each worker process should run
    pub threads_per_worker: u32,

    /// Number of worker nodes the operator expects to attach (report only)
    pub expected_nodes: u32,

    /// Address the coordinator listens on
    pub bind_address: String,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.dlsu.edu.ph".to_string(),
            scope_domain: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            grace_period_secs: 15,
            threads_per_worker: DEFAULT_THREADS_PER_WORKER,
            expected_nodes: 1,
            bind_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Result sink format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    Csv,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Append-only log of processed URLs
    pub results_path: String,

    /// Path to the markdown summary file
    pub summary_path: String,

    /// Storage format for the results log
    pub format: SinkFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: "crawl_results.csv".to_string(),
            summary_path: "crawl_summary.md".to_string(),
            format: SinkFormat::Csv,
        }
    }
}

/// Worker-side fetch and session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorkerConfig {
    /// Address of the coordinator to connect to
    pub coordinator_address: String,

    /// User agent sent with every page request
    pub user_agent: String,

    /// Lower bound of the randomized delay before each fetch (milliseconds)
    pub politeness_min_ms: u64,

    /// Upper bound of the randomized delay before each fetch (milliseconds)
    pub politeness_max_ms: u64,

    /// Total HTTP attempts per URL, including the first
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles for each later one (milliseconds)
    pub backoff_base_ms: u64,

    pub connect_timeout_secs: u64,

    pub request_timeout_secs: u64,

    /// Pause after a WAIT response (milliseconds)
    pub wait_interval_ms: u64,

    /// Pause before the single reconnect attempt (milliseconds)
    pub reconnect_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_address: "127.0.0.1:9090".to_string(),
            user_agent: "tidecrawl/0.1 (Educational crawler)".to_string(),
            politeness_min_ms: 1000,
            politeness_max_ms: 2000,
            max_attempts: 3,
            backoff_base_ms: 1000,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            wait_interval_ms: 1000,
            reconnect_delay_ms: 2000,
        }
    }
}
