use crate::config::types::{Config, MasterConfig, OutputConfig, WorkerConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on sessions per worker process
pub const MAX_THREADS_PER_WORKER: u32 = 64;

/// Longest crawl the master will schedule (one week)
pub const MAX_DURATION_MINUTES: u64 = 7 * 24 * 60;

/// Longest drain window after the deadline (one hour)
pub const MAX_GRACE_PERIOD_SECS: u64 = 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_master_config(&config.master)?;
    validate_output_config(&config.output)?;
    validate_worker_config(&config.worker)?;
    Ok(())
}

/// Validates coordinator configuration
fn validate_master_config(config: &MasterConfig) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url must be http or https, got {}",
            start.scheme()
        )));
    }

    if start.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            "start-url has no host".to_string(),
        ));
    }

    if let Some(scope) = &config.scope_domain {
        if scope.trim().is_empty() {
            return Err(ConfigError::Validation(
                "scope-domain cannot be empty".to_string(),
            ));
        }
    }

    if config.duration_minutes == 0 || config.duration_minutes > MAX_DURATION_MINUTES {
        return Err(ConfigError::Validation(format!(
            "duration-minutes must be between 1 and {}, got {}",
            MAX_DURATION_MINUTES, config.duration_minutes
        )));
    }

    if config.grace_period_secs > MAX_GRACE_PERIOD_SECS {
        return Err(ConfigError::Validation(format!(
            "grace-period-secs must be at most {}, got {}",
            MAX_GRACE_PERIOD_SECS, config.grace_period_secs
        )));
    }

    if config.threads_per_worker < 1 || config.threads_per_worker > MAX_THREADS_PER_WORKER {
        return Err(ConfigError::Validation(format!(
            "threads-per-worker must be between 1 and {}, got {}",
            MAX_THREADS_PER_WORKER, config.threads_per_worker
        )));
    }

    if config.expected_nodes < 1 {
        return Err(ConfigError::Validation(
            "expected-nodes must be at least 1".to_string(),
        ));
    }

    if config.bind_address.is_empty() {
        return Err(ConfigError::Validation(
            "bind-address cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates worker configuration
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.coordinator_address.is_empty() {
        return Err(ConfigError::Validation(
            "coordinator-address cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.politeness_min_ms > config.politeness_max_ms {
        return Err(ConfigError::Validation(format!(
            "politeness-min-ms ({}) exceeds politeness-max-ms ({})",
            config.politeness_min_ms, config.politeness_max_ms
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max-attempts must be at least 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 || config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}
