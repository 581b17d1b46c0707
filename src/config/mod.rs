//! Configuration module for Tidecrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A file is optional: every key has a default, and the CLI can override
//! the values operators usually change per run.
//!
//! # Example
//!
//! ```no_run
//! use tidecrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Sessions per worker: {}", config.master.threads_per_worker);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, MasterConfig, OutputConfig, SinkFormat, WorkerConfig, DEFAULT_DURATION_MINUTES,
    DEFAULT_THREADS_PER_WORKER,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_or_default};
pub use validation::{validate, MAX_DURATION_MINUTES, MAX_GRACE_PERIOD_SECS, MAX_THREADS_PER_WORKER};
