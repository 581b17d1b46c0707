//! Tidecrawl main entry point
//!
//! This is the command-line interface for both halves of the crawler:
//! `tidecrawl master` runs the coordinator, `tidecrawl worker` runs a pool
//! of sessions against it.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tidecrawl::config::{
    load_config_with_hash, parse_or_default, validate, Config, DEFAULT_DURATION_MINUTES,
    DEFAULT_THREADS_PER_WORKER,
};
use tidecrawl::coordinator::run_master;
use tidecrawl::worker::run_worker;
use tracing_subscriber::EnvFilter;

/// Tidecrawl: a time-boxed, distributed focused web crawler
///
/// One master owns the URL frontier and hands out work until its deadline;
/// any number of workers fetch pages and report links back.
#[derive(Parser, Debug)]
#[command(name = "tidecrawl")]
#[command(version)]
#[command(about = "A time-boxed, distributed focused web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (all keys have defaults)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the coordinator and write the final report when the crawl ends
    Master(MasterArgs),

    /// Run a pool of worker sessions against a coordinator
    Worker(WorkerArgs),
}

#[derive(Args, Debug)]
struct MasterArgs {
    /// Seed URL; also determines the scope domain unless one is configured
    #[arg(long)]
    start_url: Option<String>,

    /// Crawl duration in minutes (non-numeric input falls back to the default)
    #[arg(long, value_name = "MINUTES")]
    minutes: Option<String>,

    /// Number of worker nodes expected to attach
    #[arg(long)]
    nodes: Option<u32>,

    /// Sessions per worker process (non-numeric input falls back to the default)
    #[arg(long, value_name = "THREADS")]
    threads: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:9090
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Args, Debug)]
struct WorkerArgs {
    /// Coordinator address, e.g. 192.168.1.10:9090
    #[arg(long)]
    coordinator: Option<String>,

    /// Prefix for session ids instead of a random Node-NNNN
    #[arg(long)]
    worker_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    match cli.command {
        Command::Master(args) => {
            apply_master_overrides(&mut config, args);
            validate(&config).context("Invalid master configuration")?;

            let summary = run_master(&config, config_hash)
                .await
                .context("Master failed")?;

            println!(
                "Crawl finished: {} URLs processed ({} HTML, {} files), {} unique URLs seen",
                summary.total_processed,
                summary.html_pages,
                summary.file_count,
                summary.unique_urls
            );
            println!("Report written to {}", config.output.summary_path);
        }
        Command::Worker(args) => {
            if let Some(address) = args.coordinator {
                config.worker.coordinator_address = address;
            }
            validate(&config).context("Invalid worker configuration")?;

            let report = run_worker(&config.worker, args.worker_id)
                .await
                .context("Worker failed")?;

            println!("{}", report.throughput);
        }
    }

    Ok(())
}

/// Folds command-line overrides into the loaded configuration
fn apply_master_overrides(config: &mut Config, args: MasterArgs) {
    if let Some(start_url) = args.start_url {
        config.master.start_url = start_url;
    }
    if let Some(minutes) = args.minutes {
        config.master.duration_minutes =
            parse_or_default(&minutes, DEFAULT_DURATION_MINUTES, "duration");
    }
    if let Some(nodes) = args.nodes {
        config.master.expected_nodes = nodes;
    }
    if let Some(threads) = args.threads {
        config.master.threads_per_worker =
            parse_or_default(&threads, DEFAULT_THREADS_PER_WORKER, "thread count");
    }
    if let Some(bind) = args.bind {
        config.master.bind_address = bind;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidecrawl=info,warn"),
            1 => EnvFilter::new("tidecrawl=debug,info"),
            2 => EnvFilter::new("tidecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
