//! Backfile main entry point
//!
//! Command-line interface for the archive harvester. A run processes one or
//! both streams (articles, PDF issues) to a terminal state and exits zero on
//! both `Completed` and `BudgetExceeded` — a budget stop is a planned
//! stopping point for the scheduled job, not a failure.

use backfile::config::{load_config_with_hash, Config};
use backfile::harvest::{resolve_mode, run_articles, run_issues, RunSummary};
use backfile::store::S3Store;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Backfile: incremental harvester for dated newspaper archives
#[derive(Parser, Debug)]
#[command(name = "backfile")]
#[command(version = "1.0.0")]
#[command(about = "Incremental harvester for dated newspaper archives", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Which stream(s) to run
    #[arg(long, value_enum, default_value = "all")]
    stream: StreamArg,

    /// Explicit range start (YYYY-MM-DD); overrides the configured mode
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Explicit range end (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested, without touching
    /// the network or the object store
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StreamArg {
    All,
    Articles,
    Issues,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let explicit = cli.start.zip(cli.end);

    if cli.dry_run {
        handle_dry_run(&config, explicit);
        return Ok(());
    }

    // Connecting up front doubles as the startup probe: a run that cannot
    // reach its destination must fail before any crawling happens.
    let store = match S3Store::connect(&config.storage).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Object store is unreachable: {}", e);
            return Err(e.into());
        }
    };

    let run_articles_stream = matches!(cli.stream, StreamArg::All | StreamArg::Articles)
        && config.streams.articles.enabled;
    let run_issues_stream =
        matches!(cli.stream, StreamArg::All | StreamArg::Issues) && config.streams.issues.enabled;

    if !run_articles_stream && !run_issues_stream {
        tracing::warn!("No stream selected or enabled, nothing to do");
        return Ok(());
    }

    if run_articles_stream {
        let summary = run_articles(&config, store.clone(), explicit).await?;
        print_summary("articles", &summary);
    }

    if run_issues_stream {
        let summary = run_issues(&config, store.clone(), explicit).await?;
        print_summary("pdf", &summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("backfile=info,warn"),
            1 => EnvFilter::new("backfile=debug,info"),
            2 => EnvFilter::new("backfile=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, explicit: Option<(NaiveDate, NaiveDate)>) {
    let today = chrono::Utc::now().date_naive();

    println!("=== Backfile Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Earliest date: {}", config.site.earliest_date);
    println!(
        "  Request interval: {}ms",
        config.site.min_request_interval_ms
    );

    println!("\nDestination:");
    println!("  Bucket: {}", config.storage.bucket);
    println!("  Region: {}", config.storage.region);
    if let Some(endpoint) = &config.storage.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  Root prefix: {}", config.storage.root_prefix);

    println!("\nBudgets:");
    println!("  Max days per run: {}", config.run.max_days_per_run);
    println!("  Max runtime: {} minutes", config.run.max_runtime_minutes);
    println!("  Use checkpoint: {}", config.run.use_checkpoint);
    println!(
        "  Advance on partial failure: {}",
        config.run.advance_on_partial_failure
    );

    println!("\nStreams:");
    for (name, stream) in [
        ("articles", &config.streams.articles),
        ("pdf", &config.streams.issues),
    ] {
        if !stream.enabled {
            println!("  - {} (disabled)", name);
            continue;
        }
        let mode = resolve_mode(config, stream, explicit, today);
        println!("  - {} -> {:?}", name, mode);
    }

    println!("\n✓ Configuration is valid");
    println!("  (checkpoints are read from the object store at run time)");
}

/// Prints the end-of-run summary for one stream
fn print_summary(name: &str, summary: &RunSummary) {
    println!("=== {} run: {:?} ===", name, summary.state);
    println!("  Days processed: {}", summary.stats.days_processed);
    println!("  Uploaded: {}", summary.stats.uploaded);
    println!("  Skipped (existing): {}", summary.stats.skipped_existing);
    println!(
        "  Skipped (no content): {}",
        summary.stats.skipped_no_content
    );
    println!("  Failed: {}", summary.stats.failed);
    if let Some(checkpoint) = summary.checkpoint {
        println!("  Checkpoint: {}", checkpoint);
    }
    println!(
        "  Runtime: {:.2} minutes",
        summary.elapsed.as_secs_f64() / 60.0
    );
}
