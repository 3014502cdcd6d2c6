//! Harvest module: the crawl-and-checkpoint engine
//!
//! This module contains the core harvesting logic, including:
//! - Month index caching for the PDF stream
//! - Per-date processing for both streams
//! - The run controller enforcing budgets and persisting checkpoints
//! - Wiring that assembles a stream's processor from the configuration

mod controller;
mod day;
mod month_index;

pub use controller::{RunBudget, RunController, RunState, RunStats, RunSummary};
pub use day::{ArticleDayProcessor, DayOutcome, DayProcessor, DayReport, IssueDayProcessor};
pub use month_index::MonthIndexCache;

use crate::config::{Config, Direction, ScheduleMode, StreamConfig};
use crate::fetch::{build_http_client, Fetcher};
use crate::output::JsonRowSink;
use crate::parse::{ArchiveParser, IssueIndexParser};
use crate::plan::{plan_dates, previous_month, RunMode};
use crate::store::{checkpoint_key, BlobStore, CheckpointStore};
use crate::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Selects the run mode for one stream.
///
/// An explicit date range wins over everything; otherwise the configured
/// schedule mode applies, with the stream's own direction in checkpoint
/// mode.
pub fn resolve_mode(
    config: &Config,
    stream: &StreamConfig,
    explicit: Option<(NaiveDate, NaiveDate)>,
    today: NaiveDate,
) -> RunMode {
    if let Some((start, end)) = explicit {
        return RunMode::ExplicitRange { start, end };
    }

    match config.run.mode {
        ScheduleMode::Monthly => {
            let (year, month) = previous_month(today);
            RunMode::Monthly { year, month }
        }
        ScheduleMode::Checkpoint => match stream.direction {
            Direction::Forward => RunMode::CheckpointForward,
            Direction::Backward => RunMode::CheckpointBackward,
        },
    }
}

/// Runs the article stream to a terminal state
pub async fn run_articles(
    config: &Config,
    store: Arc<dyn BlobStore>,
    explicit: Option<(NaiveDate, NaiveDate)>,
) -> Result<RunSummary> {
    let base_url = Url::parse(&config.site.base_url)?;
    let fetcher = new_fetcher(config)?;
    let parser = ArchiveParser::new(base_url.clone());
    let processor = ArticleDayProcessor::new(
        base_url,
        fetcher,
        parser,
        JsonRowSink,
        store.clone(),
        config.storage.root_prefix.clone(),
    );

    run_stream(config, store, processor, &config.streams.articles, explicit).await
}

/// Runs the PDF issue stream to a terminal state
pub async fn run_issues(
    config: &Config,
    store: Arc<dyn BlobStore>,
    explicit: Option<(NaiveDate, NaiveDate)>,
) -> Result<RunSummary> {
    let base_url = Url::parse(&config.site.base_url)?;
    let fetcher = new_fetcher(config)?;
    let index = MonthIndexCache::new(base_url.clone(), IssueIndexParser::new(base_url));
    let processor = IssueDayProcessor::new(
        fetcher,
        index,
        store.clone(),
        config.storage.root_prefix.clone(),
    );

    run_stream(config, store, processor, &config.streams.issues, explicit).await
}

fn new_fetcher(config: &Config) -> Result<Fetcher> {
    let client = build_http_client(&config.site.user_agent)?;
    Ok(Fetcher::new(
        client,
        Duration::from_millis(config.site.min_request_interval_ms),
    ))
}

/// Shared per-stream run wiring: load checkpoint, plan, drive the controller
async fn run_stream<D: DayProcessor>(
    config: &Config,
    store: Arc<dyn BlobStore>,
    processor: D,
    stream: &StreamConfig,
    explicit: Option<(NaiveDate, NaiveDate)>,
) -> Result<RunSummary> {
    let today = Utc::now().date_naive();

    let checkpoint_store = CheckpointStore::new(
        store,
        checkpoint_key(&config.storage.root_prefix, processor.stream_name()),
    );

    let checkpoint = if config.run.use_checkpoint {
        checkpoint_store.load().await?
    } else {
        None
    };

    let mode = resolve_mode(config, stream, explicit, today);
    tracing::info!(
        stream = processor.stream_name(),
        ?mode,
        ?checkpoint,
        "Planning run"
    );

    let plan = plan_dates(mode, checkpoint, today, config.site.earliest_date);

    let budget = RunBudget::new(
        config.run.max_days_per_run,
        Duration::from_secs(config.run.max_runtime_minutes * 60),
    );

    let mut controller = RunController::new(
        processor,
        checkpoint_store,
        budget,
        config.run.advance_on_partial_failure,
        checkpoint,
    );

    controller.run(plan).await
}
