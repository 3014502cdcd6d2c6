use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for Backfile
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub streams: StreamsConfig,
}

/// Remote site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the archive site (no trailing slash)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Earliest date the archive is known to cover
    #[serde(rename = "earliest-date")]
    pub earliest_date: NaiveDate,

    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum time between any two requests (milliseconds)
    #[serde(rename = "min-request-interval-ms", default = "default_interval_ms")]
    pub min_request_interval_ms: u64,
}

/// Object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bucket name
    pub bucket: String,

    /// Region (e.g. "us-east-1")
    pub region: String,

    /// Custom endpoint for S3-compatible stores; None for AWS
    pub endpoint: Option<String>,

    /// Prefix under which all content and state keys live
    #[serde(rename = "root-prefix")]
    pub root_prefix: String,

    /// Access key; falls back to AWS_ACCESS_KEY_ID when absent
    #[serde(rename = "access-key")]
    pub access_key: Option<String>,

    /// Secret key; falls back to AWS_SECRET_ACCESS_KEY when absent
    #[serde(rename = "secret-key")]
    pub secret_key: Option<String>,
}

/// Per-run scheduling and budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Mode used when no explicit date range is given on the command line
    #[serde(default)]
    pub mode: ScheduleMode,

    /// Whether to read the persisted checkpoint at run start
    #[serde(rename = "use-checkpoint", default = "default_true")]
    pub use_checkpoint: bool,

    /// Maximum number of dates processed in a single run
    #[serde(rename = "max-days-per-run")]
    pub max_days_per_run: u32,

    /// Wall-clock ceiling for a single run (minutes)
    #[serde(rename = "max-runtime-minutes")]
    pub max_runtime_minutes: u64,

    /// Whether the checkpoint advances past a date where some items failed
    /// but at least one succeeded
    #[serde(rename = "advance-on-partial-failure", default = "default_true")]
    pub advance_on_partial_failure: bool,
}

/// Mode selector for scheduled (non-explicit) invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// Harvest the month prior to the invocation date
    Monthly,
    /// Resume from the per-stream checkpoint
    #[default]
    Checkpoint,
}

/// Stream toggles and directions
#[derive(Debug, Clone, Deserialize)]
pub struct StreamsConfig {
    #[serde(default = "default_articles")]
    pub articles: StreamConfig,
    #[serde(default = "default_issues")]
    pub issues: StreamConfig,
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            articles: default_articles(),
            issues: default_issues(),
        }
    }
}

/// Configuration for one checkpointed stream
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Direction of travel in checkpoint mode
    pub direction: Direction,
}

/// Direction of date iteration relative to the checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Catch up toward the present
    Forward,
    /// Backfill history
    Backward,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_articles() -> StreamConfig {
    StreamConfig {
        enabled: true,
        direction: Direction::Forward,
    }
}

fn default_issues() -> StreamConfig {
    StreamConfig {
        enabled: true,
        direction: Direction::Backward,
    }
}
