//! Backfile: an incremental harvester for dated newspaper archives
//!
//! This crate implements a crawl-and-checkpoint engine that walks a remote
//! newspaper archive one calendar day at a time, uploads what it finds into a
//! date-partitioned object store, and persists a per-stream checkpoint so
//! interrupted runs resume where they left off.

pub mod config;
pub mod fetch;
pub mod harvest;
pub mod output;
pub mod parse;
pub mod plan;
pub mod store;

use thiserror::Error;

/// Main error type for Backfile operations
#[derive(Debug, Error)]
pub enum BackfileError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Checkpoint persistence failed at {key}: {source}")]
    Checkpoint {
        key: String,
        source: store::StoreError,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Backfile operations
pub type Result<T> = std::result::Result<T, BackfileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{DayOutcome, RunController, RunState, RunStats};
pub use plan::{plan_dates, RunMode};
pub use store::{BlobStore, CheckpointStore};
