//! Destination key layout
//!
//! Content keys are partitioned as
//! `{root}/year={Y}/month={M:02}/day={D:02}/{artifact}` and state keys live
//! under `{root}/_state/`. Downstream consumers query by partition, so this
//! format is a published contract and must not change.

use chrono::{Datelike, NaiveDate};

/// Returns the partition prefix for a calendar day
pub fn day_prefix(root: &str, date: NaiveDate) -> String {
    format!(
        "{}/year={}/month={:02}/day={:02}",
        root,
        date.year(),
        date.month(),
        date.day()
    )
}

/// Returns the full destination key for an artifact under a day partition
pub fn day_key(root: &str, date: NaiveDate, artifact: &str) -> String {
    format!("{}/{}", day_prefix(root, date), artifact)
}

/// Returns the checkpoint key for a stream
pub fn checkpoint_key(root: &str, stream: &str) -> String {
    format!("{}/_state/{}_last_success_date.txt", root, stream)
}
