//! Checkpoint persistence
//!
//! A checkpoint is a single calendar date stored as plain text (`YYYY-MM-DD`)
//! under a well-known per-stream key. It is read once at run start and
//! rewritten after every fully-completed date.

use crate::store::traits::{BlobStore, StoreResult};
use chrono::NaiveDate;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads and writes one stream's checkpoint date
pub struct CheckpointStore {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl CheckpointStore {
    pub fn new(store: Arc<dyn BlobStore>, key: String) -> Self {
        Self { store, key }
    }

    /// The key this checkpoint persists under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the checkpoint date.
    ///
    /// A missing object means a first-ever run. Unparsable content is logged
    /// and treated the same way — a corrupt state file must not wedge the
    /// scheduled job permanently.
    pub async fn load(&self) -> StoreResult<Option<NaiveDate>> {
        let Some(bytes) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        let text = String::from_utf8_lossy(&bytes);
        match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    content = %text.trim(),
                    error = %e,
                    "Unparsable checkpoint, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Persists the checkpoint date, overwriting the previous value
    pub async fn save(&self, date: NaiveDate) -> StoreResult<()> {
        let body = date.format(DATE_FORMAT).to_string();
        self.store
            .put(&self.key, body.as_bytes(), "text/plain")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn checkpoint(store: Arc<MemoryStore>) -> CheckpointStore {
        CheckpointStore::new(store, "aljarida/_state/pdf_last_success_date.txt".to_string())
    }

    #[tokio::test]
    async fn test_absent_checkpoint_loads_none() {
        let store = Arc::new(MemoryStore::new());
        assert_eq!(checkpoint(store).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let store = Arc::new(MemoryStore::new());
        let cp = checkpoint(store.clone());

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        cp.save(date).await.unwrap();

        assert_eq!(cp.load().await.unwrap(), Some(date));
        assert_eq!(
            store
                .object("aljarida/_state/pdf_last_success_date.txt")
                .unwrap(),
            b"2026-01-15"
        );
    }

    #[tokio::test]
    async fn test_garbage_content_loads_none() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "aljarida/_state/pdf_last_success_date.txt",
            b"not a date".to_vec(),
        );
        assert_eq!(checkpoint(store).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_tolerates_surrounding_whitespace_on_load() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "aljarida/_state/pdf_last_success_date.txt",
            b"2026-01-15\n".to_vec(),
        );
        assert_eq!(
            checkpoint(store).load().await.unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
    }
}
