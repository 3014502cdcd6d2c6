//! Blob store trait and error types
//!
//! The harvester only ever needs three primitives from its destination:
//! existence checks (the idempotent upload gate), reads (checkpoint), and
//! writes. Everything S3-specific stays behind this seam.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during object store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("S3 error: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Credentials error: {0}")]
    Credentials(#[from] s3::creds::error::CredentialsError),

    #[error("Bucket '{0}' is unreachable")]
    Unreachable(String),

    #[error("Object store error: {0}")]
    Backend(String),
}

/// Result type for object store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal object store surface consumed by the harvest engine
///
/// Used both for content objects and for the per-stream checkpoint key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns whether an object exists at `key`
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Reads the object at `key`; `None` when it does not exist
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes an object at `key`, overwriting any existing value
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StoreResult<()>;
}
