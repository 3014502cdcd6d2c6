//! S3-compatible blob store
//!
//! Thin adapter from the [`BlobStore`] trait onto rust-s3. Works against
//! AWS S3 or any S3-compatible endpoint (MinIO, R2) via the `endpoint`
//! config field.

use crate::config::StorageConfig;
use crate::store::traits::{BlobStore, StoreError, StoreResult};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

/// [`BlobStore`] implementation backed by an S3 bucket
pub struct S3Store {
    bucket: Box<Bucket>,
    name: String,
}

impl S3Store {
    /// Connects to the configured bucket and verifies it is reachable.
    ///
    /// The reachability probe runs at startup on purpose: a run that cannot
    /// persist progress must fail before any crawling happens, not after.
    pub async fn connect(config: &StorageConfig) -> StoreResult<Self> {
        let region = if let Some(endpoint) = &config.endpoint {
            Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            }
        } else {
            config
                .region
                .parse::<Region>()
                .map_err(|e| StoreError::Backend(format!("invalid region: {}", e)))?
        };

        let credentials = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key, &config.secret_key)
        {
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)?
        } else {
            // AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY from the environment
            Credentials::default()?
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)?;
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        if !bucket.exists().await? {
            return Err(StoreError::Unreachable(config.bucket.clone()));
        }

        tracing::info!(bucket = %config.bucket, "Connected to object store");

        Ok(Self {
            bucket,
            name: config.bucket.clone(),
        })
    }

    /// Bucket name, for diagnostics
    pub fn bucket_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self.bucket.head_object(key).await {
            Ok((_, code)) => Ok(code == 200),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.bucket.get_object(key).await {
            Ok(response) => match response.status_code() {
                200..=299 => Ok(Some(response.bytes().to_vec())),
                404 => Ok(None),
                code => Err(StoreError::Backend(format!(
                    "HTTP {} reading s3://{}/{}",
                    code, self.name, key
                ))),
            },
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StoreResult<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .await?;

        match response.status_code() {
            200..=299 => Ok(()),
            code => Err(StoreError::Backend(format!(
                "HTTP {} writing s3://{}/{}",
                code, self.name, key
            ))),
        }
    }
}
