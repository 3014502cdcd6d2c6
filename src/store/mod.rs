//! Storage module: the blob store seam, key layout, and checkpointing
//!
//! # Components
//!
//! - `BlobStore`: the three storage primitives the engine consumes
//! - `S3Store` / `MemoryStore`: the production and test implementations
//! - `CheckpointStore`: one stream's persisted progress date
//! - key helpers: the published date-partitioned layout

mod checkpoint;
mod keys;
mod memory;
mod s3;
mod traits;

pub use checkpoint::CheckpointStore;
pub use keys::{checkpoint_key, day_key, day_prefix};
pub use memory::MemoryStore;
pub use s3::S3Store;
pub use traits::{BlobStore, StoreError, StoreResult};
