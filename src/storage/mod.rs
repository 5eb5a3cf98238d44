//! Object storage backends
//!
//! The gateway only ever writes or removes one object per request, so a
//! backend needs exactly two operations. Which backend is used is decided by
//! configuration at startup.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub mod bucket;
pub mod filesystem;
pub mod memory;

pub use bucket::BucketStore;
pub use filesystem::FilesystemStore;
pub use memory::{MemoryStore, StoredObject};

/// A path-addressable store of opaque objects
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Create or overwrite the object at `key`
    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()>;

    /// Remove the object at `key`
    async fn delete(&self, key: &str) -> Result<()>;
}
