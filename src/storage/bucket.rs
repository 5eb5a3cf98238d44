//! S3-compatible bucket backend (R2, MinIO, AWS)

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::ObjectStore;
use crate::config::BucketConfig;
use crate::error::{Error, Result};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct BucketStore {
    bucket: Box<Bucket>,
}

impl BucketStore {
    /// Connect to the bucket described by `config`.
    ///
    /// No request is made here; credentials and endpoint are checked on first use.
    pub fn new(config: &BucketConfig) -> Result<Self> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(config.access_key.as_str()),
            Some(config.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| Error::Config(format!("bucket credentials: {}", e)))?;

        let mut bucket = Bucket::new(&config.name, region, credentials)?;
        if config.path_style {
            bucket.set_path_style();
        }

        Ok(Self { bucket })
    }
}

/// Turn a bucket response status into a result.
///
/// A missing key on delete is success: the object is gone either way.
pub(crate) fn check_status(operation: &'static str, key: &str, status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        404 if operation == "delete" => Ok(()),
        _ => Err(Error::BucketStatus {
            operation,
            key: key.to_owned(),
            status,
        }),
    }
}

#[async_trait]
impl ObjectStore for BucketStore {
    fn name(&self) -> &'static str {
        "bucket"
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()> {
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        let response = self
            .bucket
            .put_object_with_content_type(key, &body, content_type)
            .await?;
        check_status("put", key, response.status_code())?;
        debug!(key, bytes = body.len(), content_type, "stored object in bucket");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self.bucket.delete_object(key).await?;
        check_status("delete", key, response.status_code())?;
        debug!(key, "deleted object from bucket");
        Ok(())
    }
}
