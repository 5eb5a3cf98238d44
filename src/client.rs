//! Client for the upload gateway
//!
//! Used by applications (and `cdngatectl`) to push files to the gateway or
//! to the local emulator, which accept the same requests.

use std::time::Duration;

use tracing::trace;

use crate::error::Result;

/// Writes and removes objects through a gateway
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl UploadClient {
    /// `endpoint` is the gateway base URL, e.g. `http://localhost:8001`
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, location: &str) -> String {
        format!("{}/{}", self.endpoint, location.trim_start_matches('/'))
    }

    /// Store `body` at `location`
    pub async fn put(
        &self,
        location: &str,
        body: impl Into<reqwest::Body>,
        content_type: &str,
    ) -> Result<()> {
        trace!(location, content_type, "uploading object");
        let resp = self
            .http
            .put(self.url(location))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        trace!(status = %resp.status(), "object uploaded");
        Ok(())
    }

    /// Remove the object at `location`
    pub async fn delete(&self, location: &str) -> Result<()> {
        trace!(location, "deleting object");
        let resp = self
            .http
            .delete(self.url(location))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        trace!(status = %resp.status(), "object deleted");
        Ok(())
    }
}
