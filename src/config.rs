//! cdngate Configuration
//!
//! Configuration is read once at startup from a TOML file, then selected
//! fields may be overridden from the environment. Nothing here changes after
//! the servers start.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::storage::{BucketStore, FilesystemStore, MemoryStore, ObjectStore};

pub const ENV_SECRET_SHA256: &str = "CDNGATE_SECRET_SHA256";
pub const ENV_BIND_ADDRESS: &str = "CDNGATE_BIND_ADDRESS";
pub const ENV_BUCKET_ACCESS_KEY: &str = "CDNGATE_BUCKET_ACCESS_KEY";
pub const ENV_BUCKET_SECRET_KEY: &str = "CDNGATE_BUCKET_SECRET_KEY";

/// Main cdngate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gateway listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared-secret authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage backend selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Local development emulator
    #[serde(default)]
    pub emulation: EmulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the authenticated gateway
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hex SHA-256 digest of the upload secret (`cdngate hash-secret <secret>`)
    #[serde(default)]
    pub secret_sha256: Option<String>,
}

/// Which store the gateway writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// S3-compatible object bucket
    Bucket,
    /// Directory tree on local disk
    #[default]
    Filesystem,
    /// Process memory, lost on exit
    Memory,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Required when `kind = "bucket"`
    #[serde(default)]
    pub bucket: Option<BucketConfig>,

    #[serde(default)]
    pub filesystem: FilesystemConfig,
}

/// S3-compatible bucket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Bucket name
    pub name: String,

    /// Signing region ("auto" for R2)
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL, e.g. https://<account>.r2.cloudflarestorage.com
    pub endpoint: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Address the bucket as endpoint/bucket instead of bucket.endpoint
    #[serde(default = "default_true")]
    pub path_style: bool,
}

/// Filesystem backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Root directory objects are written under
    #[serde(default = "default_assets_dir")]
    pub root: PathBuf,
}

/// Development emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulationConfig {
    /// Read-only static server address
    #[serde(default = "default_read_address")]
    pub read_address: String,

    /// Unauthenticated write/delete endpoint address
    #[serde(default = "default_write_address")]
    pub write_address: String,

    /// Directory shared by both servers
    #[serde(default = "default_assets_dir")]
    pub root: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_read_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_write_address() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            bucket: None,
            filesystem: FilesystemConfig::default(),
        }
    }
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_assets_dir(),
        }
    }
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            read_address: default_read_address(),
            write_address: default_write_address(),
            root: default_assets_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(digest) = lookup(ENV_SECRET_SHA256) {
            self.auth.secret_sha256 = Some(digest);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.server.bind_address = addr;
        }
        if let Some(bucket) = self.backend.bucket.as_mut() {
            if let Some(key) = lookup(ENV_BUCKET_ACCESS_KEY) {
                bucket.access_key = key;
            }
            if let Some(key) = lookup(ENV_BUCKET_SECRET_KEY) {
                bucket.secret_key = key;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(digest) = &self.auth.secret_sha256 {
            CredentialVerifier::from_hex(digest)?;
        }

        if self.backend.kind == BackendKind::Bucket {
            let bucket = self.backend.bucket.as_ref().ok_or_else(|| {
                crate::Error::Config(
                    "backend.bucket is required when backend.kind = \"bucket\"".into(),
                )
            })?;
            if bucket.name.is_empty() {
                return Err(crate::Error::Config("backend.bucket.name cannot be empty".into()));
            }
            if bucket.endpoint.is_empty() {
                return Err(crate::Error::Config("backend.bucket.endpoint cannot be empty".into()));
            }
        }

        if self.server.bind_address.is_empty() {
            return Err(crate::Error::Config("server.bind_address cannot be empty".into()));
        }

        Ok(())
    }

    /// Credential verifier for the gateway; the digest is mandatory here
    pub fn verifier(&self) -> crate::Result<CredentialVerifier> {
        let digest = self.auth.secret_sha256.as_deref().ok_or_else(|| {
            crate::Error::Config(format!(
                "auth.secret_sha256 (or {}) must be set to run the gateway",
                ENV_SECRET_SHA256
            ))
        })?;
        CredentialVerifier::from_hex(digest)
    }

    /// Build the configured storage backend
    pub fn object_store(&self) -> crate::Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match self.backend.kind {
            BackendKind::Bucket => {
                let bucket = self.backend.bucket.as_ref().ok_or_else(|| {
                    crate::Error::Config("backend.bucket section missing".into())
                })?;
                Arc::new(BucketStore::new(bucket)?)
            }
            BackendKind::Filesystem => {
                Arc::new(FilesystemStore::new(&self.backend.filesystem.root))
            }
            BackendKind::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::digest_hex;

    #[test]
    fn test_parse_config() {
        let toml = format!(
            r#"
[server]
bind_address = "127.0.0.1:9000"

[auth]
secret_sha256 = "{}"

[backend]
kind = "bucket"

[backend.bucket]
name = "assets"
endpoint = "https://example.r2.cloudflarestorage.com"
access_key = "AKID"
secret_key = "shh"
"#,
            digest_hex("upload-secret")
        );

        let config = Config::from_str(&toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.backend.kind, BackendKind::Bucket);
        let bucket = config.backend.bucket.as_ref().unwrap();
        assert_eq!(bucket.region, "auto");
        assert!(bucket.path_style);
        let verifier = config.verifier().unwrap();
        assert!(verifier.verify(Some("upload-secret".as_bytes())).is_accepted());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.backend.kind, BackendKind::Filesystem);
        assert_eq!(config.emulation.read_address, "0.0.0.0:8000");
        assert_eq!(config.emulation.write_address, "0.0.0.0:8001");
        assert_eq!(config.emulation.root, PathBuf::from("./assets"));
        assert!(config.verifier().is_err());
    }

    #[test]
    fn test_bucket_section_required() {
        let err = Config::from_str("[backend]\nkind = \"bucket\"\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_bad_digest_rejected() {
        let err = Config::from_str("[auth]\nsecret_sha256 = \"1234\"\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_str(
            r#"
[backend]
kind = "bucket"

[backend.bucket]
name = "b"
endpoint = "http://localhost:9000"
"#,
        )
        .unwrap();
        let digest = digest_hex("from-env");
        config.apply_env(|name| match name {
            ENV_SECRET_SHA256 => Some(digest.clone()),
            ENV_BUCKET_ACCESS_KEY => Some("env-access".to_string()),
            _ => None,
        });

        assert_eq!(config.auth.secret_sha256.as_deref(), Some(digest.as_str()));
        let bucket = config.backend.bucket.as_ref().unwrap();
        assert_eq!(bucket.access_key, "env-access");
        assert_eq!(bucket.secret_key, "");
        assert_eq!(config.server.bind_address, "0.0.0.0:8787");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed = Config::from_str(&rendered).unwrap();
        assert_eq!(parsed.backend.kind, BackendKind::Filesystem);
    }
}
