//! cdngate - Authenticated Object Upload Gateway
//!
//! A small write path into a path-addressable object bucket. Every request
//! path is an object key; `PUT` stores the body and `DELETE` removes the
//! object. Writers share a single secret whose SHA-256 digest is configured
//! on the gateway.
//!
//! # Components
//!
//! - [`auth`]: digest-based verification of the shared secret
//! - [`key`]: request path to object key mapping
//! - [`storage`]: bucket, filesystem and in-memory backends behind one trait
//! - [`api`]: the gateway dispatcher and the local development emulator
//! - [`client`]: HTTP client for applications that upload through the gateway

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{Emulator, Gateway, GatewayServer};
    pub use crate::auth::{CredentialVerifier, Verdict};
    pub use crate::client::UploadClient;
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::storage::ObjectStore;
}
