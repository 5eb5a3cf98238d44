//! cdngate Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for cdngate operations
pub type Result<T> = std::result::Result<T, Error>;

/// cdngate error types
#[derive(Error, Debug)]
pub enum Error {
    // Request errors
    #[error("authorization header required")]
    MissingCredential,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("method {0} not allowed")]
    UnsupportedMethod(String),

    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("object not found: {0}")]
    NotFound(String),

    // Backend errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bucket error: {0}")]
    Bucket(#[from] s3::error::S3Error),

    #[error("bucket returned status {status} for {operation} {key}")]
    BucketStatus {
        operation: &'static str,
        key: String,
        status: u16,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// HTTP status reported to the caller for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingCredential | Error::InvalidKey(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredential => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Bucket(_) | Error::BucketStatus { .. } => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Config(_) | Error::ConfigParse(_) | Error::Http(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the error was caused by the storage backend rather than the request
    pub fn is_backend_failure(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
