//! Authenticated write gateway
//!
//! Every path is an object key. `PUT /<key>` stores the request body,
//! `DELETE /<key>` removes the object; both answer `204 No Content`.
//! Writers authenticate with `Authorization: Bearer <secret>`.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::{bearer_token, CredentialVerifier, Rejection, Verdict};
use crate::error::{Error, Result};
use crate::key;
use crate::storage::ObjectStore;

/// Request dispatcher shared by all connections
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn ObjectStore>,
    verifier: Option<Arc<CredentialVerifier>>,
}

impl Gateway {
    /// Gateway that requires a valid credential on every write
    pub fn new(store: Arc<dyn ObjectStore>, verifier: CredentialVerifier) -> Self {
        Self {
            store,
            verifier: Some(Arc::new(verifier)),
        }
    }

    /// Gateway without authentication, for the development emulator only
    pub fn open(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            verifier: None,
        }
    }

    /// Build the router serving this gateway on every path
    pub fn router(self) -> Router {
        Router::new()
            .fallback(dispatch)
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    /// Handle one write request.
    ///
    /// Method and credential are checked before the store is touched.
    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        authorization: Option<&HeaderValue>,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<()> {
        if *method != Method::PUT && *method != Method::DELETE {
            return Err(Error::UnsupportedMethod(method.to_string()));
        }

        if let Some(verifier) = &self.verifier {
            authenticate(verifier, authorization)?;
        }

        let key = key::normalize(path);
        if key.is_empty() {
            return Err(Error::InvalidKey(key.to_owned()));
        }

        if *method == Method::PUT {
            debug!(key, bytes = body.len(), ?content_type, backend = self.store.name(), "put");
            self.store.put(key, body, content_type).await
        } else {
            debug!(key, backend = self.store.name(), "delete");
            self.store.delete(key).await
        }
    }
}

fn authenticate(verifier: &CredentialVerifier, authorization: Option<&HeaderValue>) -> Result<()> {
    // Header bytes are hashed as sent; they need not be ASCII.
    let presented = authorization.map(|value| bearer_token(value.as_bytes()));
    match verifier.verify(presented) {
        Verdict::Accepted => Ok(()),
        Verdict::Rejected(Rejection::Missing) => Err(Error::MissingCredential),
        Verdict::Rejected(Rejection::Mismatch) => Err(Error::InvalidCredential),
    }
}

async fn dispatch(
    State(gateway): State<Gateway>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    gateway
        .handle(
            &method,
            uri.path(),
            headers.get(header::AUTHORIZATION),
            content_type,
            body,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Authenticated gateway bound to a TCP address
pub struct GatewayServer {
    bind_address: String,
    gateway: Gateway,
}

impl GatewayServer {
    pub fn new(bind_address: String, gateway: Gateway) -> Self {
        Self {
            bind_address,
            gateway,
        }
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.bind_address).await?;
        info!(
            "Upload gateway listening on {} (backend: {})",
            self.bind_address,
            self.gateway.store.name()
        );

        axum::serve(listener, self.gateway.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
