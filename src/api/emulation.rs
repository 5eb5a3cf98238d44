//! Local stand-in for the object bucket
//!
//! Two listeners share one directory: a read-only static server that sends
//! `Access-Control-Allow-Origin: *`, and an unauthenticated write endpoint
//! that speaks the gateway protocol. Development use only.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::gateway::Gateway;
use crate::config::EmulationConfig;
use crate::error::Result;
use crate::storage::FilesystemStore;

/// Static file router over `root`
pub fn read_router(root: impl Into<PathBuf>) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root.into()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Unauthenticated PUT/DELETE router writing below `root`
pub fn write_router(root: impl Into<PathBuf>) -> Router {
    Gateway::open(Arc::new(FilesystemStore::new(root))).router()
}

/// Read and write servers of the local emulator
pub struct Emulator {
    config: EmulationConfig,
}

impl Emulator {
    pub fn new(config: EmulationConfig) -> Self {
        Self { config }
    }

    /// Serve both listeners until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let read_listener = TcpListener::bind(&self.config.read_address).await?;
        let write_listener = TcpListener::bind(&self.config.write_address).await?;

        info!(
            "Emulated CDN serving {:?} on http://{}",
            self.config.root, self.config.read_address
        );
        info!(
            "Emulated bucket accepting writes on http://{}",
            self.config.write_address
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown.await;
            let _ = stop_tx.send(true);
        });

        let read = axum::serve(read_listener, read_router(&self.config.root))
            .with_graceful_shutdown(stopped(stop_rx.clone()));
        let write = axum::serve(write_listener, write_router(&self.config.root))
            .with_graceful_shutdown(stopped(stop_rx));

        tokio::try_join!(async { read.await }, async { write.await })?;

        Ok(())
    }
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_write_then_read_back() {
        let dir = tempfile::TempDir::new().unwrap();

        let put = Request::builder()
            .method("PUT")
            .uri("/x/y.txt")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let resp = write_router(dir.path()).oneshot(put).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let get = Request::builder()
            .uri("/x/y.txt")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let resp = read_router(dir.path()).oneshot(get).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_write_endpoint_needs_no_credential() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("old.css"), b"body{}").unwrap();

        let delete = Request::builder()
            .method("DELETE")
            .uri("/old.css")
            .body(Body::empty())
            .unwrap();
        let resp = write_router(dir.path()).oneshot(delete).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(!dir.path().join("old.css").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let delete = Request::builder()
            .method("DELETE")
            .uri("/missing.png")
            .body(Body::empty())
            .unwrap();
        let resp = write_router(dir.path()).oneshot(delete).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_server_is_read_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let put = Request::builder()
            .method("PUT")
            .uri("/x.txt")
            .body(Body::from("nope"))
            .unwrap();
        let resp = read_router(dir.path()).oneshot(put).await.unwrap();
        assert!(resp.status().is_client_error());
        assert!(!dir.path().join("x.txt").exists());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::TempDir::new().unwrap();
        let emulator = Emulator::new(EmulationConfig {
            read_address: "127.0.0.1:0".into(),
            write_address: "127.0.0.1:0".into(),
            root: dir.path().to_path_buf(),
        });
        emulator.run(async {}).await.unwrap();
    }
}
