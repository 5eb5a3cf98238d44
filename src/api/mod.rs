//! HTTP servers: the authenticated gateway and the local emulator

pub mod emulation;
pub mod gateway;

pub use emulation::Emulator;
pub use gateway::{Gateway, GatewayServer};

/// Resolves when the process receives Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
