//! axum integration.
//!
//! [`Json`] is the extractor/response type handlers use; [`register`]
//! installs a [`JsonConverter`](crate::converter::JsonConverter) on a
//! router; [`start_server`] runs a router with graceful shutdown.

pub mod config;
pub mod extract;
pub mod middleware;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::errors::{JsonError, Result};
use config::SHUTDOWN_TIMEOUT_SECS;

pub use config::ServerConfig;
pub use extract::Json;
pub use middleware::{register, RouterExt};

// ---------------------------------------------------------------------------
// ShutdownHandle
// ---------------------------------------------------------------------------

/// Handle returned by `start_server` that allows triggering graceful shutdown.
pub struct ShutdownHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ShutdownHandle {
    /// Address the server actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the server to begin graceful shutdown.
    ///
    /// Returns `Ok(())` if the signal was sent, or `Err` if the server
    /// already stopped.
    pub fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            tx.send(()).map_err(|_| JsonError::Config("Server already stopped".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Start serving `router` with the given configuration.
///
/// The server runs in a background tokio task. Returns a `ShutdownHandle`
/// that can be used to trigger graceful shutdown.
pub async fn start_server(config: ServerConfig, router: Router) -> Result<ShutdownHandle> {
    config.validate()?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        JsonError::Config(format!("Failed to bind to {}: {}", addr, e))
    })?;
    let local_addr = listener.local_addr()?;

    tracing::info!(addr = %local_addr, "HTTP server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(graceful_shutdown_signal(shutdown_rx));

        if let Err(e) = serve.await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ShutdownHandle {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Future that resolves when the shutdown signal is received.
async fn graceful_shutdown_signal(shutdown_rx: oneshot::Receiver<()>) {
    let _ = shutdown_rx.await;
    tracing::info!(
        "Shutdown signal received, allowing {}s for in-flight requests",
        SHUTDOWN_TIMEOUT_SECS
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
