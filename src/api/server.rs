//! HTTP server lifecycle: bind, serve the API router, stop on signal.
//!
//! `serve` runs until ctrl-c. `start_api_server` spawns the same server in a
//! background task and returns a handle with a shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::core_state::CoreState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a background API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve on the configured address until ctrl-c.
pub async fn serve(core: Arc<CoreState>) -> Result<(), ServerError> {
    let listener = bind(core.config.bind_addr).await?;
    let addr = listener.local_addr()?;
    let app = api_router(core);

    tracing::info!(%addr, "Clinic API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {e}");
            }
            tracing::info!("Shutdown requested");
        })
        .await?;
    tracing::info!("Clinic API stopped");
    Ok(())
}

/// Start the API server in a background task on the configured address.
pub async fn start_api_server(core: Arc<CoreState>) -> Result<ApiServer, ServerError> {
    let listener = bind(core.config.bind_addr).await?;
    let addr = listener.local_addr()?;
    let app = api_router(core);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
