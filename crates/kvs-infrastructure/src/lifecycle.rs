//! Process lifecycle
//!
//! Waiting for the host's shutdown signal. Tearing down the store connection
//! is [`AppContext::shutdown`](crate::di::AppContext::shutdown).

use crate::error_ext::ErrorContext;
use kvs_domain::error::{Error, Result};
use tracing::info;

/// Resolve once Ctrl-C (SIGINT) or, on Unix, SIGTERM is received
pub async fn wait_for_shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .io_context("Failed to listen for Ctrl-C")
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())
            .io_context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl-C, shutting down");
        }
        result = terminate => {
            result?;
            info!("Received SIGTERM, shutting down");
        }
    }
    Ok(())
}
