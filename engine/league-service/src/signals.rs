//! Signal handling for graceful shutdown

use tokio::sync::oneshot;
use tracing::{error, info};

/// Resolve once Ctrl+C (or SIGTERM on Unix) is received
pub fn setup_signal_handlers() -> oneshot::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to register SIGTERM handler: {}", e);
                    wait_for_ctrl_c().await;
                    let _ = shutdown_tx.send(());
                    return;
                }
            };

            tokio::select! {
                _ = wait_for_ctrl_c() => {}
                _ = sigterm.recv() => info!("SIGTERM signal received"),
            }
        }

        #[cfg(not(unix))]
        wait_for_ctrl_c().await;

        let _ = shutdown_tx.send(());
    });

    shutdown_rx
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C signal received"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
