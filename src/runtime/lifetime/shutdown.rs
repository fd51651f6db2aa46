use tokio::signal;
use tokio::sync::watch;
use tracing::{error, warn};

/// 等待 Ctrl+C，随后通知后台任务退出
pub async fn listen_for_shutdown(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");

    if shutdown_tx.send(true).is_err() {
        warn!("No background task is listening for shutdown");
    }
}
