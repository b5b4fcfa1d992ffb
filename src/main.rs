use anyhow::Result;
use heliotrope::monitor::{MonitorCommand, PlantMonitor};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Create monitor command channel
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<MonitorCommand>();

    // Initialize the monitor with command receiver
    let mut monitor = PlantMonitor::new(cmd_rx, cmd_tx.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create monitor: {}", e))?;

    info!("Heliotrope solar telemetry driver starting up");

    // Wire Ctrl-C to the shutdown channel
    let shutdown = monitor.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(());
        }
    });

    // Run the monitor in the current task
    match monitor.run().await {
        Ok(()) => {
            info!("Monitor shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Monitor failed with error: {}", e);
            Err(anyhow::anyhow!("Monitor error: {}", e))
        }
    }
}
