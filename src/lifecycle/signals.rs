//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, reload)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown
//! - Non-unix targets only get Ctrl+C

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the signal listener.
///
/// Returns a receiver that yields once per SIGHUP.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> mpsc::UnboundedReceiver<()> {
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(e) = listen(&shutdown, reload_tx).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    });
    reload_rx
}

#[cfg(unix)]
async fn listen(shutdown: &Shutdown, reload_tx: mpsc::UnboundedSender<()>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = interrupt.recv() => {
                tracing::info!("SIGINT received");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
                break;
            }
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading configuration");
                let _ = reload_tx.send(());
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

#[cfg(not(unix))]
async fn listen(shutdown: &Shutdown, _reload_tx: mpsc::UnboundedSender<()>) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received");
    shutdown.trigger();
    Ok(())
}
