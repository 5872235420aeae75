// src/engine/signals.rs

//! Termination signals that end the redeploy loop.
//!
//! A signal only sets the [`ShutdownSignal`]; the loop then stops the child
//! itself. The handlers are registered before this returns, so a signal that
//! arrives right after cannot take the default action and kill devloop while
//! the application keeps running.

use tracing::info;
#[cfg(not(unix))]
use tracing::warn;

use super::ShutdownSignal;
use crate::errors::Result;

/// Request shutdown on SIGINT or SIGTERM.
#[cfg(unix)]
pub fn listen_for_shutdown(shutdown: ShutdownSignal) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received"),
            _ = sigterm.recv() => info!("SIGTERM received"),
        }
        shutdown.request();
    });
    Ok(())
}

/// Request shutdown on Ctrl+C.
#[cfg(not(unix))]
pub fn listen_for_shutdown(shutdown: ShutdownSignal) -> Result<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl+C received");
        shutdown.request();
    });
    Ok(())
}
