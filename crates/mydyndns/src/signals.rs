//! Shutdown signals
//!
//! SIGINT, SIGTERM and SIGHUP cancel the agent's shutdown token. Handlers are
//! registered before the agent starts so an early signal is not lost.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancel `shutdown` when a termination signal arrives
#[cfg(unix)]
pub fn cancel_on_signal(shutdown: CancellationToken) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("failed to set up SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to set up SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("failed to set up SIGHUP handler")?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
            _ = sighup.recv() => "SIGHUP",
            _ = shutdown.cancelled() => return,
        };
        info!(signal = received, "Received shutdown signal");
        shutdown.cancel();
    });

    Ok(())
}

/// Cancel `shutdown` on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
pub fn cancel_on_signal(shutdown: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to wait for CTRL-C");
                    return;
                }
            }
            _ = shutdown.cancelled() => return,
        }
        info!(signal = "SIGINT", "Received shutdown signal");
        shutdown.cancel();
    });

    Ok(())
}
