//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals to `ShutdownSignal` events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before the returned future is polled, so no
//!   signal is lost between registration and launch
//! - Keeps listening after the first signal; a repeat forces shutdown

use std::future::Future;

use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};

/// Register signal handlers, returning a future that forwards every signal
/// to `shutdown` until the process exits.
#[cfg(unix)]
pub fn listen(shutdown: Shutdown) -> std::io::Result<impl Future<Output = ()> + Send> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownSignal::Interrupt,
                Some(()) = terminate.recv() => ShutdownSignal::Terminate,
                else => return,
            };
            tracing::info!(signal = ?received, "Shutdown signal received");
            shutdown.trigger(received);
        }
    })
}

#[cfg(not(unix))]
pub fn listen(shutdown: Shutdown) -> std::io::Result<impl Future<Output = ()> + Send> {
    Ok(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!(signal = ?ShutdownSignal::Interrupt, "Shutdown signal received");
            shutdown.trigger(ShutdownSignal::Interrupt);
        }
    })
}
