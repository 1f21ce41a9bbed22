//! Shutdown coordination for the launcher.

use tokio::sync::broadcast;

/// Which OS signal asked the launcher to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl ShutdownSignal {
    /// Raw signal number, for exit-code mapping and forwarding.
    #[cfg(unix)]
    pub fn as_raw(self) -> i32 {
        match self {
            ShutdownSignal::Interrupt => libc::SIGINT,
            ShutdownSignal::Terminate => libc::SIGTERM,
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks can subscribe to.
/// Every signal is delivered, so a second one can escalate.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<ShutdownSignal>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe to shutdown signals.
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.tx.subscribe()
    }

    /// Deliver a signal to every subscriber.
    pub fn trigger(&self, signal: ShutdownSignal) {
        let _ = self.tx.send(signal);
    }

    /// Get the number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_signal_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger(ShutdownSignal::Interrupt);
        shutdown.trigger(ShutdownSignal::Terminate);

        assert_eq!(rx.recv().await.unwrap(), ShutdownSignal::Interrupt);
        assert_eq!(rx.recv().await.unwrap(), ShutdownSignal::Terminate);
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        Shutdown::default().trigger(ShutdownSignal::Terminate);
    }
}
