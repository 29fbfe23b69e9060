//! Shutdown coordination across listeners.

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

/// A spawned listener task.
pub type ServerTask = JoinHandle<std::io::Result<()>>;

/// How a listener task ended.
pub type ServerExit = Result<std::io::Result<()>, JoinError>;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that every listener subscribes to.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of listeners still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for an optional task. Never completes when there is none, so it
/// can sit in a `select!` next to required tasks.
pub async fn join_optional(task: &mut Option<ServerTask>) -> ServerExit {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Log how a listener task ended. A clean stop is only an error before
/// shutdown was requested.
pub fn log_exit(server: &'static str, exit: &ServerExit, shutting_down: bool) {
    match exit {
        Ok(Ok(())) if shutting_down => tracing::debug!(server, "Server drained"),
        Ok(Ok(())) => tracing::error!(server, "Server stopped before shutdown was requested"),
        Ok(Err(e)) => tracing::error!(server, error = %e, "Server failed"),
        Err(e) => tracing::error!(server, error = %e, "Server task panicked or was cancelled"),
    }
}
