//! Cancellation context for the run loop.
//!
//! A [`Shutdown`] escalates in two stages: the first request asks for a
//! graceful stop, any later request forces the host to quit without waiting
//! for the engine.

use log::{info, warn};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stage reached by a shutdown request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStage {
    /// Stop the session and wait for teardown
    Graceful,

    /// Quit immediately
    Forced,
}

/// Cloneable two-stage shutdown context
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    graceful: CancellationToken,
    forced: CancellationToken,
    requests: Arc<AtomicUsize>,
}

impl Shutdown {
    /// Create a new shutdown context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shutdown request and return the stage it escalated to
    pub fn request(&self) -> ShutdownStage {
        let count = self.requests.fetch_add(1, Ordering::AcqRel) + 1;
        self.graceful.cancel();
        if count == 1 {
            ShutdownStage::Graceful
        } else {
            self.forced.cancel();
            ShutdownStage::Forced
        }
    }

    /// Skip the graceful stage
    pub fn force(&self) {
        self.requests.fetch_add(1, Ordering::AcqRel);
        self.graceful.cancel();
        self.forced.cancel();
    }

    /// Check if any shutdown was requested
    pub fn is_requested(&self) -> bool {
        self.graceful.is_cancelled()
    }

    /// Check if shutdown escalated to a forced quit
    pub fn is_forced(&self) -> bool {
        self.forced.is_cancelled()
    }

    /// Wait for the first shutdown request
    pub async fn requested(&self) {
        self.graceful.cancelled().await
    }

    /// Wait for escalation to a forced quit
    pub async fn forced(&self) {
        self.forced.cancelled().await
    }
}

/// Feed SIGINT (and SIGTERM on Unix) into `shutdown`
///
/// The listener exits once shutdown is forced.
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let name = match next_signal().await {
                Ok(name) => name,
                Err(e) => {
                    warn!("Failed to listen for shutdown signals: {}", e);
                    return;
                }
            };

            match shutdown.request() {
                ShutdownStage::Graceful => {
                    info!("Received {}, shutting down (repeat to force)", name)
                }
                ShutdownStage::Forced => {
                    warn!("Received {} again, forcing shutdown", name);
                    return;
                }
            }
        }
    })
}

#[cfg(unix)]
async fn next_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn next_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl+C")
}
