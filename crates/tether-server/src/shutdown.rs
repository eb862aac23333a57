//! Graceful shutdown.
//!
//! [`ShutdownSignal`] is a cloneable, level-triggered flag: once triggered,
//! every current and future waiter completes. [`ConnectionTracker`] counts
//! open connections so the server can drain them before returning.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// A signal that triggers and awaits graceful shutdown.
///
/// # Example
///
/// ```rust
/// use tether_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    state: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a signal that has not been triggered.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Triggers shutdown. Idempotent.
    pub fn trigger(&self) {
        self.state.send_replace(true);
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut state = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = state.wait_for(|triggered| *triggered).await;
    }

    /// Creates a signal triggered by SIGTERM or SIGINT (Ctrl+C elsewhere).
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            match wait_for_os_signal().await {
                Ok(name) => tracing::info!(signal = name, "Received {}, shutting down", name),
                Err(e) => tracing::error!("Failed to listen for OS signals: {}", e),
            }
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

#[derive(Debug, Default)]
struct TrackerState {
    active: AtomicUsize,
    idle: Notify,
}

/// Counts open connections.
///
/// # Example
///
/// ```rust
/// use tether_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    state: Arc<TrackerState>,
}

impl ConnectionTracker {
    /// Creates a tracker with no open connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection; it stays counted until the token drops.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.state.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            state: Arc::clone(&self.state),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Completes once no connections are open.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.state.idle.notified();
            if self.active_connections() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Held for the lifetime of one connection.
#[derive(Debug)]
pub struct ConnectionToken {
    state: Arc<TrackerState>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.state.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}
