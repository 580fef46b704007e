//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT/SIGTERM handlers before the service is launched
//! - Translate the first signal into a [`Shutdown`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered synchronously so no signal is missed between
//!   install and the first poll
//! - exec resets handlers to their defaults, so the worker starts clean

use crate::lifecycle::shutdown::{Interrupt, Shutdown};

/// Installed interrupt handlers, waiting to be spawned.
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first interrupt.
    #[cfg(unix)]
    pub async fn recv(mut self) -> Interrupt {
        tokio::select! {
            _ = self.interrupt.recv() => Interrupt::Interrupt,
            _ = self.terminate.recv() => Interrupt::Terminate,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) -> Interrupt {
        let _ = tokio::signal::ctrl_c().await;
        Interrupt::Interrupt
    }

    /// Spawn a task that triggers `shutdown` on the first interrupt.
    pub fn spawn(self, shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let interrupt = self.recv().await;
            tracing::warn!(signal = %interrupt, "Interrupt received, aborting startup");
            shutdown.trigger(interrupt);
        })
    }
}
