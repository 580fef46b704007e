//! Interrupt coordination for the startup sequence.

use std::fmt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// The signal that asked startup to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl Interrupt {
    /// Shell convention: 128 + signal number.
    pub fn exit_code(self) -> u8 {
        match self {
            Interrupt::Interrupt => 130,
            Interrupt::Terminate => 143,
        }
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Interrupt => f.write_str("SIGINT"),
            Interrupt::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Coordinator for aborting startup.
///
/// Provides a broadcast channel the orchestrator subscribes to; the signal
/// listener triggers it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<Interrupt>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<Interrupt> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self, interrupt: Interrupt) {
        let _ = self.tx.send(interrupt);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once shutdown has been triggered.
///
/// With no receiver, or once every sender is gone, this never resolves.
pub async fn triggered(rx: Option<&mut broadcast::Receiver<Interrupt>>) -> Interrupt {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };

    loop {
        match rx.recv().await {
            Ok(interrupt) => return interrupt,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return std::future::pending().await,
        }
    }
}

/// Non-blocking check for a trigger that has already been sent.
pub fn pending(rx: Option<&mut broadcast::Receiver<Interrupt>>) -> Option<Interrupt> {
    let rx = rx?;
    loop {
        match rx.try_recv() {
            Ok(interrupt) => return Some(interrupt),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
        }
    }
}
