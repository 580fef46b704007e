//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Render commands → Launch service → Poll readiness → Verify → Hand off
//!
//! Shutdown (shutdown.rs):
//!     Trigger observed → Stop service → Exit 130 (SIGINT) / 143 (SIGTERM)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: service first, then readiness, then verification
//! - Only verification gates the handoff; readiness is advisory
//! - After handoff nothing of the launcher remains, including its handlers

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Interrupt, Shutdown};
pub use signals::SignalListener;
pub use startup::{Orchestrator, StartupError, StartupPhase, Verified};
