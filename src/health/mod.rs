//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Readiness poll (readiness.rs):
//!     attempt n
//!     → probe.rs (GET http://host:port/ with deadline)
//!     → ready?  stop, report attempt n
//!     → else sleep interval, next attempt
//!     → budget exhausted: report, do not fail
//! ```
//!
//! # Design Decisions
//! - Status below 400 is ready; 4xx/5xx, transport errors and timeouts are not
//! - Readiness is advisory: the caller always moves on to verification
//! - One probe at a time, no overlap between attempts

pub mod probe;
pub mod readiness;

use thiserror::Error;

pub use probe::{health_url, HealthProbe, ProbeOutcome};
pub use readiness::{wait_until_ready, Readiness};

/// Error type for building a probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("invalid health check URL {0}")]
    InvalidUrl(String),
}
