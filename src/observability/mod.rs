//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every startup step produces:
//!     → logging.rs (structured log events on stdout)
//!
//! Consumers:
//!     → container log driver (shared with the service and worker output)
//! ```
//!
//! # Design Decisions
//! - Structured fields (attempt, pid, command) rather than formatted text
//! - JSON optional for log pipelines that parse lines
//! - RUST_LOG wins over the configured level

pub mod logging;

pub use logging::init_logging;
