//! Child process management.
//!
//! # Data Flow
//! ```text
//! CommandConfig + ServerConfig
//!     → command.rs (render placeholders, export SERVER_HOST/SERVER_PORT)
//!     → service.rs  (background service: spawn, observe, terminate)
//!     → CommandSpec::status (verification: run to completion)
//!     → handoff.rs  (worker: replace the current process)
//! ```
//!
//! # Design Decisions
//! - Every child inherits stdio; output is never captured
//! - Termination is best-effort: a process that is already gone is not an error
//! - Handoff on Unix keeps the PID, elsewhere it waits and forwards the exit code

pub mod command;
pub mod handoff;
pub mod service;

use thiserror::Error;

pub use command::CommandSpec;
pub use handoff::hand_off;
pub use service::ServiceHandle;

/// Error type for process operations.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The configured program is blank.
    #[error("command has no program")]
    EmptyCommand,

    /// The program could not be started (or exec'd).
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on a started program failed.
    #[error("failed waiting on `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A termination signal could not be delivered.
    #[error("failed to signal pid {pid}: {reason}")]
    Signal { pid: u32, reason: String },
}
