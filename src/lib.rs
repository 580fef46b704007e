//! Container entry point for the bot: launch the web service, wait for it,
//! verify, then become the bot worker.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod process;

pub use config::LauncherConfig;
pub use lifecycle::{Orchestrator, Shutdown, StartupError};
