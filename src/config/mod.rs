//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → SERVER_HOST / SERVER_PORT overlay (loader.rs)
//!     → validation.rs (semantic checks)
//!     → LauncherConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never changes afterwards
//! - All fields have defaults to allow running with no file at all
//! - Environment wins over the file, the file wins over defaults

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::{
    CommandConfig, HealthCheckConfig, LauncherConfig, ObservabilityConfig, ServerConfig,
};
pub use validation::ValidationError;
