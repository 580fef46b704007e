//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the launcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Where the background service binds (and where it is probed).
    pub server: ServerConfig,

    /// Readiness poll settings.
    pub health_check: HealthCheckConfig,

    /// Background web service.
    pub service: CommandConfig,

    /// Verification step gating the handoff.
    pub verify: CommandConfig,

    /// Worker that replaces the launcher on success.
    pub worker: CommandConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            health_check: HealthCheckConfig::default(),
            service: CommandConfig::new(
                "uvicorn",
                ["src.server.main:app", "--host", "{host}", "--port", "{port}"],
            ),
            verify: CommandConfig::new("python", ["scripts/verify.py"]),
            worker: CommandConfig::new("python", ["scripts/run.py"]),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Bind address of the background service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host the service binds to, overridden by `SERVER_HOST`.
    pub host: String,

    /// Port the service binds to, overridden by `SERVER_PORT`.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Readiness poll configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path to probe.
    pub path: String,

    /// Sleep between attempts in milliseconds.
    pub interval_ms: u64,

    /// Attempts before giving up and moving on to verification.
    pub max_attempts: u32,

    /// Deadline for a single attempt in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            interval_ms: 1000,
            max_attempts: 30,
            timeout_ms: 2000,
        }
    }
}

/// An external command.
///
/// `args` may contain `{host}` and `{port}`; see [`crate::process::CommandSpec`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommandConfig {
    /// Executable, resolved through `PATH`.
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment on top of the inherited one.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandConfig {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
