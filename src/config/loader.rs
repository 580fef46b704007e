//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::LauncherConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `server.host`.
pub const HOST_ENV: &str = "SERVER_HOST";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "SERVER_PORT";
/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "LAUNCHER_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}={value:?}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a configuration from TOML text. Missing sections take defaults.
pub fn parse_config(content: &str) -> Result<LauncherConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read a TOML configuration file without applying env overrides.
pub fn read_config_file(path: &Path) -> Result<LauncherConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Overlay `SERVER_HOST` / `SERVER_PORT` onto a configuration.
///
/// `lookup` abstracts the environment so callers can supply fixed values.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut LauncherConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(host) = non_empty(HOST_ENV) {
        config.server.host = host.trim().to_string();
    }

    if let Some(raw) = non_empty(PORT_ENV) {
        config.server.port = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                var: PORT_ENV,
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    Ok(())
}

/// Resolve the full configuration: defaults, then the optional file, then env.
///
/// The result has been validated.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<LauncherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => LauncherConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the configuration from the process environment.
pub fn load_config(path: Option<&Path>) -> Result<LauncherConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}
