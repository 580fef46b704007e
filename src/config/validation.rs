//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, ports valid)
//! - Reject commands with nothing to run
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LauncherConfig → Result<(), Vec<ValidationError>>
//! - Runs after env overrides, so it sees the values actually used

use thiserror::Error;

use crate::config::schema::{CommandConfig, LauncherConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("health_check.path must start with '/', got {0:?}")]
    RelativeHealthPath(String),

    #[error("health_check.path must not contain a fragment, got {0:?}")]
    HealthPathFragment(String),

    #[error("health_check.{0} must be greater than zero")]
    ZeroHealthSetting(&'static str),

    #[error("{0}.program must not be empty")]
    EmptyProgram(&'static str),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &LauncherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let health = &config.health_check;
    if !health.path.starts_with('/') {
        errors.push(ValidationError::RelativeHealthPath(health.path.clone()));
    }
    if health.path.contains('#') {
        errors.push(ValidationError::HealthPathFragment(health.path.clone()));
    }
    if health.max_attempts == 0 {
        errors.push(ValidationError::ZeroHealthSetting("max_attempts"));
    }
    if health.interval_ms == 0 {
        errors.push(ValidationError::ZeroHealthSetting("interval_ms"));
    }
    if health.timeout_ms == 0 {
        errors.push(ValidationError::ZeroHealthSetting("timeout_ms"));
    }

    check_command("service", &config.service, &mut errors);
    check_command("verify", &config.verify, &mut errors);
    check_command("worker", &config.worker, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_command(
    section: &'static str,
    command: &CommandConfig,
    errors: &mut Vec<ValidationError>,
) {
    if command.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram(section));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&LauncherConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = LauncherConfig::default();
        config.server.host = "  ".into();
        config.server.port = 0;
        config.health_check.path = "health".into();
        config.health_check.max_attempts = 0;
        config.worker.program = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyHost,
                ValidationError::ZeroPort,
                ValidationError::RelativeHealthPath("health".into()),
                ValidationError::ZeroHealthSetting("max_attempts"),
                ValidationError::EmptyProgram("worker"),
            ]
        );
    }

    #[test]
    fn test_health_path_query_allowed_fragment_rejected() {
        let mut config = LauncherConfig::default();
        config.health_check.path = "/health?deep=1".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.health_check.path = "/health#top".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::HealthPathFragment("/health#top".into())])
        );
    }

    #[test]
    fn test_error_messages_name_the_field() {
        assert_eq!(
            ValidationError::ZeroHealthSetting("interval_ms").to_string(),
            "health_check.interval_ms must be greater than zero"
        );
        assert_eq!(
            ValidationError::EmptyProgram("verify").to_string(),
            "verify.program must not be empty"
        );
    }
}
