//! Rendering configured commands into runnable ones.

use std::collections::BTreeMap;
use std::process::ExitStatus;

use crate::config::{CommandConfig, ServerConfig};
use crate::config::loader::{HOST_ENV, PORT_ENV};
use crate::process::ProcessError;

/// A fully resolved command: placeholders substituted, env assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Resolve a configured command against the server bind address.
    ///
    /// `{host}` and `{port}` are replaced in every argument. `SERVER_HOST`
    /// and `SERVER_PORT` are exported with the resolved values; explicit
    /// entries in the command's own `env` win.
    pub fn render(config: &CommandConfig, server: &ServerConfig) -> Result<Self, ProcessError> {
        let program = config.program.trim();
        if program.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }

        let port = server.port.to_string();
        let args = config
            .args
            .iter()
            .map(|arg| arg.replace("{host}", &server.host).replace("{port}", &port))
            .collect();

        let mut env = BTreeMap::new();
        env.insert(HOST_ENV.to_string(), server.host.clone());
        env.insert(PORT_ENV.to_string(), port);
        env.extend(config.env.clone());

        Ok(Self {
            program: program.to_string(),
            args,
            env,
        })
    }

    /// Build a std command inheriting stdio and the parent environment.
    pub fn to_std(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env);
        cmd
    }

    /// Build a tokio command inheriting stdio and the parent environment.
    pub fn to_tokio(&self) -> tokio::process::Command {
        tokio::process::Command::from(self.to_std())
    }

    /// Run to completion, inheriting stdio, and report the exit status.
    ///
    /// Dropping the returned future kills the child.
    pub async fn status(&self) -> Result<ExitStatus, ProcessError> {
        let mut child = self
            .to_tokio()
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: self.display(),
                source,
            })?;
        child.wait().await.map_err(|source| ProcessError::Wait {
            command: self.display(),
            source,
        })
    }

    /// Shell-ish rendering for log lines.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
