//! Background service process.
//!
//! # Responsibilities
//! - Spawn the service without waiting on it
//! - Report whether it has already exited
//! - Terminate it at most once, tolerating an already-exited process

use std::process::ExitStatus;
use tokio::process::Child;

use crate::process::{CommandSpec, ProcessError};

/// Handle to the running background service.
///
/// Dropping the handle leaves the service running; only
/// [`ServiceHandle::terminate`] stops it.
#[derive(Debug)]
pub struct ServiceHandle {
    child: Child,
    command: String,
    pid: Option<u32>,
}

impl ServiceHandle {
    /// Start the service. Returns as soon as the process exists.
    pub fn spawn(spec: &CommandSpec) -> Result<Self, ProcessError> {
        let command = spec.display();
        let child = spec
            .to_tokio()
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: command.clone(),
                source,
            })?;

        let pid = child.id();
        tracing::info!(pid = ?pid, command = %command, "Service process launched");

        Ok(Self { child, command, pid })
    }

    /// PID the service was started with.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking check for an exited service. Reaps it if so.
    pub fn try_exit_status(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        self.child.try_wait().map_err(|source| ProcessError::Wait {
            command: self.command.clone(),
            source,
        })
    }

    /// Ask the service to stop.
    ///
    /// A service that has already exited counts as terminated.
    pub fn terminate(mut self) -> Result<(), ProcessError> {
        // `id()` is None once the child has been reaped, so a recycled PID
        // is never signalled.
        let Some(pid) = self.child.id() else {
            tracing::debug!(
                command = %self.command,
                "Service already exited, nothing to terminate"
            );
            return Ok(());
        };

        let delivered = send_terminate(&mut self.child, pid)?;
        if delivered {
            tracing::info!(pid, "Sent termination signal to service");
        } else {
            tracing::debug!(pid, "Service exited before termination signal");
        }
        Ok(())
    }
}

/// Returns false when the process no longer exists.
#[cfg(unix)]
fn send_terminate(_child: &mut Child, pid: u32) -> Result<bool, ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|e| ProcessError::Signal {
        pid,
        reason: e.to_string(),
    })?;

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(ProcessError::Signal {
            pid,
            reason: errno.desc().to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child, pid: u32) -> Result<bool, ProcessError> {
    match child.start_kill() {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(false),
        Err(e) => Err(ProcessError::Signal {
            pid,
            reason: e.to_string(),
        }),
    }
}
