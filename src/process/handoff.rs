//! Handing the process over to the worker.
//!
//! On Unix the current image is replaced in place (same PID, same open
//! descriptors). Elsewhere the worker is spawned and waited on, and its exit
//! code becomes ours.

use std::convert::Infallible;

use crate::process::{CommandSpec, ProcessError};

/// Replace the current process with `worker`.
///
/// Only ever returns on failure.
#[cfg(unix)]
pub async fn hand_off(worker: &CommandSpec) -> Result<Infallible, ProcessError> {
    use std::os::unix::process::CommandExt;

    tracing::info!(command = %worker.display(), "Handing off to worker");
    let source = worker.to_std().exec();

    Err(ProcessError::Spawn {
        command: worker.display(),
        source,
    })
}

#[cfg(not(unix))]
pub async fn hand_off(worker: &CommandSpec) -> Result<Infallible, ProcessError> {
    tracing::info!(command = %worker.display(), "Handing off to worker");
    let mut child = worker.to_tokio().spawn().map_err(|source| ProcessError::Spawn {
        command: worker.display(),
        source,
    })?;

    let wait_error = |source| ProcessError::Wait {
        command: worker.display(),
        source,
    };

    let status = tokio::select! {
        status = child.wait() => status.map_err(wait_error)?,
        _ = tokio::signal::ctrl_c() => {
            let _ = child.start_kill();
            child.wait().await.map_err(wait_error)?
        }
    };

    std::process::exit(status.code().unwrap_or(1))
}
