//! Startup orchestration.
//!
//! # Responsibilities
//! - Launch the background service
//! - Poll it for readiness (advisory)
//! - Gate on the verification command
//! - Hand the process over to the worker
//!
//! # State Machine
//! ```text
//! Init → LaunchingService → PollingHealth → Verifying → ExecWorker
//!                                                     ↘ Failed
//! ```
//! Transitions only move forward. PollingHealth always advances to
//! Verifying, whether or not the service became ready.
//!
//! An interrupt is honoured up to the last check before exec. One landing
//! between that check and exec is swallowed by the launcher's handler; the
//! worker then starts and has to be signalled again.

use std::convert::Infallible;
use std::fmt;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::{CommandConfig, LauncherConfig};
use crate::health::{wait_until_ready, HealthProbe, ProbeError, Readiness};
use crate::lifecycle::shutdown::{self, Interrupt};
use crate::process::{self, CommandSpec, ProcessError, ServiceHandle};

/// Where the orchestrator is in the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Init,
    LaunchingService,
    PollingHealth,
    Verifying,
    ExecWorker,
    Failed,
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupPhase::Init => "init",
            StartupPhase::LaunchingService => "launching_service",
            StartupPhase::PollingHealth => "polling_health",
            StartupPhase::Verifying => "verifying",
            StartupPhase::ExecWorker => "exec_worker",
            StartupPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why startup did not reach the worker.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A configured command could not be rendered.
    #[error("invalid command: {0}")]
    Command(#[source] ProcessError),

    /// The health check URL could not be built.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The background service could not be started.
    #[error("failed to launch service: {0}")]
    Launch(#[source] ProcessError),

    /// Verification exited non-zero or could not be run.
    #[error("verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// exec (or the spawn fallback) of the worker failed.
    #[error("failed to hand off to worker: {0}")]
    Handoff(#[source] ProcessError),

    /// SIGINT/SIGTERM arrived before handoff.
    #[error("interrupted by {signal} during {phase}")]
    Interrupted {
        phase: StartupPhase,
        signal: Interrupt,
    },
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Interrupted { signal, .. } => signal.exit_code(),
            _ => 1,
        }
    }
}

/// Startup sequence up to, but not including, the handoff.
pub struct Orchestrator {
    config: LauncherConfig,
    phase: StartupPhase,
    shutdown: Option<broadcast::Receiver<Interrupt>>,
}

impl Orchestrator {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            phase: StartupPhase::Init,
            shutdown: None,
        }
    }

    /// Abort startup (cleaning up the service) when `rx` fires.
    pub fn with_shutdown(mut self, rx: broadcast::Receiver<Interrupt>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    pub fn phase(&self) -> StartupPhase {
        self.phase
    }

    /// Run the whole sequence. Only returns on failure.
    pub async fn run(mut self) -> Result<Infallible, StartupError> {
        let verified = self.prepare().await?;
        let verified = self.confirm(verified)?;
        self.phase = StartupPhase::ExecWorker;
        verified.hand_off().await
    }

    /// Last look for an interrupt before handing off.
    ///
    /// A signal that arrived after [`Orchestrator::prepare`] finished is
    /// still queued on the receiver; honour it and stop the service.
    pub fn confirm(&mut self, verified: Verified) -> Result<Verified, StartupError> {
        match shutdown::pending(self.shutdown.as_mut()) {
            None => Ok(verified),
            Some(signal) => {
                let err = StartupError::Interrupted {
                    phase: self.phase,
                    signal,
                };
                tracing::error!(
                    error = %err,
                    "Startup aborted before handoff, stopping service"
                );
                verified.abort();
                self.phase = StartupPhase::Failed;
                Err(err)
            }
        }
    }

    /// Launch, poll and verify.
    ///
    /// On success the service is left running and ownership of it moves
    /// into the returned [`Verified`]. On failure the service has already
    /// been asked to stop.
    pub async fn prepare(&mut self) -> Result<Verified, StartupError> {
        let result = self.prepare_inner().await;
        if result.is_err() {
            self.phase = StartupPhase::Failed;
        }
        result
    }

    async fn prepare_inner(&mut self) -> Result<Verified, StartupError> {
        let server = &self.config.server;
        let render = |command: &CommandConfig| {
            CommandSpec::render(command, server).map_err(StartupError::Command)
        };
        let service_spec = render(&self.config.service)?;
        let verify_spec = render(&self.config.verify)?;
        let worker = render(&self.config.worker)?;
        let probe = HealthProbe::new(server, &self.config.health_check)?;

        tracing::info!(
            host = %server.host,
            port = server.port,
            "Starting up"
        );

        advance(&mut self.phase, StartupPhase::LaunchingService);
        let mut service = ServiceHandle::spawn(&service_spec).map_err(StartupError::Launch)?;

        let gated = {
            let gate = poll_and_verify(
                &mut self.phase,
                &probe,
                &self.config,
                &mut service,
                &verify_spec,
            );
            tokio::select! {
                result = gate => result,
                signal = shutdown::triggered(self.shutdown.as_mut()) => {
                    Err(StartupError::Interrupted {
                        phase: self.phase,
                        signal,
                    })
                }
            }
        };

        match gated {
            Ok(readiness) => Ok(Verified {
                worker,
                readiness,
                service,
            }),
            Err(err) => {
                tracing::error!(error = %err, "Startup failed, stopping service");
                stop_service(service);
                Err(err)
            }
        }
    }
}

/// Everything passed. Holds the live service until handoff.
#[derive(Debug)]
pub struct Verified {
    pub worker: CommandSpec,
    pub readiness: Readiness,
    service: ServiceHandle,
}

impl Verified {
    pub fn service_pid(&self) -> Option<u32> {
        self.service.pid()
    }

    /// Replace the current process with the worker.
    ///
    /// Only returns if the handoff itself failed, in which case the service
    /// is stopped.
    pub async fn hand_off(self) -> Result<Infallible, StartupError> {
        match process::hand_off(&self.worker).await {
            Ok(never) => match never {},
            Err(err) => {
                stop_service(self.service);
                Err(StartupError::Handoff(err))
            }
        }
    }

    /// Stop the service without handing off.
    pub fn abort(self) {
        stop_service(self.service);
    }
}

fn advance(phase: &mut StartupPhase, next: StartupPhase) {
    tracing::debug!(from = %phase, to = %next, "Startup phase");
    *phase = next;
}

fn stop_service(service: ServiceHandle) {
    if let Err(e) = service.terminate() {
        tracing::warn!(error = %e, "Failed to stop service");
    }
}

async fn poll_and_verify(
    phase: &mut StartupPhase,
    probe: &HealthProbe,
    config: &LauncherConfig,
    service: &mut ServiceHandle,
    verify: &CommandSpec,
) -> Result<Readiness, StartupError> {
    advance(phase, StartupPhase::PollingHealth);

    let mut exit_reported = false;
    let readiness = wait_until_ready(probe, &config.health_check, |attempt, _| {
        if exit_reported {
            return;
        }
        match service.try_exit_status() {
            Ok(Some(status)) => {
                exit_reported = true;
                tracing::warn!(attempt, status = %status, "Service process has already exited");
            }
            Ok(None) => {}
            Err(e) => {
                exit_reported = true;
                tracing::warn!(error = %e, "Could not check service process");
            }
        }
    })
    .await;

    advance(phase, StartupPhase::Verifying);
    tracing::info!(command = %verify.display(), "Running verification");

    match verify.status().await {
        Ok(status) if status.success() => {
            tracing::info!("Verification passed");
            Ok(readiness)
        }
        Ok(status) => Err(StartupError::VerificationFailed {
            reason: status.to_string(),
        }),
        Err(e) => Err(StartupError::VerificationFailed {
            reason: e.to_string(),
        }),
    }
}
