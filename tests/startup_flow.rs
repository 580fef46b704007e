//! Orchestrator runs against real child processes.
#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use bot_launcher::config::{CommandConfig, HealthCheckConfig, LauncherConfig, ServerConfig};
use bot_launcher::health::Readiness;
use bot_launcher::lifecycle::{Interrupt, Orchestrator, Shutdown, StartupError, StartupPhase};

mod common;

fn sh(script: &str) -> CommandConfig {
    CommandConfig::new("sh", ["-c", script])
}

/// A service that records SIGTERM in `marker` before exiting.
fn trapping_service(marker: &Path) -> CommandConfig {
    sh(&format!(
        "trap 'touch {}; exit 0' TERM; while :; do sleep 0.05; done",
        marker.display()
    ))
}

fn config_for(addr: std::net::SocketAddr, max_attempts: u32) -> LauncherConfig {
    LauncherConfig {
        server: ServerConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
        health_check: HealthCheckConfig {
            path: "/".into(),
            interval_ms: 20,
            max_attempts,
            timeout_ms: 200,
        },
        service: sh("sleep 5"),
        verify: sh("exit 0"),
        worker: sh("exit 0"),
        ..LauncherConfig::default()
    }
}

async fn wait_for_file(path: &Path) -> bool {
    for _ in 0..100 {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_verified_when_service_ready_and_verification_passes() {
    let addr = common::start_programmable_backend(|| async { (200, "ok".into()) }).await;
    let mut orchestrator = Orchestrator::new(config_for(addr, 30));

    let verified = orchestrator.prepare().await.unwrap();
    assert_eq!(verified.readiness, Readiness::Ready { attempt: 1 });
    assert_eq!(verified.worker.program, "sh");
    assert!(verified.service_pid().is_some());
    assert_eq!(orchestrator.phase(), StartupPhase::Verifying);

    verified.abort();
}

#[tokio::test]
async fn test_readiness_timeout_still_runs_verification() {
    let addr = common::unused_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let verified_marker = dir.path().join("verified");

    let mut config = config_for(addr, 3);
    config.verify = sh(&format!("touch {}", verified_marker.display()));

    let mut orchestrator = Orchestrator::new(config);
    let verified = orchestrator.prepare().await.unwrap();

    assert_eq!(verified.readiness, Readiness::Exhausted { attempts: 3 });
    assert!(verified_marker.exists(), "verification must run after exhaustion");
    verified.abort();
}

#[tokio::test]
async fn test_verification_failure_terminates_service() {
    let addr = common::unused_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("terminated");

    let mut config = config_for(addr, 5);
    config.service = trapping_service(&marker);
    config.verify = sh("exit 1");

    let mut orchestrator = Orchestrator::new(config);
    let err = orchestrator.prepare().await.unwrap_err();

    assert!(matches!(err, StartupError::VerificationFailed { .. }), "got {err}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(orchestrator.phase(), StartupPhase::Failed);
    assert!(wait_for_file(&marker).await, "service should receive SIGTERM");
}

#[tokio::test]
async fn test_verification_failure_with_service_already_gone() {
    let addr = common::unused_addr().await;
    let mut config = config_for(addr, 3);
    config.service = sh("exit 0");
    config.verify = sh("exit 7");

    let mut orchestrator = Orchestrator::new(config);
    let err = orchestrator.prepare().await.unwrap_err();

    match err {
        StartupError::VerificationFailed { reason } => assert!(reason.contains('7'), "{reason}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_verification_program_counts_as_failure() {
    let addr = common::unused_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("terminated");

    let mut config = config_for(addr, 5);
    config.service = trapping_service(&marker);
    config.verify = CommandConfig::new("definitely-not-a-real-binary-4821", Vec::<String>::new());

    let mut orchestrator = Orchestrator::new(config);
    let err = orchestrator.prepare().await.unwrap_err();

    assert!(matches!(err, StartupError::VerificationFailed { .. }), "got {err}");
    assert!(wait_for_file(&marker).await);
}

#[tokio::test]
async fn test_service_launch_failure_propagates() {
    let addr = common::unused_addr().await;
    let mut config = config_for(addr, 3);
    config.service = CommandConfig::new("definitely-not-a-real-binary-4821", Vec::<String>::new());

    let mut orchestrator = Orchestrator::new(config);
    let err = orchestrator.prepare().await.unwrap_err();

    assert!(matches!(err, StartupError::Launch(_)), "got {err}");
    assert_eq!(orchestrator.phase(), StartupPhase::Failed);
}

#[tokio::test]
async fn test_interrupt_during_polling_stops_service() {
    let addr = common::unused_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("terminated");

    let mut config = config_for(addr, 1_000);
    config.service = trapping_service(&marker);

    let shutdown = Shutdown::new();
    let mut orchestrator = Orchestrator::new(config).with_shutdown(shutdown.subscribe());

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger(Interrupt::Terminate);
    });

    let err = orchestrator.prepare().await.unwrap_err();
    match &err {
        StartupError::Interrupted { phase, signal } => {
            assert_eq!(*phase, StartupPhase::PollingHealth);
            assert_eq!(*signal, Interrupt::Terminate);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 143);
    assert!(wait_for_file(&marker).await);
}

#[tokio::test]
async fn test_interrupt_after_verification_blocks_handoff() {
    let addr = common::start_programmable_backend(|| async { (200, "ok".into()) }).await;
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("terminated");

    let mut config = config_for(addr, 30);
    config.service = trapping_service(&marker);
    // Gives the service time to install its trap.
    config.verify = sh("sleep 0.3");

    let shutdown = Shutdown::new();
    let mut orchestrator = Orchestrator::new(config).with_shutdown(shutdown.subscribe());

    let verified = orchestrator.prepare().await.unwrap();
    shutdown.trigger(Interrupt::Interrupt);

    let err = orchestrator.confirm(verified).unwrap_err();
    assert!(
        matches!(
            err,
            StartupError::Interrupted {
                phase: StartupPhase::Verifying,
                signal: Interrupt::Interrupt,
            }
        ),
        "got {err}"
    );
    assert_eq!(err.exit_code(), 130);
    assert_eq!(orchestrator.phase(), StartupPhase::Failed);
    assert!(wait_for_file(&marker).await);
}

#[tokio::test]
async fn test_confirm_without_interrupt_keeps_service() {
    let addr = common::start_programmable_backend(|| async { (200, "ok".into()) }).await;
    let shutdown = Shutdown::new();
    let mut orchestrator =
        Orchestrator::new(config_for(addr, 30)).with_shutdown(shutdown.subscribe());

    let verified = orchestrator.prepare().await.unwrap();
    let verified = orchestrator.confirm(verified).unwrap();
    assert!(verified.service_pid().is_some());
    assert_eq!(orchestrator.phase(), StartupPhase::Verifying);
    verified.abort();
}

#[tokio::test]
async fn test_service_sees_rendered_bind_address() {
    let addr = common::unused_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let seen = dir.path().join("seen");

    let mut config = config_for(addr, 5);
    config.service = CommandConfig::new(
        "sh",
        [
            "-c".to_string(),
            format!(
                concat!(
                    "printf '%s %s:%s\\n' \"$1\" \"$SERVER_HOST\" \"$SERVER_PORT\" > {0}.tmp",
                    " && mv {0}.tmp {0}; sleep 5"
                ),
                seen.display()
            ),
            "service".to_string(),
            "--port={port}".to_string(),
        ],
    );

    let mut orchestrator = Orchestrator::new(config);
    let verified = orchestrator.prepare().await.unwrap();

    assert!(wait_for_file(&seen).await);
    verified.abort();

    let contents = std::fs::read_to_string(&seen).unwrap();
    assert_eq!(
        contents.trim(),
        format!("--port={} 127.0.0.1:{}", addr.port(), addr.port())
    );
}
