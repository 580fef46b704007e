//! Bounded readiness poll.
//!
//! # Responsibilities
//! - Probe at a fixed interval up to `max_attempts` times
//! - Stop at the first ready response
//! - Never fail: exhausting the budget is reported, not raised

use std::time::Duration;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::probe::{HealthProbe, ProbeOutcome};

/// How the poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The service answered on this (1-based) attempt.
    Ready { attempt: u32 },
    /// Every attempt failed.
    Exhausted { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

/// Poll `probe` until it reports ready or the attempt budget runs out.
///
/// `on_miss` is called after every failed attempt with the attempt number
/// and its outcome, before sleeping.
pub async fn wait_until_ready<F>(
    probe: &HealthProbe,
    config: &HealthCheckConfig,
    mut on_miss: F,
) -> Readiness
where
    F: FnMut(u32, &ProbeOutcome),
{
    let interval = Duration::from_millis(config.interval_ms);
    let max_attempts = config.max_attempts;

    tracing::info!(
        url = %probe.url(),
        interval_ms = config.interval_ms,
        max_attempts,
        "Waiting for service readiness"
    );

    for attempt in 1..=max_attempts {
        let outcome = probe.probe().await;

        if outcome.is_ready() {
            tracing::info!(attempt, max_attempts, outcome = %outcome, "Service ready");
            return Readiness::Ready { attempt };
        }

        tracing::debug!(attempt, max_attempts, outcome = %outcome, "Service not ready yet");
        on_miss(attempt, &outcome);

        if attempt < max_attempts {
            time::sleep(interval).await;
        }
    }

    tracing::warn!(
        attempts = max_attempts,
        url = %probe.url(),
        "Service did not become ready, continuing to verification"
    );
    Readiness::Exhausted {
        attempts: max_attempts,
    }
}
