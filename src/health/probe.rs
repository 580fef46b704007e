//! Single readiness probe.
//!
//! # Responsibilities
//! - Build the probe URL from the server bind address
//! - Issue one GET with a deadline
//! - Classify the result

use std::fmt;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

use crate::config::{HealthCheckConfig, ServerConfig};
use crate::health::ProbeError;

/// Result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Any status below 400.
    Ready(StatusCode),
    /// 4xx or 5xx.
    ErrorStatus(StatusCode),
    /// Connection refused, reset, malformed response...
    Transport(String),
    /// No response within the per-attempt deadline.
    TimedOut,
}

impl ProbeOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_client_error() || status.is_server_error() {
            ProbeOutcome::ErrorStatus(status)
        } else {
            ProbeOutcome::Ready(status)
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeOutcome::Ready(_))
    }

    /// Response status, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProbeOutcome::Ready(status) | ProbeOutcome::ErrorStatus(status) => Some(*status),
            ProbeOutcome::Transport(_) | ProbeOutcome::TimedOut => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Ready(status) => write!(f, "ready ({})", status),
            ProbeOutcome::ErrorStatus(status) => write!(f, "error status {}", status),
            ProbeOutcome::Transport(e) => write!(f, "connection error: {}", e),
            ProbeOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Build `http://<host>:<port><path>`. IPv6 literals are bracketed.
///
/// `path` may carry a query string. Fragments are never sent, so one is an
/// error.
pub fn health_url(host: &str, port: u16, path: &str) -> Result<Url, ProbeError> {
    if path.contains('#') {
        return Err(ProbeError::InvalidUrl(format!(
            "health path {:?} contains a fragment",
            path
        )));
    }

    let host = host.trim();
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };

    let mut url = Url::parse(&format!("http://{}", authority))
        .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", authority, e)))?;
    match path.split_once('?') {
        Some((path, query)) => {
            url.set_path(path);
            url.set_query(Some(query));
        }
        None => url.set_path(path),
    }
    Ok(url)
}

/// HTTP prober for the service's health endpoint.
pub struct HealthProbe {
    client: Client<HttpConnector, Body>,
    url: Url,
    uri: Uri,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(server: &ServerConfig, config: &HealthCheckConfig) -> Result<Self, ProbeError> {
        let url = health_url(&server.host, server.port, &config.path)?;
        Self::for_url(url, Duration::from_millis(config.timeout_ms))
    }

    pub fn for_url(url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", url, e)))?;

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        Ok(Self {
            client,
            url,
            uri,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one GET and classify the result.
    pub async fn probe(&self) -> ProbeOutcome {
        let request = match Request::builder()
            .method("GET")
            .uri(self.uri.clone())
            .header("user-agent", "bot-launcher-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => return ProbeOutcome::Transport(e.to_string()),
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => ProbeOutcome::from_status(response.status()),
            Ok(Err(e)) => ProbeOutcome::Transport(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }
}
