// ABOUTME: Readiness polling against a service health endpoint.
// ABOUTME: Fixed-interval loop bounded by a caller-supplied timeout.

use super::client::{HttpClient, HttpResponse};
use hyper::Method;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Classification of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthVerdict {
    /// `status == "healthy"`.
    Healthy,
    /// `model_status == "ready"`; an alternate success signal.
    ModelReady,
    /// `model_status == "loading"`.
    Loading,
    /// Answered, but with no readiness signal or a non-200 status.
    Pending { status: u16 },
    /// No HTTP exchange completed.
    Unreachable(String),
}

impl HealthVerdict {
    pub fn is_ready(&self) -> bool {
        matches!(self, HealthVerdict::Healthy | HealthVerdict::ModelReady)
    }

    /// Whether the endpoint answered with HTTP 200, ready or not.
    pub fn answered_ok(&self) -> bool {
        match self {
            HealthVerdict::Healthy | HealthVerdict::ModelReady | HealthVerdict::Loading => true,
            HealthVerdict::Pending { status } => *status == 200,
            HealthVerdict::Unreachable(_) => false,
        }
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthVerdict::Healthy => f.write_str("healthy"),
            HealthVerdict::ModelReady => f.write_str("model ready"),
            HealthVerdict::Loading => f.write_str("model loading"),
            HealthVerdict::Pending { status } => write!(f, "not ready (HTTP {})", status),
            HealthVerdict::Unreachable(reason) => write!(f, "unreachable ({})", reason),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: Option<String>,
    model_status: Option<String>,
}

/// Classify a health endpoint response.
pub fn classify(response: &HttpResponse) -> HealthVerdict {
    let pending = HealthVerdict::Pending {
        status: response.status,
    };
    if response.status != 200 {
        return pending;
    }

    let Ok(body) = serde_json::from_slice::<HealthBody>(&response.body) else {
        return pending;
    };

    if body.status.as_deref() == Some("healthy") {
        return HealthVerdict::Healthy;
    }

    match body.model_status.as_deref() {
        Some("ready") => HealthVerdict::ModelReady,
        Some("loading") => HealthVerdict::Loading,
        _ => pending,
    }
}

/// Polls health endpoints through an [`HttpClient`].
#[derive(Debug)]
pub struct HealthProber<H> {
    pub(crate) client: Arc<H>,
    request_timeout: Duration,
}

impl<H> Clone for HealthProber<H> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            request_timeout: self.request_timeout,
        }
    }
}

impl<H: HttpClient> HealthProber<H> {
    pub fn new(client: Arc<H>, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Probe once with the default request timeout.
    pub async fn check(&self, url: &str) -> HealthVerdict {
        self.check_within(url, self.request_timeout).await
    }

    /// Probe once with an explicit request timeout.
    pub async fn check_within(&self, url: &str, timeout: Duration) -> HealthVerdict {
        match self.client.request(Method::GET, url, None, timeout).await {
            Ok(response) => classify(&response),
            Err(e) => HealthVerdict::Unreachable(e.to_string()),
        }
    }

    /// Poll `url` every `interval` until it reports ready or `timeout` elapses.
    ///
    /// Never returns later than `timeout` plus scheduling slack: individual
    /// requests and sleeps are clipped to the remaining budget.
    pub async fn wait_for_healthy(&self, url: &str, timeout: Duration, interval: Duration) -> bool {
        tracing::info!("waiting up to {:?} for {} to become ready", timeout, url);
        let start = Instant::now();

        while start.elapsed() < timeout {
            let remaining = timeout.saturating_sub(start.elapsed());
            let verdict = self
                .check_within(url, self.request_timeout.min(remaining))
                .await;

            if verdict.is_ready() {
                tracing::info!("{} is ready ({})", url, verdict);
                return true;
            }

            tracing::debug!(
                elapsed = start.elapsed().as_secs(),
                budget = timeout.as_secs(),
                "{}: {}",
                url,
                verdict
            );

            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(interval.min(remaining)).await;
        }

        tracing::warn!("{} not ready after {:?}", url, timeout);
        false
    }
}
