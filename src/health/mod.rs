// ABOUTME: HTTP health probing for staged and live environments.
// ABOUTME: Readiness polling plus the advisory endpoint validation probes.

mod client;
mod prober;
mod validate;

pub use client::{HttpClient, HttpResponse, HyperClient, ProbeError};
pub use prober::{HealthProber, HealthVerdict, classify};
pub use validate::{EndpointCheck, VALIDATION_PROBES, ValidationProbe, ValidationReport};

/// Path of the service's health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Build `http://host:port/path`.
pub fn endpoint_url(host: &str, port: u16, path: &str) -> String {
    format!("http://{}:{}{}", host, port, path)
}
