// ABOUTME: Advisory validation probes run after a health check passes.
// ABOUTME: Any answering endpoint counts as evidence the service is alive.

use super::client::HttpClient;
use super::endpoint_url;
use super::prober::HealthProber;
use hyper::Method;
use serde_json::json;

/// One well-known endpoint to probe.
#[derive(Debug, Clone, Copy)]
pub struct ValidationProbe {
    pub path: &'static str,
    pub method: &'static str,
}

/// Probed in order; the first alive endpoint ends validation.
pub const VALIDATION_PROBES: [ValidationProbe; 3] = [
    ValidationProbe {
        path: "/health",
        method: "GET",
    },
    ValidationProbe {
        path: "/api/model/info",
        method: "GET",
    },
    ValidationProbe {
        path: "/predict",
        method: "POST",
    },
];

/// Status codes that prove an endpoint exists and is served.
const ALIVE_STATUSES: [u16; 3] = [200, 400, 422];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointCheck {
    Alive { status: u16 },
    Rejected { status: u16 },
    Unreachable(String),
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checks: Vec<(&'static str, EndpointCheck)>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks
            .iter()
            .any(|(_, check)| matches!(check, EndpointCheck::Alive { .. }))
    }
}

impl<H: HttpClient> HealthProber<H> {
    /// Probe [`VALIDATION_PROBES`] on `host:port`, stopping at the first alive one.
    pub async fn validate(&self, host: &str, port: u16) -> ValidationReport {
        let mut report = ValidationReport::default();
        let payload = json!({ "test": "validation" });

        for probe in VALIDATION_PROBES {
            let url = endpoint_url(host, port, probe.path);
            let (method, body) = if probe.method == "POST" {
                (Method::POST, Some(&payload))
            } else {
                (Method::GET, None)
            };

            let check = match self
                .client
                .request(method, &url, body, self.request_timeout())
                .await
            {
                Ok(resp) if ALIVE_STATUSES.contains(&resp.status) => {
                    EndpointCheck::Alive {
                        status: resp.status,
                    }
                }
                Ok(resp) => EndpointCheck::Rejected {
                    status: resp.status,
                },
                Err(e) => EndpointCheck::Unreachable(e.to_string()),
            };

            let alive = matches!(check, EndpointCheck::Alive { .. });
            report.checks.push((probe.path, check));
            if alive {
                break;
            }
        }

        report
    }
}
