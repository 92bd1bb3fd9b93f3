// ABOUTME: Deployment report records and their on-disk rendering.
// ABOUTME: One JSON record and one HTML page per attempt, named by timestamp.

mod html;
mod writer;

pub use html::render_html;
pub use writer::{ReportError, Reporter};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

use crate::config::Strategy;
use crate::deploy::{DeployOptions, Metrics, OrchestratorState};
use crate::types::Color;

/// Immutable summary of one deployment attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub timestamp: DateTime<Local>,
    pub target_environment: Color,
    pub strategy: Strategy,
    pub canary_percentage: u8,
    pub host: String,
    /// Wall-clock duration, rounded to two decimals.
    pub duration_seconds: f64,
    pub success: bool,
    pub error: Option<String>,
    pub active_environment: Option<Color>,
    pub previous_environment: Option<Color>,
    pub metrics: Metrics,
    /// Upper bound on main-port unavailability during a successful switch.
    pub traffic_gap_seconds: Option<f64>,
    pub log_tail: Vec<String>,
}

impl DeploymentReport {
    /// Snapshot `state` at the end of an attempt.
    pub fn new(
        target: Color,
        options: &DeployOptions,
        elapsed: Duration,
        error: Option<String>,
        traffic_gap: Option<Duration>,
        state: &OrchestratorState,
        tail: usize,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            target_environment: target,
            strategy: options.strategy,
            canary_percentage: options.canary_percentage,
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            duration_seconds: round2(elapsed.as_secs_f64()),
            success: error.is_none(),
            error,
            active_environment: state.active,
            previous_environment: state.previous,
            metrics: state.metrics.clone(),
            traffic_gap_seconds: traffic_gap.map(|gap| round2(gap.as_secs_f64())),
            log_tail: state.log.tail(tail).iter().map(|e| e.to_string()).collect(),
        }
    }

    /// `deploy_YYYYMMDD_HHMMSS_mmm`, shared by the JSON and HTML files.
    pub fn file_stem(&self) -> String {
        format!("deploy_{}", self.timestamp.format("%Y%m%d_%H%M%S_%3f"))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
