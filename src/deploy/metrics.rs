// ABOUTME: Deployment counters updated on terminal outcomes.
// ABOUTME: Includes a running mean of successful deployment durations.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub deployments: u64,
    pub successful: u64,
    pub failed: u64,
    pub rollbacks: u64,
    pub avg_deployment_time_seconds: f64,
}

impl Metrics {
    pub(crate) fn record_start(&mut self) {
        self.deployments += 1;
    }

    pub(crate) fn record_success(&mut self, elapsed: Duration) {
        self.successful += 1;
        let n = self.successful as f64;
        self.avg_deployment_time_seconds +=
            (elapsed.as_secs_f64() - self.avg_deployment_time_seconds) / n;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub(crate) fn record_rollback(&mut self) {
        self.rollbacks += 1;
    }
}
