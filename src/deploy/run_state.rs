// ABOUTME: Orchestrator state owned by the caller across deployments.
// ABOUTME: Active/previous environments, the deployment log, and metrics.

use super::log::DeploymentLog;
use super::metrics::Metrics;
use crate::types::Color;
use std::path::PathBuf;

/// Mutable state threaded through every deployment and rollback.
///
/// Passed by `&mut` into the orchestrator so independent instances never
/// share anything.
#[derive(Debug, Default)]
pub struct OrchestratorState {
    /// Environment owning the main port.
    pub active: Option<Color>,
    /// Environment active before the most recent switch attempt.
    pub previous: Option<Color>,
    pub log: DeploymentLog,
    pub metrics: Metrics,
}

impl OrchestratorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose log is also appended to daily files in `dir`.
    pub fn with_log_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            log: DeploymentLog::with_dir(dir),
            ..Self::default()
        }
    }

    /// Seed state in a fresh process from a detected active environment.
    ///
    /// The opposite color becomes the rollback target since its image is
    /// still tagged locally after cleanup.
    pub fn resume(mut self, active: Option<Color>) -> Self {
        self.active = active;
        self.previous = active.map(Color::other);
        self
    }
}
