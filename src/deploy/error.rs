// ABOUTME: Error types for deployment stages.
// ABOUTME: Each variant maps to the stage that produced it and ends up in the report.

use crate::types::Color;
use std::fmt;

/// Stage of the state machine that can end an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Build,
    Stage,
    HealthCheck,
    Switch,
    Rollback,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeployStage::Build => "build",
            DeployStage::Stage => "stage",
            DeployStage::HealthCheck => "health check",
            DeployStage::Switch => "switch",
            DeployStage::Rollback => "rollback",
        })
    }
}

/// Terminal failures of a deployment attempt or standalone rollback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    #[error("image build failed for {0} environment")]
    BuildFailed(Color),

    #[error("failed to start {color} environment on staging port {port}")]
    StageFailed { color: Color, port: u16 },

    #[error("{color} environment not ready after {seconds} seconds")]
    HealthCheckTimeout { color: Color, seconds: u64 },

    #[error("traffic switch to {color} failed: {reason}")]
    SwitchFailed { color: Color, reason: String },

    #[error("traffic switch to {target} failed, rolled back to {restored}")]
    RolledBack { target: Color, restored: Color },

    #[error("traffic switch to {target} failed and rollback to {previous} also failed")]
    RollbackFailed { target: Color, previous: Color },

    #[error("no previous environment recorded")]
    NoPreviousEnvironment,
}

impl DeployError {
    pub fn stage(&self) -> DeployStage {
        match self {
            DeployError::BuildFailed(_) => DeployStage::Build,
            DeployError::StageFailed { .. } => DeployStage::Stage,
            DeployError::HealthCheckTimeout { .. } => DeployStage::HealthCheck,
            DeployError::SwitchFailed { .. } => DeployStage::Switch,
            DeployError::RolledBack { .. }
            | DeployError::RollbackFailed { .. }
            | DeployError::NoPreviousEnvironment => DeployStage::Rollback,
        }
    }
}
