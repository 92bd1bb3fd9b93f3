// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports the orchestrator, its caller-owned state, and the state markers.

mod deployment;
mod error;
mod log;
mod metrics;
mod orchestrator;
mod run_state;
mod state;
mod switch;
mod transitions;

pub use deployment::{DeployOptions, Deployment};
pub use error::{DeployError, DeployStage};
pub use log::{DeploymentLog, LogEntry, LogLevel};
pub use metrics::Metrics;
pub use orchestrator::{LOG_TAIL, LocalOrchestrator, Orchestrator};
pub use run_state::OrchestratorState;
pub use state::{Built, Completed, Detected, HealthChecked, Staged, Switched, Validated};
pub use switch::{SwitchPhase, SwitchReport};
pub use transitions::TransitionResult;
