// ABOUTME: Generic deployment attempt parameterized by state marker.
// ABOUTME: Carries the target environment and attempt options through every stage.

use crate::config::{Config, Strategy};
use crate::types::{Color, Environment};
use tokio::time::Instant;

use super::state::{Completed, Detected};
use super::switch::SwitchReport;

/// Per-attempt knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Informational; the blue-green path runs regardless.
    pub strategy: Strategy,
    /// Run the advisory endpoint probes after the health check.
    pub validate: bool,
    /// Accepted and reported, no weighted routing exists.
    pub canary_percentage: u8,
    /// Revert to the previous environment when the switch fails.
    pub auto_rollback: bool,
}

impl DeployOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.strategy,
            validate: config.validate,
            canary_percentage: config.canary_percentage,
            auto_rollback: config.auto_rollback,
        }
    }
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::BlueGreen,
            validate: true,
            canary_percentage: 0,
            auto_rollback: true,
        }
    }
}

/// A deployment attempt in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) target: Environment,
    pub(crate) detected: Option<Color>,
    pub(crate) options: DeployOptions,
    pub(crate) started: Instant,
    pub(crate) state: S,
}

impl Deployment<Detected> {
    /// Start an attempt against `target`, with `detected` serving traffic.
    pub fn new(target: Environment, detected: Option<Color>, options: DeployOptions) -> Self {
        Deployment {
            target,
            detected,
            options,
            started: Instant::now(),
            state: Detected,
        }
    }
}

impl<S> Deployment<S> {
    pub fn target(&self) -> &Environment {
        &self.target
    }

    /// Environment that was active when the attempt started.
    pub fn detected(&self) -> Option<Color> {
        self.detected
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub(crate) fn advance<T>(self, state: T) -> Deployment<T> {
        Deployment {
            target: self.target,
            detected: self.detected,
            options: self.options,
            started: self.started,
            state,
        }
    }
}

impl Deployment<Completed> {
    pub fn switch_report(&self) -> &SwitchReport {
        &self.state.0
    }
}
