// ABOUTME: Orchestrator driving one replacement deployment through its states.
// ABOUTME: Owns the collaborators; callers own the OrchestratorState.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::exec::{CommandRunner, ProcessExecutor};
use crate::health::{HealthProber, HttpClient, HyperClient};
use crate::lifecycle::Lifecycle;
use crate::registry::{EnvironmentLocator, EnvironmentRegistry, NameMatchLocator};
use crate::report::{DeploymentReport, Reporter};
use crate::types::Color;

use super::deployment::{DeployOptions, Deployment};
use super::error::DeployError;
use super::run_state::OrchestratorState;
use super::state::{Completed, Detected, Validated};

/// Number of log entries carried into each report.
pub const LOG_TAIL: usize = 20;

/// Host and wait budgets used by the health-gated stages.
#[derive(Debug, Clone)]
pub(crate) struct Timings {
    pub(crate) host: String,
    pub(crate) health_timeout: Duration,
    pub(crate) health_interval: Duration,
    pub(crate) switch_health_timeout: Duration,
    pub(crate) switch_health_interval: Duration,
}

impl Timings {
    fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            health_timeout: config.health_timeout,
            health_interval: config.health_interval,
            switch_health_timeout: config.switch_health_timeout,
            switch_health_interval: config.switch_health_interval,
        }
    }
}

/// Drives blue/green replacement deployments.
pub struct Orchestrator<R, H> {
    pub(crate) registry: EnvironmentRegistry,
    pub(crate) lifecycle: Lifecycle<R>,
    pub(crate) prober: HealthProber<H>,
    pub(crate) timings: Timings,
    locator: Box<dyn EnvironmentLocator>,
    reporter: Reporter,
}

/// Orchestrator wired to local processes and real HTTP.
pub type LocalOrchestrator = Orchestrator<ProcessExecutor, HyperClient>;

impl LocalOrchestrator {
    pub fn local(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(ProcessExecutor), Arc::new(HyperClient))
    }
}

impl<R: CommandRunner + 'static, H: HttpClient + 'static> Orchestrator<R, H> {
    /// Wire an orchestrator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration is rejected.
    pub fn new(config: &Config, runner: Arc<R>, http: Arc<H>) -> Result<Self> {
        config.validate()?;

        let lifecycle = Lifecycle::from_config(runner, config);
        let prober = HealthProber::new(http, config.request_timeout);
        let locator = NameMatchLocator::new(
            lifecycle.clone(),
            prober.clone(),
            config.host.clone(),
            config.detect_timeout,
        );

        Ok(Self {
            registry: EnvironmentRegistry::from_config(config),
            lifecycle,
            prober,
            timings: Timings::from_config(config),
            locator: Box::new(locator),
            reporter: Reporter::new(&config.reports_dir),
        })
    }

    /// Replace the active-environment lookup.
    pub fn with_locator(mut self, locator: impl EnvironmentLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    pub fn lifecycle(&self) -> &Lifecycle<R> {
        &self.lifecycle
    }

    /// Which color owns the main port right now, without touching state.
    pub async fn locate_active(&self) -> Option<Color> {
        self.locator.locate_active(&self.registry).await
    }

    /// Detect the active environment and record it in `state`.
    pub async fn detect_active(&self, state: &mut OrchestratorState) -> Option<Color> {
        let active = self.locate_active().await;
        state.active = active;
        match active {
            Some(color) => state.log.info(format!("active environment: {}", color)),
            None => state.log.info("no active environment, first deployment"),
        }
        active
    }

    /// Run one deployment attempt and return `true` on success.
    pub async fn deploy_with_replacement(
        &self,
        state: &mut OrchestratorState,
        options: DeployOptions,
    ) -> bool {
        self.run(state, options).await.success
    }

    /// Run one deployment attempt to a terminal outcome and record its report.
    pub async fn run(
        &self,
        state: &mut OrchestratorState,
        options: DeployOptions,
    ) -> DeploymentReport {
        state.metrics.record_start();
        state.log.info(format!(
            "starting replacement deployment of {} (strategy: {})",
            self.registry.app_name(),
            options.strategy
        ));
        if !options.strategy.is_implemented() {
            state.log.warning(format!(
                "strategy {} has no implementation, using blue-green",
                options.strategy
            ));
        }
        if options.canary_percentage > 0 {
            state.log.warning(format!(
                "canary percentage {}% ignored, traffic moves all at once",
                options.canary_percentage
            ));
        }

        let detected = self.detect_active(state).await;
        let target = self.registry.get(Color::target_for(detected)).clone();
        state.log.info(format!("target environment: {}", target.color));

        let deployment = Deployment::<Detected>::new(target, detected, options.clone());
        let started = deployment.started();
        let target_color = deployment.target().color;

        let outcome = self.drive(deployment, state).await;
        let elapsed = started.elapsed();

        let (error, traffic_gap) = match &outcome {
            Ok(done) => {
                state.metrics.record_success(elapsed);
                state.log.success(format!(
                    "deployment complete in {:.2}s, {} is live",
                    elapsed.as_secs_f64(),
                    target_color
                ));
                (None, Some(done.switch_report().unavailable()))
            }
            Err(e) => {
                state.metrics.record_failure();
                tracing::debug!(stage = %e.stage(), "deployment attempt ended");
                state.log.error(format!("deployment failed: {}", e));
                (Some(e.to_string()), None)
            }
        };

        let report = DeploymentReport::new(
            target_color,
            &options,
            elapsed,
            error,
            traffic_gap,
            state,
            LOG_TAIL,
        );
        self.reporter.record(&report);
        report
    }

    async fn drive(
        &self,
        deployment: Deployment<Detected>,
        state: &mut OrchestratorState,
    ) -> std::result::Result<Deployment<Completed>, DeployError> {
        let validated = deployment
            .build(self, state)
            .await?
            .stage(self, state)
            .await?
            .health_check(self, state)
            .await?
            .validate(self, state)
            .await;

        match validated.switch(self, state).await {
            Ok(switched) => Ok(switched.cleanup(self, state).await),
            Err((failed, error)) => Err(self.recover(failed, error, state).await),
        }
    }

    /// Decide the outcome of a failed switch, rolling back at most once.
    async fn recover(
        &self,
        failed: Deployment<Validated>,
        error: DeployError,
        state: &mut OrchestratorState,
    ) -> DeployError {
        state.log.error(error.to_string());

        let target = failed.target().color;
        let previous = match state.previous {
            Some(previous) if failed.options().auto_rollback => previous,
            _ => {
                tracing::debug!(
                    auto_rollback = failed.options().auto_rollback,
                    previous = ?state.previous,
                    "switch failure is terminal"
                );
                return error;
            }
        };

        if self.perform_rollback(state).await {
            DeployError::RolledBack {
                target,
                restored: previous,
            }
        } else {
            DeployError::RollbackFailed { target, previous }
        }
    }

    /// Switch the main port back to `state.previous`.
    ///
    /// Returns `false` when no previous environment is recorded or the switch
    /// back fails. Counts a rollback only on success.
    pub async fn perform_rollback(&self, state: &mut OrchestratorState) -> bool {
        let Some(previous) = state.previous else {
            state.log.error(DeployError::NoPreviousEnvironment.to_string());
            return false;
        };

        state.log.warning(format!("rolling back to {}", previous));
        match self.switch_traffic(state, previous).await {
            Ok(_) => {
                state.metrics.record_rollback();
                state
                    .log
                    .success(format!("rollback to {} complete", previous));
                true
            }
            Err(e) => {
                state
                    .log
                    .error(format!("rollback to {} failed: {}", previous, e));
                false
            }
        }
    }
}
