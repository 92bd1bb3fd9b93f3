// ABOUTME: State transition methods for a replacement deployment.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::exec::CommandRunner;
use crate::health::{HEALTH_PATH, HttpClient, endpoint_url};

use super::deployment::Deployment;
use super::error::DeployError;
use super::orchestrator::Orchestrator;
use super::run_state::OrchestratorState;
use super::state::{Built, Completed, Detected, HealthChecked, Staged, Switched, Validated};

/// Result type for transitions that hand the deployment back on failure.
pub type TransitionResult<T, S> = Result<Deployment<T>, (Deployment<S>, DeployError)>;

// =============================================================================
// Detected -> Built
// =============================================================================

impl Deployment<Detected> {
    /// Build the target environment's image.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::BuildFailed` if the build command exits non-zero.
    pub async fn build<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> Result<Deployment<Built>, DeployError>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        state
            .log
            .info(format!("building image {}", self.target.image_name));

        if !orch.lifecycle.build(&self.target).await {
            return Err(DeployError::BuildFailed(self.target.color));
        }

        state
            .log
            .success(format!("image {} built", self.target.image_name));
        Ok(self.advance(Built))
    }
}

// =============================================================================
// Built -> Staged
// =============================================================================

impl Deployment<Built> {
    /// Start the target on its own staging port, replacing any stale container.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::StageFailed` if the container cannot be started.
    pub async fn stage<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> Result<Deployment<Staged>, DeployError>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        let env = &self.target;
        if !orch.lifecycle.stop(&env.container_name).await {
            state.log.warning(format!(
                "stale container {} could not be removed",
                env.container_name
            ));
        }

        state.log.info(format!(
            "starting {} on staging port {}",
            env.container_name, env.port
        ));
        if !orch
            .lifecycle
            .start(&env.container_name, &env.image_name, env.port)
            .await
        {
            return Err(DeployError::StageFailed {
                color: env.color,
                port: env.port,
            });
        }

        Ok(self.advance(Staged))
    }
}

// =============================================================================
// Staged -> HealthChecked
// =============================================================================

impl Deployment<Staged> {
    /// Wait for the staged target to report ready.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::HealthCheckTimeout` when the budget runs out. The
    /// staged container is left running for inspection.
    pub async fn health_check<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> Result<Deployment<HealthChecked>, DeployError>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        let timings = &orch.timings;
        let url = endpoint_url(&timings.host, self.target.port, HEALTH_PATH);
        state.log.info(format!(
            "waiting up to {}s for {} on port {}",
            timings.health_timeout.as_secs(),
            self.target.color,
            self.target.port
        ));

        if !orch
            .prober
            .wait_for_healthy(&url, timings.health_timeout, timings.health_interval)
            .await
        {
            return Err(DeployError::HealthCheckTimeout {
                color: self.target.color,
                seconds: timings.health_timeout.as_secs(),
            });
        }

        state
            .log
            .success(format!("{} environment is healthy", self.target.color));
        Ok(self.advance(HealthChecked))
    }
}

// =============================================================================
// HealthChecked -> Validated
// =============================================================================

impl Deployment<HealthChecked> {
    /// Run the advisory endpoint probes. Never fails.
    pub async fn validate<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> Deployment<Validated>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        if !self.options.validate {
            state.log.info("endpoint validation skipped");
            return self.advance(Validated);
        }

        let report = orch
            .prober
            .validate(&orch.timings.host, self.target.port)
            .await;
        for (path, check) in &report.checks {
            tracing::debug!("validation {}: {:?}", path, check);
        }

        if report.passed() {
            state.log.success("endpoint validation passed");
        } else {
            state
                .log
                .warning("endpoint validation inconclusive, continuing");
        }
        self.advance(Validated)
    }
}

// =============================================================================
// Validated -> Switched
// =============================================================================

impl Deployment<Validated> {
    /// Hand the main port to the target.
    ///
    /// # Errors
    ///
    /// Returns the deployment alongside `DeployError::SwitchFailed` so the
    /// caller can decide whether to roll back.
    pub async fn switch<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> TransitionResult<Switched, Validated>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        match orch.switch_traffic(state, self.target.color).await {
            Ok(report) => Ok(self.advance(Switched(report))),
            Err(e) => Err((self, e)),
        }
    }
}

// =============================================================================
// Switched -> Completed
// =============================================================================

impl Deployment<Switched> {
    /// Prune stopped containers and dangling images. Best effort.
    pub async fn cleanup<R, H>(
        self,
        orch: &Orchestrator<R, H>,
        state: &mut OrchestratorState,
    ) -> Deployment<Completed>
    where
        R: CommandRunner + 'static,
        H: HttpClient + 'static,
    {
        if orch.lifecycle.prune().await {
            state.log.info("pruned stopped containers and dangling images");
        } else {
            state.log.warning("cleanup incomplete");
        }

        let Switched(report) = self.state.clone();
        self.advance(Completed(report))
    }
}
