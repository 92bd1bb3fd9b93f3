// ABOUTME: Deploy command implementation.
// ABOUTME: Runs one replacement deployment and turns its report into an exit status.

use alternator::config::{Config, Strategy};
use alternator::deploy::{DeployOptions, LocalOrchestrator, OrchestratorState};
use alternator::error::{Error, Result};
use alternator::output::Output;

/// Command-line adjustments applied on top of the configuration file.
#[derive(Debug, Default)]
pub struct DeployOverrides {
    pub strategy: Option<Strategy>,
    pub no_validate: bool,
    pub canary_percentage: Option<u8>,
    pub no_auto_rollback: bool,
}

impl DeployOverrides {
    fn apply(self, mut options: DeployOptions) -> DeployOptions {
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }
        if let Some(percentage) = self.canary_percentage {
            options.canary_percentage = percentage;
        }
        options.validate &= !self.no_validate;
        options.auto_rollback &= !self.no_auto_rollback;
        options
    }
}

pub async fn deploy(config: Config, overrides: DeployOverrides, mut output: Output) -> Result<()> {
    let orchestrator = LocalOrchestrator::local(&config)?;
    let options = overrides.apply(DeployOptions::from_config(&config));
    let mut state = OrchestratorState::with_log_dir(&config.logs_dir);

    output.start_timer();
    output.progress(&format!(
        "Deploying {} with {} (strategy: {})",
        config.app_name,
        orchestrator.lifecycle().runtime(),
        options.strategy
    ));

    let report = orchestrator.run(&mut state, options).await;

    for line in &report.log_tail {
        output.progress(&format!("  {}", line));
    }
    output.data("report", &report);

    if !report.success {
        let message = report
            .error
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(Error::DeployFailed(message));
    }

    if let Some(gap) = report.traffic_gap_seconds {
        output.progress(&format!("Main port gap: {:.2}s", gap));
    }
    output.success(&format!(
        "Deployed {} to {}",
        config.app_name, report.target_environment
    ));
    Ok(())
}
