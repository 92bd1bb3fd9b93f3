// ABOUTME: Rollback command implementation.
// ABOUTME: Switches the main port back to the environment that is not active.

use alternator::config::Config;
use alternator::deploy::{LocalOrchestrator, OrchestratorState};
use alternator::error::{Error, Result};
use alternator::output::Output;

pub async fn rollback(config: Config, mut output: Output) -> Result<()> {
    let orchestrator = LocalOrchestrator::local(&config)?;
    output.start_timer();

    let Some(active) = orchestrator.locate_active().await else {
        return Err(Error::RollbackFailed(
            "no active environment detected".to_string(),
        ));
    };

    let mut state = OrchestratorState::with_log_dir(&config.logs_dir).resume(Some(active));
    output.progress(&format!(
        "Rolling back {} from {} to {}",
        config.app_name,
        active,
        active.other()
    ));

    let restored = orchestrator.perform_rollback(&mut state).await;
    for entry in state.log.entries() {
        output.progress(&format!("  {}", entry));
    }

    if !restored {
        return Err(Error::RollbackFailed(format!(
            "could not restore {}",
            active.other()
        )));
    }

    output.success(&format!("Rolled back to {}", active.other()));
    Ok(())
}
