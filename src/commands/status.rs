// ABOUTME: Status command implementation.
// ABOUTME: Prints the detected active environment and both environment definitions.

use alternator::config::Config;
use alternator::deploy::LocalOrchestrator;
use alternator::error::Result;
use alternator::output::Output;
use serde_json::json;

pub async fn status(config: Config, output: Output) -> Result<()> {
    let orchestrator = LocalOrchestrator::local(&config)?;
    let registry = orchestrator.registry();
    let active = orchestrator.locate_active().await;

    output.progress(&format!(
        "{} on {} (main port {})",
        registry.app_name(),
        orchestrator.lifecycle().runtime(),
        registry.main_port()
    ));
    for env in registry.environments() {
        let marker = if Some(env.color) == active { "*" } else { " " };
        output.progress(&format!(
            "{} {:<6} {:<30} {:<30} {}",
            marker, env.color, env.container_name, env.image_name, env.port
        ));
    }

    output.data(
        "status",
        &json!({
            "active_environment": active,
            "main_port": registry.main_port(),
            "environments": registry.environments(),
        }),
    );

    match active {
        Some(color) => output.success(&format!("Active environment: {}", color)),
        None => output.success("No active environment"),
    }
    Ok(())
}
