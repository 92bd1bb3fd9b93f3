// ABOUTME: Entry point for the alternator CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use alternator::config::{self, Config};
use alternator::error::Result;
use alternator::output::{Output, OutputMode};
use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli.command, Output::new(mode)).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match command {
        Commands::Init { app_name, force } => {
            config::init_config(&cwd, app_name.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Deploy {
            strategy,
            no_validate,
            canary_percentage,
            no_auto_rollback,
        } => {
            let config = Config::discover(&cwd)?;
            let overrides = commands::DeployOverrides {
                strategy,
                no_validate,
                canary_percentage,
                no_auto_rollback,
            };
            commands::deploy(config, overrides, output).await
        }
        Commands::Rollback => {
            let config = Config::discover(&cwd)?;
            commands::rollback(config, output).await
        }
        Commands::Status => {
            let config = Config::discover(&cwd)?;
            commands::status(config, output).await
        }
    }
}
