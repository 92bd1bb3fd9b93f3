// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use alternator::config::Strategy;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "alternator")]
#[command(about = "Zero-downtime blue/green replacement deployments for Docker and Podman")]
#[command(version)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new alternator.yml configuration file
    Init {
        /// Application name used for container and image names
        #[arg(long)]
        app_name: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Build the idle environment and switch traffic to it
    Deploy {
        /// Strategy label recorded in the report
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Skip the advisory endpoint probes
        #[arg(long)]
        no_validate: bool,

        /// Canary percentage recorded in the report (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        canary_percentage: Option<u8>,

        /// Do not switch back when the traffic switch fails
        #[arg(long)]
        no_auto_rollback: bool,
    },

    /// Switch traffic back to the environment that is not active
    Rollback,

    /// Show the active environment and both environment definitions
    Status,
}
