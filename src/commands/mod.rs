// ABOUTME: Command module aggregator for the alternator CLI.
// ABOUTME: Re-exports deploy, rollback, and status command handlers.

mod deploy;
mod rollback;
mod status;

pub use deploy::{DeployOverrides, deploy};
pub use rollback::rollback;
pub use status::status;
