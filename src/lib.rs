// ABOUTME: Library root for alternator - exposes the deployment core for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod health;
pub mod lifecycle;
pub mod output;
pub mod registry;
pub mod report;
pub mod runtime;
pub mod types;
