// ABOUTME: Container runtime selection for Docker and Podman.
// ABOUTME: Picks the CLI binary the lifecycle commands are issued through.

mod detection;
mod types;

pub use detection::{detect_local, resolve};
pub use types::RuntimeType;
