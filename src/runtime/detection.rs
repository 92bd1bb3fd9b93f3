// ABOUTME: Runtime detection on the local system.
// ABOUTME: Checks the Docker socket first, then rootless and rootful Podman.

use super::types::RuntimeType;
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect the container runtime on the local system.
///
/// Detection order:
/// 1. Docker socket (`/var/run/docker.sock`)
/// 2. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 3. Rootful Podman socket (`/run/podman/podman.sock`)
///
/// Docker wins when both are present because `podman-docker` shims usually
/// expose the Docker socket path as well.
pub fn detect_local() -> Option<RuntimeType> {
    if Path::new(DOCKER_SOCKET).exists() {
        return Some(RuntimeType::Docker);
    }

    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Some(RuntimeType::Podman);
        }
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        return Some(RuntimeType::Podman);
    }

    None
}

/// Explicit configuration first, then local detection, then Docker.
pub fn resolve(configured: Option<RuntimeType>) -> RuntimeType {
    configured
        .or_else(detect_local)
        .unwrap_or(RuntimeType::Docker)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
