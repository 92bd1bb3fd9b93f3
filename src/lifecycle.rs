// ABOUTME: Container lifecycle commands for blue/green environments.
// ABOUTME: Build, start, stop, and prune through the runtime CLI; failures are booleans.

use crate::config::{Config, RestartPolicy};
use crate::exec::{CommandOutput, CommandRunner};
use crate::runtime::{self, RuntimeType};
use crate::types::Environment;
use std::sync::Arc;
use std::time::Duration;

/// Issues container runtime commands through a [`CommandRunner`].
#[derive(Debug)]
pub struct Lifecycle<R> {
    runner: Arc<R>,
    runtime: RuntimeType,
    container_port: u16,
    restart: RestartPolicy,
    memory: String,
    cpus: String,
    dockerfile: String,
    context: String,
    command_timeout: Duration,
}

impl<R> Clone for Lifecycle<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            runtime: self.runtime,
            container_port: self.container_port,
            restart: self.restart.clone(),
            memory: self.memory.clone(),
            cpus: self.cpus.clone(),
            dockerfile: self.dockerfile.clone(),
            context: self.context.clone(),
            command_timeout: self.command_timeout,
        }
    }
}

impl<R: CommandRunner> Lifecycle<R> {
    pub fn from_config(runner: Arc<R>, config: &Config) -> Self {
        Self {
            runner,
            runtime: runtime::resolve(config.runtime),
            container_port: config.container_port,
            restart: config.restart.clone(),
            memory: config.resources.memory.clone(),
            cpus: config.resources.cpus.clone(),
            dockerfile: config.build.dockerfile.clone(),
            context: config.build.context.clone(),
            command_timeout: config.effective_command_timeout(),
        }
    }

    pub fn runtime(&self) -> RuntimeType {
        self.runtime
    }

    async fn runtime_cmd(&self, args: &[&str]) -> CommandOutput {
        let argv: Vec<String> = std::iter::once(self.runtime.binary())
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        self.runner.run(&argv, self.command_timeout).await
    }

    /// Build the environment's image. Succeeds iff the build exits zero.
    pub async fn build(&self, env: &Environment) -> bool {
        tracing::info!("building image {}", env.image_name);
        let out = self
            .runtime_cmd(&[
                "build",
                "-t",
                env.image_name.as_str(),
                "-f",
                self.dockerfile.as_str(),
                self.context.as_str(),
            ])
            .await;

        if !out.success {
            tracing::error!(
                exit_code = out.exit_code,
                "build of {} failed: {}",
                env.image_name,
                out.stderr
            );
        }
        out.success
    }

    /// Whether a container with exactly this name exists (running or not).
    ///
    /// `None` when the runtime could not be queried.
    pub async fn exists(&self, container: &str) -> Option<bool> {
        let filter = format!("name={}", container);
        let out = self
            .runtime_cmd(&["ps", "-a", "--filter", filter.as_str(), "--format", "{{.Names}}"])
            .await;
        out.success.then(|| out.lines().any(|name| name == container))
    }

    /// Stop and remove a container. Idempotent: a missing container is a no-op.
    ///
    /// Tries a graceful stop, then a kill, then removes. Returns false only
    /// when the removal itself fails.
    pub async fn stop(&self, container: &str) -> bool {
        match self.exists(container).await {
            Some(false) => {
                tracing::debug!("container {} does not exist", container);
                return true;
            }
            Some(true) => {}
            None => tracing::warn!(
                "could not check whether {} exists; stopping anyway",
                container
            ),
        }

        let stop = self.runtime_cmd(&["stop", container]).await;
        if !stop.success {
            tracing::warn!(
                "graceful stop of {} failed ({}), killing",
                container,
                stop.stderr
            );
            let kill = self.runtime_cmd(&["kill", container]).await;
            if !kill.success {
                tracing::warn!("kill of {} failed: {}", container, kill.stderr);
            }
        }

        let rm = self.runtime_cmd(&["rm", container]).await;
        if rm.success {
            tracing::info!("container {} removed", container);
        } else {
            tracing::error!("failed to remove {}: {}", container, rm.stderr);
        }
        rm.success
    }

    /// Run `image` detached as `container`, publishing `host_port`.
    ///
    /// Does not wait for readiness.
    pub async fn start(&self, container: &str, image: &str, host_port: u16) -> bool {
        let publish = format!("{}:{}", host_port, self.container_port);
        let restart = self.restart.to_string();
        let memory = format!("--memory={}", self.memory);
        let cpus = format!("--cpus={}", self.cpus);

        tracing::info!("starting {} from {} on port {}", container, image, host_port);
        let out = self
            .runtime_cmd(&[
                "run",
                "-d",
                "--name",
                container,
                "-p",
                publish.as_str(),
                "--restart",
                restart.as_str(),
                memory.as_str(),
                cpus.as_str(),
                image,
            ])
            .await;

        if !out.success {
            tracing::error!("failed to start {}: {}", container, out.stderr);
        }
        out.success
    }

    /// Remove stopped containers and dangling images. Best effort.
    pub async fn prune(&self) -> bool {
        let containers = self.runtime_cmd(&["container", "prune", "-f"]).await;
        let images = self.runtime_cmd(&["image", "prune", "-f"]).await;
        containers.success && images.success
    }

    /// Lines of `ps` output for running containers matching `filter`.
    ///
    /// Empty when the runtime could not be queried.
    pub async fn running(&self, filter: &str, format: &str) -> Vec<String> {
        let out = self
            .runtime_cmd(&["ps", "--filter", filter, "--format", format])
            .await;
        if !out.success {
            return Vec::new();
        }
        out.lines().map(str::to_string).collect()
    }
}
