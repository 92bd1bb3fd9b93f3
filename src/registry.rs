// ABOUTME: Blue/green environment registry and active-environment lookup.
// ABOUTME: Name matching is isolated behind EnvironmentLocator so it can be swapped.

use crate::config::Config;
use crate::exec::CommandRunner;
use crate::health::{HEALTH_PATH, HealthProber, HttpClient, endpoint_url};
use crate::lifecycle::Lifecycle;
use crate::types::{AppName, Color, Environment};
use async_trait::async_trait;
use std::time::Duration;

/// Static mapping from each color to its container, image, and staging port.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    app_name: AppName,
    main_port: u16,
    blue: Environment,
    green: Environment,
}

impl EnvironmentRegistry {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            main_port: config.main_port,
            blue: Environment::new(&config.app_name, Color::Blue, config.blue_port),
            green: Environment::new(&config.app_name, Color::Green, config.green_port),
        }
    }

    pub fn get(&self, color: Color) -> &Environment {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }

    pub fn environments(&self) -> [&Environment; 2] {
        [&self.blue, &self.green]
    }

    pub fn main_port(&self) -> u16 {
        self.main_port
    }

    pub fn app_name(&self) -> &AppName {
        &self.app_name
    }

    /// Color owning a `ps` output line, by container name then by color marker.
    pub fn color_of(&self, line: &str) -> Option<Color> {
        if let Some(env) = self
            .environments()
            .into_iter()
            .find(|env| line.split_whitespace().any(|tok| tok == env.container_name))
        {
            return Some(env.color);
        }

        Color::ALL
            .into_iter()
            .find(|color| line.contains(color.as_str()))
    }
}

/// Finds which color currently owns the main port.
///
/// `None` is the legitimate first-deployment answer, not an error.
#[async_trait]
pub trait EnvironmentLocator: Send + Sync {
    async fn locate_active(&self, registry: &EnvironmentRegistry) -> Option<Color>;
}

/// Locates the active environment from container names in `ps` output.
pub struct NameMatchLocator<R, H> {
    lifecycle: Lifecycle<R>,
    prober: HealthProber<H>,
    host: String,
    detect_timeout: Duration,
}

impl<R, H> NameMatchLocator<R, H> {
    pub fn new(
        lifecycle: Lifecycle<R>,
        prober: HealthProber<H>,
        host: impl Into<String>,
        detect_timeout: Duration,
    ) -> Self {
        Self {
            lifecycle,
            prober,
            host: host.into(),
            detect_timeout,
        }
    }
}

#[async_trait]
impl<R: CommandRunner, H: HttpClient> EnvironmentLocator for NameMatchLocator<R, H> {
    async fn locate_active(&self, registry: &EnvironmentRegistry) -> Option<Color> {
        let url = endpoint_url(&self.host, registry.main_port(), HEALTH_PATH);
        let verdict = self.prober.check_within(&url, self.detect_timeout).await;

        if verdict.answered_ok() {
            let publish = format!("publish={}", registry.main_port());
            let names = self.lifecycle.running(&publish, "{{.Names}}").await;
            if let Some(color) = names.iter().find_map(|name| registry.color_of(name)) {
                tracing::info!("active environment on port {}: {}", registry.main_port(), color);
                return Some(color);
            }
        } else {
            tracing::debug!("main port not answering: {}", verdict);
        }

        let app = registry.app_name().as_str();
        let filter = format!("name={}", app);
        let lines = self.lifecycle.running(&filter, "{{.Names}} {{.Ports}}").await;
        let found = lines
            .iter()
            .filter(|line| line.contains(app))
            .find_map(|line| registry.color_of(line));

        match found {
            Some(color) => tracing::info!("found running {} environment", color),
            None => tracing::info!("no active environment detected"),
        }
        found
    }
}
