// ABOUTME: Configuration types and parsing for alternator.yml.
// ABOUTME: Holds port assignments, timeouts, and the deployment knobs.

mod restart_policy;
mod strategy;

pub use restart_policy::RestartPolicy;
pub use strategy::Strategy;

use crate::error::{Error, Result};
use crate::exec::HARD_TIMEOUT;
use crate::runtime::RuntimeType;
use crate::types::AppName;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "alternator.yml";
pub const CONFIG_FILENAME_ALT: &str = "alternator.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".alternator/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app_name: AppName,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_main_port")]
    pub main_port: u16,

    #[serde(default = "default_blue_port")]
    pub blue_port: u16,

    #[serde(default = "default_green_port")]
    pub green_port: u16,

    /// Port the service listens on inside its container.
    #[serde(default = "default_container_port")]
    pub container_port: u16,

    #[serde(default = "default_health_timeout", with = "humantime_serde")]
    pub health_timeout: Duration,

    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub health_interval: Duration,

    #[serde(default = "default_switch_health_timeout", with = "humantime_serde")]
    pub switch_health_timeout: Duration,

    #[serde(default = "default_switch_health_interval", with = "humantime_serde")]
    pub switch_health_interval: Duration,

    #[serde(default = "default_detect_timeout", with = "humantime_serde")]
    pub detect_timeout: Duration,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default = "default_true")]
    pub validate: bool,

    #[serde(default)]
    pub canary_percentage: u8,

    #[serde(default = "default_true")]
    pub auto_rollback: bool,

    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub resources: ResourcesConfig,

    #[serde(default)]
    pub restart: RestartPolicy,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,
    #[serde(default = "default_context")]
    pub context: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dockerfile: default_dockerfile(),
            context: default_context(),
        }
    }
}

/// Resource ceilings applied uniformly to every environment container.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesConfig {
    #[serde(default = "default_memory")]
    pub memory: String,
    #[serde(default = "default_cpus")]
    pub cpus: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            memory: default_memory(),
            cpus: default_cpus(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_main_port() -> u16 {
    5000
}

fn default_blue_port() -> u16 {
    5001
}

fn default_green_port() -> u16 {
    5002
}

fn default_container_port() -> u16 {
    5000
}

fn default_health_timeout() -> Duration {
    Duration::from_secs(180)
}

fn default_health_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_switch_health_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_switch_health_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_detect_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_command_timeout() -> Duration {
    HARD_TIMEOUT
}

fn default_true() -> bool {
    true
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_context() -> String {
    ".".to_string()
}

fn default_memory() -> String {
    "2g".to_string()
}

fn default_cpus() -> String {
    "1.0".to_string()
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("deployment_reports")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("deployment_logs")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::load(path),
            None => Err(Error::ConfigNotFound(dir.to_path_buf())),
        }
    }

    /// Reject configurations the orchestrator cannot run safely.
    pub fn validate(&self) -> Result<()> {
        let ports = [
            ("main_port", self.main_port),
            ("blue_port", self.blue_port),
            ("green_port", self.green_port),
        ];
        for (i, (name, port)) in ports.iter().enumerate() {
            if *port == 0 {
                return Err(Error::InvalidConfig(format!("{} cannot be 0", name)));
            }
            if let Some((other, _)) = ports[i + 1..].iter().find(|(_, p)| p == port) {
                return Err(Error::InvalidConfig(format!(
                    "{} and {} must differ (both {})",
                    name, other, port
                )));
            }
        }

        if self.canary_percentage > 100 {
            return Err(Error::InvalidConfig(format!(
                "canary_percentage must be between 0 and 100, got {}",
                self.canary_percentage
            )));
        }

        if self.health_interval.is_zero() || self.switch_health_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "health check intervals must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Command timeout after applying the executor's hard ceiling.
    pub fn effective_command_timeout(&self) -> Duration {
        self.command_timeout.min(HARD_TIMEOUT)
    }

    pub fn template() -> Self {
        Config {
            app_name: AppName::new("flask-ml-app").expect("template name is valid"),
            host: default_host(),
            main_port: default_main_port(),
            blue_port: default_blue_port(),
            green_port: default_green_port(),
            container_port: default_container_port(),
            health_timeout: default_health_timeout(),
            health_interval: default_health_interval(),
            switch_health_timeout: default_switch_health_timeout(),
            switch_health_interval: default_switch_health_interval(),
            detect_timeout: default_detect_timeout(),
            request_timeout: default_request_timeout(),
            command_timeout: default_command_timeout(),
            strategy: Strategy::default(),
            validate: true,
            canary_percentage: 0,
            auto_rollback: true,
            runtime: None,
            build: BuildConfig::default(),
            resources: ResourcesConfig::default(),
            restart: RestartPolicy::default(),
            reports_dir: default_reports_dir(),
            logs_dir: default_logs_dir(),
        }
    }
}

pub fn init_config(dir: &Path, app_name: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();
    if let Some(name) = app_name {
        config.app_name = AppName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    std::fs::write(&config_path, generate_template_yaml(&config))?;
    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"app_name: {}
main_port: {}
blue_port: {}
green_port: {}
container_port: {}
health_timeout: 180s
strategy: blue-green
validate: true
auto_rollback: true
build:
  dockerfile: {}
  context: "{}"
resources:
  memory: {}
  cpus: "{}"
"#,
        config.app_name,
        config.main_port,
        config.blue_port,
        config.green_port,
        config.container_port,
        config.build.dockerfile,
        config.build.context,
        config.resources.memory,
        config.resources.cpus,
    )
}

fn deserialize_app_name<'de, D>(deserializer: D) -> std::result::Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}
