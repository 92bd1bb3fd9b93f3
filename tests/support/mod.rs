// ABOUTME: Test support utilities.
// ABOUTME: Scripted command runner, HTTP client, and locator fakes for integration tests.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use alternator::config::Config;
use alternator::exec::{CommandOutput, CommandRunner};
use alternator::health::{HttpClient, HttpResponse, ProbeError};
use alternator::registry::{EnvironmentLocator, EnvironmentRegistry};
use alternator::runtime::RuntimeType;
use alternator::types::Color;
use async_trait::async_trait;
use hyper::Method;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("alternator=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Template config writing reports and logs under `dir`, pinned to Docker.
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::template();
    config.runtime = Some(RuntimeType::Docker);
    config.reports_dir = dir.join("reports");
    config.logs_dir = dir.join("logs");
    config
}

struct Rule {
    pattern: String,
    output: CommandOutput,
    delay: Duration,
}

/// [`CommandRunner`] answering from rules matched against the joined argv.
///
/// The most recently added matching rule wins. Unmatched commands succeed
/// with empty output, which makes every container look absent.
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, output: CommandOutput, delay: Duration) -> &Self {
        self.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            output,
            delay,
        });
        self
    }

    /// Answer commands containing `pattern` with `output`.
    pub fn on(&self, pattern: &str, output: CommandOutput) -> &Self {
        self.push(pattern, output, Duration::ZERO)
    }

    /// Succeed with `stdout` for commands containing `pattern`.
    pub fn stdout(&self, pattern: &str, stdout: &str) -> &Self {
        self.on(pattern, CommandOutput::exited(0, stdout, ""))
    }

    /// Fail commands containing `pattern` with exit code 1.
    pub fn fail(&self, pattern: &str) -> &Self {
        self.on(pattern, CommandOutput::exited(1, "", "scripted failure"))
    }

    /// Succeed after `delay` for commands containing `pattern`.
    pub fn delay(&self, pattern: &str, delay: Duration) -> &Self {
        self.push(pattern, CommandOutput::exited(0, "", ""), delay)
    }

    pub fn clear(&self) {
        self.rules.lock().clear();
    }

    /// Every command run so far, argv joined by spaces.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.contains(pattern))
            .count()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, argv: &[String], timeout: Duration) -> CommandOutput {
        let joined = argv.join(" ");
        self.calls.lock().push(joined.clone());

        let (output, delay) = {
            let rules = self.rules.lock();
            rules
                .iter()
                .rev()
                .find(|rule| joined.contains(&rule.pattern))
                .map(|rule| (rule.output.clone(), rule.delay))
                .unwrap_or_else(|| (CommandOutput::exited(0, "", ""), Duration::ZERO))
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay.min(timeout)).await;
        }
        output
    }
}

enum Reply {
    Respond(u16, String),
    Refuse,
}

/// [`HttpClient`] answering from URL-substring routes; unmatched URLs refuse.
#[derive(Default)]
pub struct FakeHttp {
    routes: Mutex<Vec<(String, Reply)>>,
    calls: Mutex<Vec<(Method, String)>>,
}

pub const HEALTHY: &str = r#"{"status":"healthy","model_loaded":true}"#;
pub const LOADING: &str = r#"{"status":"starting","model_loaded":false,"model_status":"loading"}"#;

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every URL reports healthy.
    pub fn healthy() -> Self {
        let http = Self::new();
        http.respond("http://", 200, HEALTHY);
        http
    }

    pub fn respond(&self, pattern: &str, status: u16, body: &str) -> &Self {
        self.routes.lock().push((
            pattern.to_string(),
            Reply::Respond(status, body.to_string()),
        ));
        self
    }

    pub fn refuse(&self, pattern: &str) -> &Self {
        self.routes.lock().push((pattern.to_string(), Reply::Refuse));
        self
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(_, url)| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn request(
        &self,
        method: Method,
        url: &str,
        _body: Option<&serde_json::Value>,
        _timeout: Duration,
    ) -> Result<HttpResponse, ProbeError> {
        self.calls.lock().push((method, url.to_string()));

        let routes = self.routes.lock();
        match routes.iter().rev().find(|(pattern, _)| url.contains(pattern)) {
            Some((_, Reply::Respond(status, body))) => {
                Ok(HttpResponse::new(*status, body.clone()))
            }
            Some((_, Reply::Refuse)) | None => Err(ProbeError::Connect(
                std::io::ErrorKind::ConnectionRefused.into(),
            )),
        }
    }
}

/// Locator reporting a fixed active color.
pub struct FixedLocator(pub Option<Color>);

#[async_trait]
impl EnvironmentLocator for FixedLocator {
    async fn locate_active(&self, _registry: &EnvironmentRegistry) -> Option<Color> {
        self.0
    }
}
