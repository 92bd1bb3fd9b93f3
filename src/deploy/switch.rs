// ABOUTME: Main-port hand-off between environments.
// ABOUTME: Stop old owner, stop the target's staging copy, start the target on the main port.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::exec::CommandRunner;
use crate::health::{HEALTH_PATH, HttpClient, endpoint_url};
use crate::types::Color;

use super::error::DeployError;
use super::orchestrator::Orchestrator;
use super::run_state::OrchestratorState;

/// Phases of a switch. No container holds the main port during `Gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    OldDraining,
    Gap,
    NewServing,
}

impl fmt::Display for SwitchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwitchPhase::OldDraining => "old-draining",
            SwitchPhase::Gap => "gap",
            SwitchPhase::NewServing => "new-serving",
        })
    }
}

/// Timing of a completed switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReport {
    pub from: Option<Color>,
    pub to: Color,
    /// Time spent stopping the previous owner.
    pub draining: Duration,
    /// Time between the previous owner going away and the target being started.
    pub gap: Duration,
}

impl SwitchReport {
    /// Upper bound on the window where the main port served nothing.
    pub fn unavailable(&self) -> Duration {
        self.draining + self.gap
    }
}

impl<R: CommandRunner + 'static, H: HttpClient + 'static> Orchestrator<R, H> {
    /// Move main-port ownership to `to`.
    ///
    /// Records the current owner as `previous` before anything else, and
    /// marks `to` active as soon as it is started on the main port.
    pub(crate) async fn switch_traffic(
        &self,
        state: &mut OrchestratorState,
        to: Color,
    ) -> Result<SwitchReport, DeployError> {
        let from = state.active;
        state.previous = from;
        let target = self.registry.get(to);
        let main_port = self.registry.main_port();

        state.log.info(format!(
            "switching port {} from {} to {}",
            main_port,
            from.map_or("nothing", Color::as_str),
            to
        ));

        let drain_start = Instant::now();
        if let Some(old) = from {
            state.log.info(format!("{}: stopping {}", SwitchPhase::OldDraining, old));
            if !self.lifecycle.stop(&self.registry.get(old).container_name).await {
                state
                    .log
                    .warning(format!("could not fully remove {} container", old));
            }
        }
        let draining = drain_start.elapsed();

        let gap_start = Instant::now();
        state.log.info(format!(
            "{}: restarting {} on port {}",
            SwitchPhase::Gap,
            to,
            main_port
        ));
        if !self.lifecycle.stop(&target.container_name).await {
            state.log.warning(format!(
                "could not remove staging container {}",
                target.container_name
            ));
        }

        let started = self
            .lifecycle
            .start(&target.container_name, &target.image_name, main_port)
            .await;
        let gap = gap_start.elapsed();

        if !started {
            return Err(DeployError::SwitchFailed {
                color: to,
                reason: format!("could not start container on port {}", main_port),
            });
        }

        state.active = Some(to);
        let report = SwitchReport {
            from,
            to,
            draining,
            gap,
        };
        state.log.info(format!(
            "{}: {} started, main port unavailable for {:.2}s",
            SwitchPhase::NewServing,
            to,
            report.unavailable().as_secs_f64()
        ));

        let url = endpoint_url(&self.timings.host, main_port, HEALTH_PATH);
        if !self
            .prober
            .wait_for_healthy(
                &url,
                self.timings.switch_health_timeout,
                self.timings.switch_health_interval,
            )
            .await
        {
            return Err(DeployError::SwitchFailed {
                color: to,
                reason: format!("not healthy on port {}", main_port),
            });
        }

        state
            .log
            .success(format!("traffic now served by {} on port {}", to, main_port));
        Ok(report)
    }
}
