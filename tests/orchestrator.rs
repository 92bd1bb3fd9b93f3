// ABOUTME: Integration tests for the deployment orchestrator state machine.
// ABOUTME: Drives full deployments against scripted runtime and HTTP fakes.

mod support;

use alternator::deploy::{DeployOptions, Orchestrator, OrchestratorState};
use alternator::lifecycle::Lifecycle;
use alternator::types::Color;
use std::sync::Arc;
use std::time::Duration;
use support::{FakeHttp, FakeRunner, FixedLocator, test_config};
use tokio::time::Instant;

const MAIN_RUN: &str = "-p 5000:5000";
const GREEN_MAIN_RUN: &str = "run -d --name flask-ml-app-green -p 5000:5000";
const BLUE_MAIN_RUN: &str = "run -d --name flask-ml-app-blue -p 5000:5000";

struct Harness {
    _dir: tempfile::TempDir,
    runner: Arc<FakeRunner>,
    http: Arc<FakeHttp>,
    orchestrator: Orchestrator<FakeRunner, FakeHttp>,
}

fn harness(active: Option<Color>, http: FakeHttp) -> Harness {
    support::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let runner = Arc::new(FakeRunner::new());
    let http = Arc::new(http);
    let orchestrator = Orchestrator::new(&config, runner.clone(), http.clone())
        .unwrap()
        .with_locator(FixedLocator(active));
    Harness {
        _dir: dir,
        runner,
        http,
        orchestrator,
    }
}

fn has_rollback_entries(state: &OrchestratorState) -> bool {
    state
        .log
        .entries()
        .iter()
        .any(|e| e.message.to_lowercase().contains("roll"))
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn first_deployment_lands_on_blue() {
        let h = harness(None, FakeHttp::healthy());
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(report.success, "error: {:?}", report.error);
        assert_eq!(report.target_environment, Color::Blue);
        assert_eq!(state.active, Some(Color::Blue));
        assert_eq!(state.previous, None);
        assert_eq!(state.metrics.deployments, 1);
        assert_eq!(state.metrics.successful, 1);
        assert_eq!(state.metrics.failed, 0);
        assert_eq!(state.metrics.rollbacks, 0);

        let calls = h.runner.calls();
        assert!(calls.iter().any(|c| c.starts_with("docker build -t flask-ml-app:blue")));
        assert!(calls.iter().any(|c| c.contains("-p 5001:5000")));
        assert_eq!(h.runner.count(BLUE_MAIN_RUN), 1);
        assert!(calls.iter().any(|c| c.contains("container prune -f")));
    }

    #[tokio::test]
    async fn failed_switch_rolls_back_to_previous() {
        let h = harness(Some(Color::Blue), FakeHttp::healthy());
        h.runner.fail(GREEN_MAIN_RUN);
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert_eq!(report.target_environment, Color::Green);
        assert!(report.error.as_deref().unwrap().contains("rolled back to blue"));
        assert_eq!(state.metrics.rollbacks, 1);
        assert_eq!(state.metrics.failed, 1);
        assert_eq!(state.active, Some(Color::Blue));
        assert_eq!(h.runner.count(BLUE_MAIN_RUN), 1);
        assert!(has_rollback_entries(&state));
    }

    #[tokio::test(start_paused = true)]
    async fn health_check_timeout_fails_without_switching() {
        let h = harness(None, FakeHttp::new());
        let mut state = OrchestratorState::new();

        let start = Instant::now();
        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;
        let elapsed = start.elapsed();

        assert!(!report.success);
        assert!(elapsed >= Duration::from_secs(180), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(185), "elapsed {:?}", elapsed);
        assert_eq!(h.runner.count(MAIN_RUN), 0);
        assert_eq!(state.metrics.failed, 1);
        assert!(report.error.unwrap().contains("not ready after 180 seconds"));
    }

    #[tokio::test]
    async fn build_failure_stops_before_staging() {
        let h = harness(Some(Color::Green), FakeHttp::healthy());
        h.runner.fail("docker build");
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert_eq!(report.target_environment, Color::Blue);
        assert_eq!(h.runner.count("run -d"), 0);
        assert_eq!(state.active, Some(Color::Green));
    }

    #[tokio::test]
    async fn stage_failure_is_terminal() {
        let h = harness(None, FakeHttp::healthy());
        h.runner.fail("-p 5001:5000");
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert!(report.error.unwrap().contains("staging port 5001"));
        assert_eq!(h.http.count("/health"), 0);
    }
}

mod rollback {
    use super::*;

    #[tokio::test]
    async fn not_attempted_when_disabled() {
        let h = harness(Some(Color::Blue), FakeHttp::healthy());
        h.runner.fail(GREEN_MAIN_RUN);
        let mut state = OrchestratorState::new();
        let options = DeployOptions {
            auto_rollback: false,
            ..Default::default()
        };

        let report = h.orchestrator.run(&mut state, options).await;

        assert!(!report.success);
        assert_eq!(state.metrics.rollbacks, 0);
        assert_eq!(h.runner.count(BLUE_MAIN_RUN), 0);
        assert!(!has_rollback_entries(&state));
    }

    #[tokio::test]
    async fn not_attempted_without_previous() {
        let h = harness(None, FakeHttp::healthy());
        h.runner.fail(BLUE_MAIN_RUN);
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert_eq!(state.previous, None);
        assert_eq!(state.metrics.rollbacks, 0);
        assert_eq!(h.runner.count(MAIN_RUN), 1);
        assert!(!has_rollback_entries(&state));
    }

    #[tokio::test]
    async fn attempted_once_when_it_also_fails() {
        let h = harness(Some(Color::Blue), FakeHttp::healthy());
        h.runner.fail(MAIN_RUN);
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert_eq!(h.runner.count(MAIN_RUN), 2);
        assert_eq!(state.metrics.rollbacks, 0);
        assert_eq!(state.metrics.failed, 1);
        assert!(report.error.unwrap().contains("also failed"));
    }

    #[tokio::test]
    async fn unhealthy_main_port_counts_as_switch_failure() {
        let http = FakeHttp::healthy();
        // Nothing ever turns healthy on the main port.
        http.respond("localhost:5000/health", 503, "{}");
        let h = harness(Some(Color::Blue), http);
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.switch_health_timeout = Duration::from_millis(1);
        let orchestrator = Orchestrator::new(&config, h.runner.clone(), h.http.clone())
            .unwrap()
            .with_locator(FixedLocator(Some(Color::Blue)));
        let mut state = OrchestratorState::new();

        let report = orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(!report.success);
        assert_eq!(h.runner.count(GREEN_MAIN_RUN), 1);
        assert_eq!(h.runner.count(BLUE_MAIN_RUN), 1);
        assert!(report.error.unwrap().contains("also failed"));
    }

    #[tokio::test]
    async fn standalone_requires_previous() {
        let h = harness(None, FakeHttp::healthy());
        let mut state = OrchestratorState::new();

        assert!(!h.orchestrator.perform_rollback(&mut state).await);
        assert_eq!(h.runner.count("run -d"), 0);
        assert_eq!(state.metrics.rollbacks, 0);
    }

    #[tokio::test]
    async fn standalone_switches_to_opposite_color() {
        let h = harness(None, FakeHttp::healthy());
        h.runner
            .stdout("ps -a --filter name=flask-ml-app-green", "flask-ml-app-green");
        let mut state = OrchestratorState::new().resume(Some(Color::Green));

        assert!(h.orchestrator.perform_rollback(&mut state).await);
        assert_eq!(state.active, Some(Color::Blue));
        assert_eq!(state.previous, Some(Color::Green));
        assert_eq!(state.metrics.rollbacks, 1);
        assert_eq!(h.runner.count("stop flask-ml-app-green"), 1);
        assert_eq!(h.runner.count(BLUE_MAIN_RUN), 1);
    }
}

mod switch {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn gap_is_bounded_by_stop_plus_start() {
        let h = harness(Some(Color::Blue), FakeHttp::healthy());
        h.runner
            .stdout("ps -a --filter name=flask-ml-app-blue", "flask-ml-app-blue")
            .delay("stop flask-ml-app-blue", Duration::from_secs(2))
            .delay(GREEN_MAIN_RUN, Duration::from_secs(3));
        let mut state = OrchestratorState::new();

        let report = h.orchestrator.run(&mut state, DeployOptions::default()).await;

        assert!(report.success, "error: {:?}", report.error);
        let gap = report.traffic_gap_seconds.unwrap();
        assert!((5.0..6.0).contains(&gap), "gap {}", gap);
    }

    #[tokio::test]
    async fn old_environment_stopped_before_new_starts() {
        let h = harness(Some(Color::Blue), FakeHttp::healthy());
        h.runner
            .stdout("ps -a --filter name=flask-ml-app-blue", "flask-ml-app-blue");
        let mut state = OrchestratorState::new();

        assert!(h.orchestrator.deploy_with_replacement(&mut state, DeployOptions::default()).await);

        let calls = h.runner.calls();
        let rm_old = calls
            .iter()
            .position(|c| c == "docker rm flask-ml-app-blue")
            .unwrap();
        let start_new = calls.iter().position(|c| c.contains(GREEN_MAIN_RUN)).unwrap();
        assert!(rm_old < start_new);
        assert_eq!(state.previous, Some(Color::Blue));
        assert_eq!(state.active, Some(Color::Green));
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn stop_of_missing_container_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        let lifecycle = Lifecycle::from_config(runner.clone(), &test_config(dir.path()));

        assert!(lifecycle.stop("flask-ml-app-green").await);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("docker ps -a"));
    }

    #[tokio::test]
    async fn stop_falls_back_to_kill() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner
            .stdout("ps -a", "flask-ml-app-green")
            .fail("docker stop");
        let lifecycle = Lifecycle::from_config(runner.clone(), &test_config(dir.path()));

        assert!(lifecycle.stop("flask-ml-app-green").await);
        assert_eq!(runner.count("docker kill flask-ml-app-green"), 1);
        assert_eq!(runner.count("docker rm flask-ml-app-green"), 1);
    }

    #[tokio::test]
    async fn stop_reports_failed_removal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner
            .stdout("ps -a", "flask-ml-app-green")
            .fail("docker rm");
        let lifecycle = Lifecycle::from_config(runner.clone(), &test_config(dir.path()));

        assert!(!lifecycle.stop("flask-ml-app-green").await);
    }

    #[tokio::test]
    async fn start_applies_limits_and_restart_policy() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        let lifecycle = Lifecycle::from_config(runner.clone(), &test_config(dir.path()));

        assert!(
            lifecycle
                .start("flask-ml-app-blue", "flask-ml-app:blue", 5001)
                .await
        );
        assert_eq!(
            runner.calls(),
            vec![
                "docker run -d --name flask-ml-app-blue -p 5001:5000 --restart unless-stopped \
                 --memory=2g --cpus=1.0 flask-ml-app:blue"
                    .to_string()
            ]
        );
    }
}

mod options {
    use super::*;

    #[tokio::test]
    async fn unimplemented_strategy_only_warns() {
        let h = harness(None, FakeHttp::healthy());
        let mut state = OrchestratorState::new();
        let options = DeployOptions {
            strategy: alternator::config::Strategy::Canary,
            canary_percentage: 20,
            ..Default::default()
        };

        let report = h.orchestrator.run(&mut state, options).await;

        assert!(report.success);
        let warnings = state
            .log
            .entries()
            .iter()
            .filter(|e| e.level == alternator::deploy::LogLevel::Warning)
            .count();
        assert_eq!(warnings, 2);
    }

    #[tokio::test]
    async fn validation_can_be_skipped() {
        let h = harness(None, FakeHttp::healthy());
        let mut state = OrchestratorState::new();
        let options = DeployOptions {
            validate: false,
            ..Default::default()
        };

        assert!(h.orchestrator.run(&mut state, options).await.success);
        assert_eq!(h.http.count("/predict"), 0);
        assert_eq!(h.http.count("/api/model/info"), 0);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn targets_alternate_and_counters_balance(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .start_paused(true)
                .build()
                .unwrap();

            rt.block_on(async {
                let dir = tempfile::tempdir().unwrap();
                let config = test_config(dir.path());
                let runner = Arc::new(FakeRunner::new());
                let http = Arc::new(FakeHttp::healthy());
                let mut state = OrchestratorState::new();
                let mut last_applied: Option<Color> = None;

                for ok in outcomes {
                    runner.clear();
                    if !ok {
                        runner.fail("docker build");
                    }
                    let orchestrator = Orchestrator::new(&config, runner.clone(), http.clone())
                        .unwrap()
                        .with_locator(FixedLocator(state.active));

                    let report = orchestrator.run(&mut state, DeployOptions::default()).await;

                    assert_eq!(report.success, ok);
                    let m = &state.metrics;
                    assert_eq!(m.deployments, m.successful + m.failed);
                    if last_applied.is_none() {
                        assert_eq!(report.target_environment, Color::Blue);
                    }
                    if ok {
                        if let Some(previous) = last_applied {
                            assert_ne!(report.target_environment, previous);
                        }
                        last_applied = Some(report.target_environment);
                    }
                }
            });
        }
    }
}
