//! Simulated playbacks loaded from script fixtures.

use ythook::sim::{self, PlaybackScript, ScriptEvent, SimError, SimulationReport};
use ythook::{Config, HookError, SchedulerConfig};

use crate::helpers::fixtures_dir;

fn run_fixture(name: &str) -> Result<SimulationReport, SimError> {
    let script = PlaybackScript::load(&fixtures_dir().join(name)).unwrap();
    sim::run(&script, &SchedulerConfig::default())
}

fn fired_at(report: &SimulationReport) -> Vec<(i64, u64)> {
    report.fired.iter().map(|f| (f.second, f.at_ms)).collect()
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn basic_fires_every_offset() {
    let report = run_fixture("basic.toml").unwrap();

    assert_eq!(fired_at(&report), vec![(1, 900), (3, 2700)]);
    assert!(report.pending.is_empty());
    assert_eq!(report.polls, 4);
    assert_eq!(report.finished_at_ms, 4000);
}

#[test]
fn pause_holds_hooks_until_resume() {
    let report = run_fixture("pause_resume.toml").unwrap();

    assert_eq!(fired_at(&report), vec![(2, 3900), (4, 5700)]);
    assert!((report.fired[0].position - 1.9).abs() < 1e-9);
    assert_eq!(report.polls, 6);
    assert_eq!(report.play_requests, 1);
    assert_eq!(report.finished_at_ms, 8000);
}

#[test]
fn buffering_stops_polling_until_playing() {
    let report = run_fixture("buffering.toml").unwrap();

    assert_eq!(fired_at(&report), vec![(3, 3800)]);
    assert_eq!(report.polls, 5);
    assert_eq!(report.finished_at_ms, 6000);
}

#[test]
fn late_api_binds_on_retry() {
    let report = run_fixture("late_api.toml").unwrap();

    assert_eq!(report.script_injections, 1);
    assert_eq!(fired_at(&report), vec![(1, 1300)]);
    assert_eq!(report.finished_at_ms, 3400);
}

#[test]
fn never_ready_fails_the_run() {
    let err = run_fixture("never_ready.toml").unwrap_err();
    assert!(matches!(err, SimError::Hook(HookError::ApiUnavailable { .. })));
}

#[test]
fn seek_back_does_not_refire() {
    let report = run_fixture("seek_back.toml").unwrap();

    assert_eq!(fired_at(&report), vec![(2, 1800), (8, 10800)]);
    assert_eq!(report.polls, 13);
    assert_eq!(report.finished_at_ms, 12500);
}

#[test]
fn fractional_duration_ends_after_resume() {
    let report = run_fixture("fractional_pause.toml").unwrap();

    assert_eq!(fired_at(&report), vec![(1, 900)]);
    assert_eq!(report.polls, 3);
    assert!((13_199..=13_200).contains(&report.finished_at_ms));
}

#[test]
fn fractional_durations_with_pauses_terminate() {
    for (duration_secs, pause_ms) in [(7.7, 2100), (7.7, 4100), (12.9, 3700)] {
        let script = PlaybackScript::new(vec![1], duration_secs)
            .autoplay(true)
            .event(ScriptEvent::Pause { at_ms: pause_ms })
            .event(ScriptEvent::Play { at_ms: pause_ms + 2000 });
        let report = sim::run(&script, &SchedulerConfig::default()).unwrap();

        let expected = (duration_secs * 1000.0).round() as u64 + 2000;
        assert!(
            report.finished_at_ms.abs_diff(expected) <= 1,
            "{}s paused at {}ms finished at {}ms",
            duration_secs,
            pause_ms,
            report.finished_at_ms
        );
    }
}

// ============================================================================
// Built scripts
// ============================================================================

#[test]
fn offsets_past_the_end_stay_pending() {
    let script = PlaybackScript::new(vec![1, 99, -4], 2.0).autoplay(true);
    let report = sim::run(&script, &SchedulerConfig::default()).unwrap();

    assert_eq!(report.fired_seconds(), vec![1]);
    assert_eq!(report.pending, vec![-4, 99]);
    assert_eq!(report.finished_at_ms, 2000);
}

#[test]
fn duplicate_offsets_fire_on_separate_ticks() {
    let script = PlaybackScript::new(vec![1, 1], 3.0).autoplay(true);
    let report = sim::run(&script, &SchedulerConfig::default()).unwrap();

    // 0.9s and 1.8s round to 1 and 2, so only one tick sees second 1
    assert_eq!(report.fired_seconds(), vec![1]);
    assert_eq!(report.pending, vec![1]);
}

#[test]
fn manual_play_without_autoplay() {
    let script = PlaybackScript::new(vec![1], 3.0).event(ScriptEvent::Play { at_ms: 500 });
    let report = sim::run(&script, &SchedulerConfig::default()).unwrap();

    assert_eq!(report.play_requests, 0);
    assert_eq!(fired_at(&report), vec![(1, 1400)]);
}

#[test]
fn poll_interval_comes_from_config() {
    let config = Config::from_toml("[scheduler]\npoll_interval_ms = 500\n").unwrap();
    let script = PlaybackScript::new(vec![1, 2], 3.0).autoplay(true);
    let report = sim::run(&script, &config.scheduler).unwrap();

    assert_eq!(fired_at(&report), vec![(1, 500), (2, 1500)]);
}

#[test]
fn zero_poll_interval_fails_instead_of_spinning() {
    let config = SchedulerConfig {
        poll_interval_ms: 0,
        ..SchedulerConfig::default()
    };
    let script = PlaybackScript::new(vec![3], 4.0).autoplay(true);

    let err = sim::run(&script, &config).unwrap_err();
    assert_eq!(
        err,
        SimError::Config("scheduler.poll_interval_ms must be at least 1".to_string())
    );
}

#[test]
fn infinite_duration_fails_instead_of_panicking() {
    let script = PlaybackScript::new(vec![3], f64::INFINITY).autoplay(true);

    let err = sim::run(&script, &SchedulerConfig::default()).unwrap_err();
    assert!(matches!(err, SimError::Script(_)));
    assert!(err.to_string().contains("duration_secs"));
}

#[test]
fn invalid_fixture_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "duration_secs = 4.0\n[[events]]\naction = \"seek\"\nat_ms = 10\nto = -2.0\n",
    )
    .unwrap();

    let err = PlaybackScript::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("seek target"));
}
