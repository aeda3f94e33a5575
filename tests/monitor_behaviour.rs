// tests/monitor_behaviour.rs

//! Edge-triggered memory transitions and virtual-time dump progress.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use moodup::monitor::DumpMonitor;
use moodup::monitor::memory::{MemoryEvent, MemoryLevels, MemorySample};
use moodup::monitor::progress::{ProgressReport, ProgressSettings, ProgressState};
use tempfile::TempDir;

fn sample(free_mb: u64, available_mb: u64) -> MemorySample {
    MemorySample {
        total_mb: 4096,
        used_mb: 4096 - free_mb,
        free_mb,
        buffers_cached_mb: 0,
        available_mb,
    }
}

#[test]
fn critical_dip_logs_once_each_way() {
    common::init_tracing();
    let mut levels = MemoryLevels::default();

    let (events, _) = levels.observe(&sample(100, 200));
    assert!(events.contains(&MemoryEvent::EnterCritical { available_mb: 200 }));

    // sustained pressure stays quiet
    let (events, _) = levels.observe(&sample(90, 180));
    assert!(!events
        .iter()
        .any(|e| matches!(e, MemoryEvent::EnterCritical { .. })));

    let (events, _) = levels.observe(&sample(800, 900));
    assert!(events
        .iter()
        .any(|e| matches!(e, MemoryEvent::RecoverCritical { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, MemoryEvent::RecoverWarning { .. })));

    // recovered state stays quiet
    let (events, _) = levels.observe(&sample(800, 900));
    assert!(events.is_empty());
}

#[test]
fn warning_entry_is_suppressed_while_critical() {
    common::init_tracing();
    let mut levels = MemoryLevels::default();

    let (events, _) = levels.observe(&sample(100, 200));
    assert!(!events
        .iter()
        .any(|e| matches!(e, MemoryEvent::EnterWarning { .. })));

    // easing into the warning band alone does not re-announce the warning
    let (events, _) = levels.observe(&sample(300, 400));
    assert!(events
        .iter()
        .any(|e| matches!(e, MemoryEvent::RecoverCritical { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, MemoryEvent::EnterWarning { .. })));
}

#[test]
fn cadence_tightens_with_pressure() {
    common::init_tracing();
    let mut levels = MemoryLevels::default();

    let (_, cadence) = levels.observe(&sample(2000, 3000));
    assert_eq!(cadence, Duration::from_secs(5));

    let (_, cadence) = levels.observe(&sample(2000, 400));
    assert_eq!(cadence, Duration::from_secs(1));

    let (_, cadence) = levels.observe(&sample(2000, 200));
    assert_eq!(cadence, Duration::from_millis(500));

    // low free with plenty available
    let mut levels = MemoryLevels::default();
    let (_, cadence) = levels.observe(&sample(200, 3000));
    assert_eq!(cadence, Duration::from_secs(2));

    let (_, cadence) = levels.observe(&sample(100, 3000));
    assert_eq!(cadence, Duration::from_millis(500));
}

fn settings(total: Option<u64>) -> ProgressSettings {
    ProgressSettings {
        poll_interval: Duration::from_secs(5),
        log_interval: Duration::from_secs(60),
        stagnation_threshold: Duration::from_secs(60),
        estimated_total_bytes: total,
    }
}

#[test]
fn absent_dump_file_stays_silent() {
    common::init_tracing();
    let mut state = ProgressState::new(settings(None));
    for _ in 0..30 {
        assert_eq!(state.observe(None), None);
    }
}

#[test]
fn first_growth_reports_immediately_then_throttles() {
    common::init_tracing();
    let mut state = ProgressState::new(settings(None));

    let report = state.observe(Some(1_000_000));
    assert!(matches!(report, Some(ProgressReport::Growing { .. })));

    // growing again inside the log interval stays quiet
    assert_eq!(state.observe(Some(2_000_000)), None);

    // eleven more polls put the next report past the 60s interval
    let mut reported = None;
    for i in 0..11 {
        reported = state.observe(Some(3_000_000 + i));
    }
    assert!(matches!(reported, Some(ProgressReport::Growing { .. })));
}

#[test]
fn reported_percent_never_decreases() {
    common::init_tracing();
    let mut state = ProgressState::new(settings(Some(10_000_000)));

    let Some(ProgressReport::Growing {
        percent: Some(first),
        ..
    }) = state.observe(Some(5_000_000))
    else {
        panic!("expected a growing report with a percentage");
    };
    assert!((first - 50.0).abs() < 0.01);

    // file shrank (rotation, fs hiccup); ride through 12 polls to the next
    // report and the percentage must hold the high-water mark
    let mut last = None;
    for i in 0..12u64 {
        last = state.observe(Some(4_000_000 + i * 1000));
    }
    match last {
        Some(ProgressReport::Growing {
            percent: Some(p), ..
        }) => assert!(p >= first),
        other => panic!("expected a growing report, got {other:?}"),
    }
}

#[test]
fn dropping_the_monitor_reaps_its_threads() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let monitor = DumpMonitor::start(tmp.path().join("dump.sql"), ProgressSettings::default());

    // let both loops settle into their sleep
    thread::sleep(Duration::from_millis(150));

    // an implicit drop, as when unwinding past the stop() call, must signal
    // and join both threads rather than hang or leak them
    let reap = Instant::now();
    drop(monitor);
    assert!(reap.elapsed() < Duration::from_secs(3));
}

#[test]
fn stall_warns_once_per_log_interval() {
    common::init_tracing();
    let mut state = ProgressState::new(settings(None));
    state.observe(Some(1_000_000));

    let mut warnings = 0;
    for _ in 0..24 {
        if let Some(ProgressReport::Stalled { .. }) = state.observe(Some(1_000_000)) {
            warnings += 1;
        }
    }
    // 120 seconds of stall, one warning per 60-second interval
    assert_eq!(warnings, 2);
}
