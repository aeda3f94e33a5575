// tests/report_time_saved.rs

//! The multithreading metric compares summed lane runtimes to lane wall
//! time, leaving the trailing upgrade out of both sides.

mod common;

use std::time::Duration;

use chrono::Local;
use moodup::ops::report::time_saved_seconds;
use moodup::ops::{OperationKind, OperationOutcome};

fn outcome(kind: OperationKind, runtime_seconds: u64) -> OperationOutcome {
    let now = Local::now();
    OperationOutcome {
        kind,
        started_at: now,
        ended_at: now,
        runtime_seconds,
        succeeded: true,
        error_detail: None,
    }
}

#[test]
fn overlap_counts_as_time_saved() {
    common::init_tracing();
    let outcomes = vec![
        outcome(OperationKind::Backup, 120),
        outcome(OperationKind::Dump, 90),
        outcome(OperationKind::Deploy, 150),
    ];
    assert_eq!(
        time_saved_seconds(&outcomes, &Duration::from_secs(160)),
        200
    );
}

#[test]
fn trailing_upgrade_is_excluded() {
    common::init_tracing();
    let outcomes = vec![
        outcome(OperationKind::Backup, 120),
        outcome(OperationKind::Dump, 90),
        outcome(OperationKind::CliUpgrade, 300),
    ];
    assert_eq!(
        time_saved_seconds(&outcomes, &Duration::from_secs(130)),
        80
    );
}

#[test]
fn lane_overhead_can_go_negative() {
    common::init_tracing();
    let outcomes = vec![outcome(OperationKind::Dump, 10)];
    assert_eq!(time_saved_seconds(&outcomes, &Duration::from_secs(12)), -2);
}
