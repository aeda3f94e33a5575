// tests/orchestrator_outcomes.rs

//! Lane execution: one outcome per operation, sequential order within a
//! lane, overlap across lanes, and panic isolation.

mod common;

use std::collections::HashSet;
use std::time::Duration;

use moodup::ops::orchestrator::execute_plan;
use moodup::ops::plan::build_plan;
use moodup::ops::{OperationKind, RunContext};
use moodup_test_utils::builders::RunConfigBuilder;
use moodup_test_utils::scripted::{ScriptedOutcome, ScriptedPrompter, ScriptedRunner};
use tempfile::TempDir;

#[test]
fn every_selected_operation_yields_exactly_one_outcome() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("dumps")).unwrap();
    let cfg = RunConfigBuilder::new(tmp.path())
        .with_backup()
        .with_dump()
        .with_deploy()
        .with_db("moodle", "root", "secret")
        .build();
    let runner = ScriptedRunner::new();
    let prompter = ScriptedPrompter::new();
    let ctx = RunContext {
        cfg: &cfg,
        runner: &runner,
        prompter: &prompter,
    };

    let plan = build_plan(&cfg.selection);
    let (outcomes, _) = execute_plan(&plan, &ctx);

    assert_eq!(outcomes.len(), 3);
    let kinds: HashSet<_> = outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        HashSet::from([
            OperationKind::Backup,
            OperationKind::Dump,
            OperationKind::Deploy
        ])
    );
}

#[test]
fn shared_lane_runs_in_order_while_dump_overlaps() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("dumps")).unwrap();
    let cfg = RunConfigBuilder::new(tmp.path())
        .with_backup()
        .with_dump()
        .with_deploy()
        .with_db("moodle", "root", "secret")
        .build();
    let runner = ScriptedRunner::new()
        .on(
            "rsync",
            ScriptedOutcome::ok().with_delay(Duration::from_millis(200)),
        )
        .on(
            "mysqldump",
            ScriptedOutcome::ok().with_delay(Duration::from_millis(300)),
        );
    let prompter = ScriptedPrompter::new();
    let ctx = RunContext {
        cfg: &cfg,
        runner: &runner,
        prompter: &prompter,
    };

    let plan = build_plan(&cfg.selection);
    let (outcomes, _) = execute_plan(&plan, &ctx);

    let get = |kind| outcomes.iter().find(|o| o.kind == kind).unwrap();
    let backup = get(OperationKind::Backup);
    let deploy = get(OperationKind::Deploy);
    let dump = get(OperationKind::Dump);

    // same lane, strictly sequential
    assert!(backup.ended_at <= deploy.started_at);
    // different lane, started while the tree lane was still busy
    assert!(dump.started_at < deploy.ended_at);
}

#[test]
fn panicking_operation_fails_alone() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("dumps")).unwrap();
    let cfg = RunConfigBuilder::new(tmp.path())
        .with_backup()
        .with_dump()
        .with_db("moodle", "root", "secret")
        .build();
    let runner = ScriptedRunner::new().panic_on("rsync");
    let prompter = ScriptedPrompter::new();
    let ctx = RunContext {
        cfg: &cfg,
        runner: &runner,
        prompter: &prompter,
    };

    let plan = build_plan(&cfg.selection);
    let (outcomes, _) = execute_plan(&plan, &ctx);

    assert_eq!(outcomes.len(), 2);
    let backup = outcomes
        .iter()
        .find(|o| o.kind == OperationKind::Backup)
        .unwrap();
    assert!(!backup.succeeded);
    assert!(backup.error_detail.as_deref().unwrap().contains("panic"));

    let dump = outcomes
        .iter()
        .find(|o| o.kind == OperationKind::Dump)
        .unwrap();
    assert!(dump.succeeded);
}

#[test]
fn dump_panic_still_yields_a_failed_outcome() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("dumps")).unwrap();
    let cfg = RunConfigBuilder::new(tmp.path())
        .with_dump()
        .with_db("moodle", "root", "secret")
        .build();
    // panics between monitor start and stop, so the unwind path through the
    // dump body gets exercised
    let runner = ScriptedRunner::new().panic_on("mysqldump");
    let prompter = ScriptedPrompter::new();
    let ctx = RunContext {
        cfg: &cfg,
        runner: &runner,
        prompter: &prompter,
    };

    let plan = build_plan(&cfg.selection);
    let (outcomes, _) = execute_plan(&plan, &ctx);

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].succeeded);
    assert!(outcomes[0]
        .error_detail
        .as_deref()
        .unwrap()
        .contains("panic"));
}
