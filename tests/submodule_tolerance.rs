// tests/submodule_tolerance.rs

//! A failed submodule is bookkept, reported, and never fails the deploy.

mod common;

use std::fs;
use std::thread;
use std::time::Duration;

use moodup::git::submodules::{SubmoduleSync, parse_gitmodules};
use moodup::ops::RunContext;
use moodup::ops::deploy;
use moodup_test_utils::builders::RunConfigBuilder;
use moodup_test_utils::scripted::{ScriptedOutcome, ScriptedPrompter, ScriptedRunner};
use tempfile::TempDir;

const DISCOVERY: &str = "submodule.mod/a.path mod/a\n\
                         submodule.mod/b.path mod/b\n\
                         submodule.theme/x.path theme/x\n";

#[test]
fn one_broken_submodule_leaves_the_rest_intact() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
        .on(
            "--get-regexp path",
            ScriptedOutcome::ok().with_stdout(DISCOVERY),
        )
        .on("-- mod/b", ScriptedOutcome::fail(1, "fatal: remote gone"));

    let sync = SubmoduleSync::new(&runner);
    let summary = sync.sync_all(tmp.path()).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed_paths, vec!["mod/b".to_string()]);
}

#[test]
fn deploy_succeeds_with_submodule_failures_in_the_detail() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let cfg = RunConfigBuilder::new(tmp.path())
        .with_deploy()
        .sync_submodules(true)
        .build();
    let runner = ScriptedRunner::new()
        .on(
            "--get-regexp path",
            ScriptedOutcome::ok().with_stdout(DISCOVERY),
        )
        .on("-- mod/b", ScriptedOutcome::fail(1, "fatal: remote gone"));
    let prompter = ScriptedPrompter::new();
    let ctx = RunContext {
        cfg: &cfg,
        runner: &runner,
        prompter: &prompter,
    };

    let status = deploy::run(&ctx).unwrap();
    assert!(status.succeeded);
    let detail = status.detail.unwrap();
    assert!(detail.contains("1/3 submodules failed"));
    assert!(detail.contains("mod/b"));
}

#[test]
fn gitmodules_paths_are_extracted() {
    common::init_tracing();
    let content = "[submodule \"mod/a\"]\n\
                   \tpath = mod/a\n\
                   \turl = https://example.org/a.git\n\
                   [submodule \"theme/x\"]\n\
                   \tpath = theme/x\n\
                   \turl = https://example.org/x.git\n";
    assert_eq!(parse_gitmodules(content), vec!["mod/a", "theme/x"]);
}

#[test]
fn restore_picks_the_newest_snapshot() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let backups = tmp.path().join("backups");
    let checkout = tmp.path().join("moodle");
    fs::create_dir_all(&checkout).unwrap();

    let old = backups.join("moodle_bak_partial_2025-01-01-00-00-00");
    fs::create_dir_all(&old).unwrap();
    fs::write(old.join(".gitmodules"), "path = mod/old\n").unwrap();

    // ordered by mtime, so make sure the clock moved on
    thread::sleep(Duration::from_millis(50));

    let new = backups.join("moodle_bak_partial_2025-06-01-00-00-00");
    fs::create_dir_all(&new).unwrap();
    fs::write(new.join(".gitmodules"), "path = mod/new\n").unwrap();
    fs::create_dir_all(new.join("mod/new")).unwrap();

    let runner = ScriptedRunner::new();
    let sync = SubmoduleSync::new(&runner);
    let summary = sync
        .restore_from_backup(&checkout, &backups, "moodle")
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    let calls = runner.calls();
    assert!(calls.iter().any(|c| c.contains("mod/new")));
    assert!(!calls.iter().any(|c| c.contains("mod/old")));
}
