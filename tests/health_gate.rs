// tests/health_gate.rs

//! Severity classification and the phase-dependent pause defaults.

mod common;

use std::path::Path;
use std::time::Duration;

use moodup::errors::MoodupError;
use moodup::health::{
    CheckPhase, CheckSeverity, HealthGate, UpgradeLine, classify_check_output,
    classify_upgrade_line,
};
use moodup_test_utils::scripted::{ScriptedOutcome, ScriptedPrompter, ScriptedRunner};

#[test]
fn severity_keywords_rank_worst_first() {
    common::init_tracing();
    assert_eq!(
        classify_check_output("CRITICAL: disk space low"),
        CheckSeverity::Error
    );
    assert_eq!(
        classify_check_output("OK auth\nERROR cron overdue"),
        CheckSeverity::Error
    );
    assert_eq!(
        classify_check_output("OK auth\nWARNING slow queries"),
        CheckSeverity::Warning
    );
    assert_eq!(classify_check_output("All systems OK"), CheckSeverity::Ok);
    assert_eq!(
        classify_check_output("unexpected output"),
        CheckSeverity::Unclassified
    );
}

#[test]
fn pre_check_halts_on_unanswered_errors() {
    common::init_tracing();
    let runner = ScriptedRunner::new().on(
        "checks.php",
        ScriptedOutcome::ok().with_stdout("CRITICAL: disk space low"),
    );
    // no scripted answers: the phase default decides
    let prompter = ScriptedPrompter::new();
    let gate =
        HealthGate::new(&runner, &prompter, false).with_timeout(Duration::from_millis(10));

    let result = gate.run_check(Path::new("moodle/admin/cli/checks.php"), CheckPhase::Pre);
    assert!(matches!(result, Err(MoodupError::HealthCheckHalt(_))));
}

#[test]
fn post_check_continues_on_unanswered_errors() {
    common::init_tracing();
    let runner = ScriptedRunner::new().on(
        "checks.php",
        ScriptedOutcome::ok().with_stdout("CRITICAL: disk space low"),
    );
    let prompter = ScriptedPrompter::new();
    let gate =
        HealthGate::new(&runner, &prompter, false).with_timeout(Duration::from_millis(10));

    let result = gate
        .run_check(Path::new("moodle/admin/cli/checks.php"), CheckPhase::Post)
        .unwrap();
    assert_eq!(result.severity, CheckSeverity::Error);
}

#[test]
fn force_continue_never_prompts() {
    common::init_tracing();
    let runner = ScriptedRunner::new().on(
        "checks.php",
        ScriptedOutcome::ok().with_stdout("ERROR: environment check failed"),
    );
    let prompter = ScriptedPrompter::new();
    let gate = HealthGate::new(&runner, &prompter, true);

    gate.run_check(Path::new("moodle/admin/cli/checks.php"), CheckPhase::Pre)
        .unwrap();
    assert!(prompter.questions().is_empty());
}

#[test]
fn clean_check_passes_without_prompting() {
    common::init_tracing();
    let runner = ScriptedRunner::new().on(
        "checks.php",
        ScriptedOutcome::ok().with_stdout("OK all checks passed"),
    );
    let prompter = ScriptedPrompter::new();
    let gate = HealthGate::new(&runner, &prompter, false);

    let result = gate
        .run_check(Path::new("moodle/admin/cli/checks.php"), CheckPhase::Pre)
        .unwrap();
    assert_eq!(result.severity, CheckSeverity::Ok);
    assert!(prompter.questions().is_empty());
}

#[test]
fn upgrade_lines_classify_by_framing() {
    common::init_tracing();
    assert_eq!(
        classify_upgrade_line("== mod_assign =="),
        UpgradeLine::Section("mod_assign".to_string())
    );
    assert_eq!(
        classify_upgrade_line("!! Table upgrade failed !!"),
        UpgradeLine::Error("Table upgrade failed".to_string())
    );
    assert_eq!(
        classify_upgrade_line("plugin check failed for mod_forum"),
        UpgradeLine::Warning("plugin check failed for mod_forum".to_string())
    );
    assert_eq!(
        classify_upgrade_line("++ Success ++"),
        UpgradeLine::Routine("++ Success ++".to_string())
    );
}
