// tests/services_detection.rs

//! Service units are detected with `systemctl cat` before being acted on.

mod common;

use moodup::services::ServiceManager;
use moodup_test_utils::scripted::{ScriptedOutcome, ScriptedRunner};

#[test]
fn first_installed_webserver_wins() {
    common::init_tracing();
    let runner = ScriptedRunner::new().on(
        "systemctl cat apache2",
        ScriptedOutcome::fail(1, "No files found for apache2.service."),
    );

    let services = ServiceManager::new(&runner);
    services.webserver("stop").unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"systemctl stop nginx".to_string()));
    assert!(!calls.iter().any(|c| c == "systemctl stop apache2"));
}

#[test]
fn database_actions_cover_every_installed_engine() {
    common::init_tracing();
    // only mysql and redis are installed
    let runner = ScriptedRunner::new()
        .on("cat mariadb", ScriptedOutcome::fail(1, ""))
        .on("cat postgresql", ScriptedOutcome::fail(1, ""))
        .on("cat mssql-server", ScriptedOutcome::fail(1, ""))
        .on("cat mongodb", ScriptedOutcome::fail(1, ""));

    let services = ServiceManager::new(&runner);
    services.database("restart").unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"systemctl restart mysql".to_string()));
    assert!(calls.contains(&"systemctl restart redis".to_string()));
    assert!(!calls.iter().any(|c| c == "systemctl restart mariadb"));
}

#[test]
fn missing_webserver_is_not_fatal() {
    common::init_tracing();
    let runner = ScriptedRunner::new()
        .on("cat apache2", ScriptedOutcome::fail(1, ""))
        .on("cat nginx", ScriptedOutcome::fail(1, ""));

    let services = ServiceManager::new(&runner);
    services.webserver("stop").unwrap();

    let calls = runner.calls();
    assert!(!calls.iter().any(|c| c.starts_with("systemctl stop")));
}
