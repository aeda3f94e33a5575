// tests/config_behaviour.rs

//! Config loading, the template bootstrap, and semantic validation.

mod common;

use std::fs;

use moodup::config::{ensure_config_exists, load_and_validate};
use moodup::errors::MoodupError;
use tempfile::TempDir;

#[test]
fn full_config_round_trips() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("moodup.toml");
    fs::write(
        &path,
        r#"
[settings]
moodle = "moodle"
path = "/var/www"
folder_backup_path = "/var/backups/moodle"
db_dump_path = "/var/backups/dumps"
repo = "https://example.org/moodle.git"
branch = "MOODLE_405_STABLE"
estimated_dump_size_mb = 2048

[database]
read_db_from_config = false
db_name = "moodle_prod"
db_user = "moodleuser"

[logging]
log_to_file = true
log_file_path = "/var/log/moodup.log"
log_level = "debug"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.settings.path, "/var/www");
    assert_eq!(cfg.settings.estimated_dump_size_mb, Some(2048));
    assert!(!cfg.database.read_db_from_config);
    assert_eq!(cfg.database.db_name, "moodle_prod");
    assert!(cfg.logging.log_to_file);
    assert_eq!(cfg.logging.log_level, "debug");
}

#[test]
fn minimal_config_uses_defaults() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("moodup.toml");
    fs::write(&path, "[settings]\npath = \"/srv\"\n").unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.settings.moodle, "moodle");
    assert_eq!(cfg.settings.chown_user, "www-data");
    assert!(cfg.database.read_db_from_config);
    assert_eq!(cfg.logging.log_level, "info");
}

#[test]
fn missing_config_is_bootstrapped_from_the_template() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config_template.toml"),
        "[settings]\npath = \"/srv\"\n",
    )
    .unwrap();
    let path = tmp.path().join("moodup.toml");

    let result = ensure_config_exists(&path);
    assert!(matches!(result, Err(MoodupError::ConfigError(_))));
    // the template landed in place for the operator to edit
    assert!(path.exists());
}

#[test]
fn missing_config_and_template_is_fatal() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("moodup.toml");
    assert!(matches!(
        ensure_config_exists(&path),
        Err(MoodupError::ConfigError(_))
    ));
    assert!(!path.exists());
}

#[test]
fn semantic_validation_rejects_bad_values() {
    common::init_tracing();
    let tmp = TempDir::new().unwrap();

    let zero_estimate = tmp.path().join("a.toml");
    fs::write(
        &zero_estimate,
        "[settings]\npath = \"/srv\"\nestimated_dump_size_mb = 0\n",
    )
    .unwrap();
    assert!(load_and_validate(&zero_estimate).is_err());

    let bad_level = tmp.path().join("b.toml");
    fs::write(
        &bad_level,
        "[settings]\npath = \"/srv\"\n[logging]\nlog_level = \"loud\"\n",
    )
    .unwrap();
    assert!(load_and_validate(&bad_level).is_err());

    let empty_path = tmp.path().join("c.toml");
    fs::write(&empty_path, "[settings]\npath = \"\"\n").unwrap();
    assert!(load_and_validate(&empty_path).is_err());
}
