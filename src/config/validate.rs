// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{MoodupError, Result};

/// Semantic checks on top of deserialization.
///
/// Operation-dependent requirements (repo/branch for the git clone, config
/// readability for the dump) are checked later during setup, once the
/// selection is known.
pub fn validate(cfg: &ConfigFile) -> Result<()> {
    if cfg.settings.moodle.trim().is_empty() {
        return Err(MoodupError::ConfigError(
            "[settings].moodle must not be empty".to_string(),
        ));
    }

    if cfg.settings.path.trim().is_empty() {
        return Err(MoodupError::ConfigError(
            "[settings].path must not be empty".to_string(),
        ));
    }

    if cfg.settings.estimated_dump_size_mb == Some(0) {
        return Err(MoodupError::ConfigError(
            "[settings].estimated_dump_size_mb must be >= 1 when set".to_string(),
        ));
    }

    let level = cfg.logging.log_level.trim().to_lowercase();
    if !matches!(level.as_str(), "error" | "warn" | "warning" | "info" | "debug" | "trace") {
        return Err(MoodupError::ConfigError(format!(
            "[logging].log_level must be one of error/warn/info/debug/trace (got '{}')",
            cfg.logging.log_level
        )));
    }

    if cfg.logging.log_to_file && cfg.logging.log_file_path.trim().is_empty() {
        return Err(MoodupError::ConfigError(
            "[logging].log_file_path must be set when log_to_file is enabled".to_string(),
        ));
    }

    Ok(())
}
