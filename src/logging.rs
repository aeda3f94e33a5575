// src/logging.rs

//! Logging setup for `moodup` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `MOODUP_LOG` environment variable (e.g. "info", "debug")
//! 3. `[logging] log_level` from the config file
//! 4. default to `info`
//!
//! Console logs go to STDERR so that prompts on stdout stay readable; an
//! optional plain append-only file writer is added when `[logging]
//! log_to_file` is set.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;
use crate::config::model::LoggingSection;
use crate::errors::{MoodupError, Result};

/// Initialise the global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, cfg: &LoggingSection) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => lvl.as_str().to_string(),
        None => std::env::var("MOODUP_LOG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| cfg.log_level.clone()),
    };

    let filter = EnvFilter::try_new(&level)
        .map_err(|e| MoodupError::ConfigError(format!("invalid log level '{level}': {e}")))?;

    let stderr_layer = cfg.log_to_console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
    });

    let file_layer = if cfg.log_to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cfg.log_file_path)?;
        Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging configured. Level: {level}");
    if cfg.log_to_file {
        tracing::info!("Logging to file enabled. File path: {}", cfg.log_file_path);
    }

    Ok(())
}
