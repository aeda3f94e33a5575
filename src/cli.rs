// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every operation flag mirrors an interactive prompt: when the flag is
//! present the prompt is skipped. With `--non-interactive` there are no
//! prompts at all and an omitted operation flag means "off".

use clap::{Parser, ValueEnum};

/// Command-line arguments for `moodup`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "moodup",
    version,
    about = "Maintenance orchestrator for a self-hosted Moodle instance.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `moodup.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "moodup.toml")]
    pub config: String,

    /// Never prompt; resolve everything from flags and the config file.
    #[arg(long)]
    pub non_interactive: bool,

    /// Run the directory backup.
    #[arg(long)]
    pub directory_backup: bool,

    /// Run the database dump.
    #[arg(long)]
    pub db_dump: bool,

    /// Re-clone the Moodle source tree.
    #[arg(long)]
    pub git_clone: bool,

    /// Run the Moodle CLI upgrade after all other operations.
    #[arg(long)]
    pub moodle_cli_upgrade: bool,

    /// Enable maintenance mode for the duration of the CLI upgrade.
    #[arg(long)]
    pub enable_maintenance_mode: bool,

    /// Never pause on health-check errors; log them and keep going.
    #[arg(long)]
    pub force_continue: bool,

    /// Stop the webserver before the operations and start it again after.
    #[arg(long)]
    pub restart_webserver: bool,

    /// Restart the database service before the dump.
    #[arg(long)]
    pub restart_database: bool,

    /// Pass --verbose to the dump tool.
    #[arg(long)]
    pub verbose: bool,

    /// Back up the whole instance folder instead of just the Moodle tree.
    #[arg(long)]
    pub full_backup: bool,

    /// Skip syncing submodules during deploy.
    #[arg(long)]
    pub sync_submodules_off: bool,

    /// Restore submodule trees from the most recent backup snapshot instead
    /// of re-fetching them from the remote.
    #[arg(long)]
    pub restore_submodules: bool,

    /// Log every external command instead of executing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MOODUP_LOG`, then the config file's `[logging]` section,
    /// then `info` are used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
