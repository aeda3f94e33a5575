// src/errors.rs

//! Crate-wide error types.
//!
//! Only two classes of failure may abort a run: preflight errors (bad
//! config, unreachable database, version gate, user cancel) and a
//! health-check halt. Everything else degrades into a failed
//! `OperationOutcome` and is surfaced in the end-of-run report instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodupError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("No operations selected")]
    NothingSelected,

    #[error("Operation canceled by user")]
    Canceled,

    #[error("Database connection failed: {0}")]
    DbConnection(String),

    #[error("Preflight check failed: {0}")]
    Preflight(String),

    #[error("Execution stopped due to errors in the system check ({0})")]
    HealthCheckHalt(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MoodupError>;
