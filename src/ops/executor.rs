// src/ops/executor.rs

//! Runs one operation and always yields exactly one outcome.
//!
//! The catch_unwind boundary keeps a panicking lane from taking its
//! siblings down with it; the panic is folded into a failed outcome like
//! any other error. The CLI upgrade goes through a separate entry point so
//! a health-gate halt or a user cancel can still abort the run.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Local;
use tracing::{error, info};

use crate::errors::{MoodupError, Result};

use super::{backup, deploy, dump, upgrade};
use super::{OpStatus, OperationKind, OperationOutcome, RunContext};

fn run_body(kind: OperationKind, ctx: &RunContext<'_>) -> Result<OpStatus> {
    match kind {
        OperationKind::Backup => backup::run(ctx),
        OperationKind::Dump => dump::run(ctx),
        OperationKind::Deploy => deploy::run(ctx),
        OperationKind::CliUpgrade => upgrade::run(ctx),
    }
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn finish(
    kind: OperationKind,
    started_at: chrono::DateTime<Local>,
    timer: Instant,
    status: OpStatus,
) -> OperationOutcome {
    OperationOutcome {
        kind,
        started_at,
        ended_at: Local::now(),
        runtime_seconds: timer.elapsed().as_secs(),
        succeeded: status.succeeded,
        error_detail: status.detail,
    }
}

/// Run one lane operation. Never fails: errors and panics become failed
/// outcomes.
pub fn execute_operation(kind: OperationKind, ctx: &RunContext<'_>) -> OperationOutcome {
    info!("Starting {}...", kind.label());
    let started_at = Local::now();
    let timer = Instant::now();

    let status = match panic::catch_unwind(AssertUnwindSafe(|| run_body(kind, ctx))) {
        Ok(Ok(status)) => status,
        Ok(Err(err)) => {
            error!("{} failed: {err}", kind.label());
            OpStatus::failed(err.to_string())
        }
        Err(payload) => {
            let text = panic_text(payload);
            error!("{} panicked: {text}", kind.label());
            OpStatus::failed(format!("panic: {text}"))
        }
    };

    finish(kind, started_at, timer, status)
}

/// Run the trailing CLI upgrade. A health-gate halt or a cancel aborts the
/// run; anything else becomes a failed outcome.
pub fn execute_upgrade(ctx: &RunContext<'_>) -> Result<OperationOutcome> {
    let kind = OperationKind::CliUpgrade;
    info!("Starting {}...", kind.label());
    let started_at = Local::now();
    let timer = Instant::now();

    let status = match panic::catch_unwind(AssertUnwindSafe(|| upgrade::run(ctx))) {
        Ok(Ok(status)) => status,
        Ok(Err(err @ (MoodupError::HealthCheckHalt(_) | MoodupError::Canceled))) => {
            return Err(err);
        }
        Ok(Err(err)) => {
            error!("{} failed: {err}", kind.label());
            OpStatus::failed(err.to_string())
        }
        Err(payload) => {
            let text = panic_text(payload);
            error!("{} panicked: {text}", kind.label());
            OpStatus::failed(format!("panic: {text}"))
        }
    };

    Ok(finish(kind, started_at, timer, status))
}
