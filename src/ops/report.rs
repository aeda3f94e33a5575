// src/ops/report.rs

//! End-of-run summary.

use std::time::Duration;

use chrono::Local;
use tracing::{error, info, warn};

use crate::setup::RunConfig;
use crate::SEPARATOR;

use super::{OperationKind, OperationOutcome};

/// Seconds the parallel lanes saved over running the same operations back
/// to back. Can go negative when lane overhead exceeds the overlap.
pub fn time_saved_seconds(outcomes: &[OperationOutcome], lane_wall: &Duration) -> i64 {
    let sequential: i64 = outcomes
        .iter()
        .filter(|o| o.kind != OperationKind::CliUpgrade)
        .map(|o| o.runtime_seconds as i64)
        .sum();
    sequential - lane_wall.as_secs() as i64
}

pub fn emit(
    outcomes: &[OperationOutcome],
    parallel: bool,
    lane_wall: Duration,
    total_wall: Duration,
    cfg: &RunConfig,
) {
    info!("{SEPARATOR}");

    for outcome in outcomes {
        info!(
            "{} time needed: {} seconds",
            outcome.kind.label(),
            outcome.runtime_seconds
        );
    }
    info!(
        "Total execution time (excluding user input): {} seconds",
        total_wall.as_secs()
    );
    if parallel {
        info!(
            "Time saved with multithreading: {} seconds",
            time_saved_seconds(outcomes, &lane_wall)
        );
    }

    for outcome in outcomes {
        match (outcome.succeeded, outcome.error_detail.as_deref()) {
            (true, None) => info!("{} completed successfully.", outcome.kind.label()),
            (true, Some(detail)) => {
                warn!("{} completed with notes: {detail}", outcome.kind.label())
            }
            (false, Some(detail)) => error!("{} failed: {detail}", outcome.kind.label()),
            (false, None) => error!("{} failed.", outcome.kind.label()),
        }
    }

    info!("Finished at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    if cfg.dry_run {
        info!("{SEPARATOR}");
        warn!("This was a dry run: no files were changed and no commands were executed.");
    }
    if cfg.force_continue {
        warn!("Health check gating was disabled with --force-continue for this run.");
    }
}
