// src/ops/orchestrator.rs

//! Lane execution.
//!
//! One thread per lane; outcomes come back over a channel so the order of
//! completion does not matter. A single lane skips the threads entirely.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use super::executor::execute_operation;
use super::plan::ExecutionPlan;
use super::{OperationOutcome, RunContext};

/// Run every lane of the plan to completion. Returns all outcomes plus the
/// wall time the lanes took together.
pub fn execute_plan(plan: &ExecutionPlan, ctx: &RunContext<'_>) -> (Vec<OperationOutcome>, Duration) {
    let timer = Instant::now();

    if plan.lanes.is_empty() {
        return (Vec::new(), timer.elapsed());
    }

    if plan.lanes.len() == 1 {
        let outcomes = plan.lanes[0]
            .iter()
            .map(|&kind| execute_operation(kind, ctx))
            .collect();
        return (outcomes, timer.elapsed());
    }

    info!("Running {} lanes in parallel", plan.lanes.len());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for lane in &plan.lanes {
            let tx = tx.clone();
            scope.spawn(move || {
                for &kind in lane {
                    if tx.send(execute_operation(kind, ctx)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);
    });

    let outcomes = rx.into_iter().collect();
    (outcomes, timer.elapsed())
}
