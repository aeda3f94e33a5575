// src/ops/plan.rs

//! Fixed concurrency plan.
//!
//! The directory backup and the git clone both walk the instance tree, so
//! they share one lane and run in order. The database dump only talks to
//! the database server and gets its own lane. The CLI upgrade needs the new
//! code and a consistent database, so it always trails after every lane has
//! joined.

use super::{OperationKind, Selection};

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Each lane runs sequentially; lanes run in parallel with each other.
    pub lanes: Vec<Vec<OperationKind>>,
    /// Runs after all lanes have joined.
    pub cli_upgrade: bool,
}

impl ExecutionPlan {
    pub fn is_parallel(&self) -> bool {
        self.lanes.len() > 1
    }

    pub fn lane_operations(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.lanes.iter().flatten().copied()
    }
}

pub fn build_plan(selection: &Selection) -> ExecutionPlan {
    let mut lanes = Vec::new();

    let mut tree_lane = Vec::new();
    if selection.backup {
        tree_lane.push(OperationKind::Backup);
    }
    if selection.deploy {
        tree_lane.push(OperationKind::Deploy);
    }
    if !tree_lane.is_empty() {
        lanes.push(tree_lane);
    }

    if selection.dump {
        lanes.push(vec![OperationKind::Dump]);
    }

    ExecutionPlan {
        lanes,
        cli_upgrade: selection.cli_upgrade,
    }
}
