// src/ops/mod.rs

//! The maintenance operations and their shared plumbing.

pub mod backup;
pub mod deploy;
pub mod dump;
pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod upgrade;

use chrono::{DateTime, Local};

use crate::exec::CommandRunner;
use crate::prompt::Prompter;
use crate::setup::RunConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Backup,
    Dump,
    Deploy,
    CliUpgrade,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Backup => "directory backup",
            OperationKind::Dump => "database dump",
            OperationKind::Deploy => "git clone",
            OperationKind::CliUpgrade => "Moodle CLI upgrade",
        }
    }
}

/// Which operations this run performs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    pub backup: bool,
    pub dump: bool,
    pub deploy: bool,
    pub cli_upgrade: bool,
}

impl Selection {
    pub fn kinds(&self) -> Vec<OperationKind> {
        let mut kinds = Vec::new();
        if self.backup {
            kinds.push(OperationKind::Backup);
        }
        if self.dump {
            kinds.push(OperationKind::Dump);
        }
        if self.deploy {
            kinds.push(OperationKind::Deploy);
        }
        if self.cli_upgrade {
            kinds.push(OperationKind::CliUpgrade);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        !(self.backup || self.dump || self.deploy || self.cli_upgrade)
    }
}

/// Record of one finished operation, successful or not.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub runtime_seconds: u64,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

/// What an operation body reports back to the executor.
#[derive(Debug, Clone)]
pub struct OpStatus {
    pub succeeded: bool,
    pub detail: Option<String>,
}

impl OpStatus {
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            detail: Some(detail.into()),
        }
    }
}

/// Everything an operation body needs, shared across lanes.
pub struct RunContext<'a> {
    pub cfg: &'a RunConfig,
    pub runner: &'a dyn CommandRunner,
    pub prompter: &'a dyn Prompter,
}

pub(crate) fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{mb:.2} MB")
    }
}
