// src/ops/backup.rs

//! Directory backup via rsync.
//!
//! Partial backups exclude the volatile moodledata subtrees that would
//! dominate the copy and are rebuilt by Moodle anyway; a full backup takes
//! everything.

use chrono::Local;
use tracing::info;
use walkdir::WalkDir;

use crate::errors::Result;
use crate::exec::Cmd;

use super::{format_size, OpStatus, RunContext};

const VOLATILE_EXCLUDES: &[&str] = &[
    "moodledata/cache",
    "moodledata/localcache",
    "moodledata/sessions",
    "moodledata/temp",
    "moodledata/trashdir",
];

pub fn run(ctx: &RunContext<'_>) -> Result<OpStatus> {
    let cfg = ctx.cfg;
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let variant = if cfg.full_backup { "full" } else { "partial" };
    let backup_folder = cfg
        .folder_backup_path
        .join(format!("{}_bak_{variant}_{timestamp}", cfg.moodle));

    let mut cmd = Cmd::new("rsync").arg("-r");
    if !cfg.full_backup {
        for exclude in VOLATILE_EXCLUDES {
            cmd = cmd.arg("--exclude").arg(*exclude);
        }
    }
    let cmd = cmd
        .arg(format!("{}/", cfg.full_path.display()))
        .arg_path(&backup_folder);

    let output = ctx.runner.run(&cmd)?;
    if !output.success {
        return Ok(OpStatus::failed(format!(
            "rsync exited with code {}: {}",
            output.code.map_or_else(|| "?".into(), |c| c.to_string()),
            output.stderr.trim()
        )));
    }

    if !ctx.runner.is_dry() {
        let bytes: u64 = WalkDir::new(&backup_folder)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum();
        info!(
            "Backup completed and saved in {} ({})",
            backup_folder.display(),
            format_size(bytes)
        );
    }

    Ok(OpStatus::ok())
}
