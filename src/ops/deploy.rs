// src/ops/deploy.rs

//! Fresh checkout of the target branch plus restoration of the pieces a
//! clone does not carry: config.php, submodules, and ownership.
//!
//! Every step is attempted even after an earlier one fails, so a broken
//! checkout still gets as close to serviceable as possible; the collected
//! failures decide the final status. Submodule failures are bookkept but
//! never fail the deploy on their own.

use std::fs;

use tracing::{error, info, warn};

use crate::errors::Result;
use crate::exec::Cmd;
use crate::git::submodules::SubmoduleSync;

use super::{OpStatus, RunContext};

pub fn run(ctx: &RunContext<'_>) -> Result<OpStatus> {
    let cfg = ctx.cfg;
    let clone_path = &cfg.full_path;
    let mut errors: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();

    if clone_path.exists() {
        if ctx.runner.is_dry() {
            info!("[Dry Run] Would remove {}", clone_path.display());
        } else if let Err(err) = fs::remove_dir_all(clone_path) {
            error!("Could not remove {}: {err}", clone_path.display());
            errors.push(format!("remove old checkout: {err}"));
        }
    }

    let clone = Cmd::new("git")
        .arg("clone")
        .arg(&cfg.repo)
        .arg_path(clone_path);
    match ctx.runner.run(&clone) {
        Ok(output) if output.success => {}
        Ok(output) => {
            error!("git clone failed: {}", output.stderr.trim());
            errors.push(format!("git clone: {}", output.stderr.trim()));
        }
        Err(err) => {
            error!("git clone failed: {err}");
            errors.push(format!("git clone: {err}"));
        }
    }

    let checkout = Cmd::new("git")
        .arg("-C")
        .arg_path(clone_path)
        .arg("checkout")
        .arg(&cfg.branch);
    match ctx.runner.run(&checkout) {
        Ok(output) if output.success => {}
        Ok(output) => {
            error!("git checkout {} failed: {}", cfg.branch, output.stderr.trim());
            errors.push(format!("git checkout: {}", output.stderr.trim()));
        }
        Err(err) => {
            error!("git checkout {} failed: {err}", cfg.branch);
            errors.push(format!("git checkout: {err}"));
        }
    }

    let submodules = SubmoduleSync::new(ctx.runner);
    let summary = if cfg.sync_submodules {
        Some(submodules.sync_all(clone_path)?)
    } else if cfg.restore_submodules {
        Some(submodules.restore_from_backup(clone_path, &cfg.folder_backup_path, &cfg.moodle)?)
    } else {
        info!("Skipping submodule sync.");
        None
    };
    if let Some(summary) = summary
        && summary.failures() > 0
    {
        notes.push(format!(
            "{}/{} submodules failed: {}",
            summary.failures(),
            summary.total,
            summary.failed_paths.join(", ")
        ));
    }

    match &cfg.config_php {
        Some(content) => {
            let target = clone_path.join("config.php");
            if ctx.runner.is_dry() {
                info!("[Dry Run] Would restore {}", target.display());
            } else if let Err(err) = fs::write(&target, content) {
                error!("Could not restore config.php: {err}");
                errors.push(format!("restore config.php: {err}"));
            } else {
                info!("Restored config.php into the new checkout.");
            }
        }
        None => warn!("No preserved config.php to restore."),
    }

    let chown = Cmd::new("chown")
        .arg(format!("{}:{}", cfg.chown_user, cfg.chown_group))
        .arg_path(clone_path)
        .arg("-R");
    match ctx.runner.run(&chown) {
        Ok(output) if output.success => {}
        Ok(output) => {
            error!("chown failed: {}", output.stderr.trim());
            errors.push(format!("chown: {}", output.stderr.trim()));
        }
        Err(err) => {
            error!("chown failed: {err}");
            errors.push(format!("chown: {err}"));
        }
    }

    let succeeded = errors.is_empty();
    let detail: Vec<String> = errors.into_iter().chain(notes).collect();
    Ok(OpStatus {
        succeeded,
        detail: if detail.is_empty() {
            None
        } else {
            Some(detail.join("; "))
        },
    })
}
