// src/git/submodules.rs

//! Submodule sync with per-path failure bookkeeping.
//!
//! A failed submodule never fails the deploy. Each path is updated on its
//! own so one broken remote leaves the rest intact, and the summary carries
//! the failed paths into the end-of-run report.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::exec::{Cmd, CommandRunner};

static GITMODULES_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*path\s*=\s*(\S+)").unwrap()
});

/// Per-path outcome of a submodule pass.
#[derive(Debug, Default, Clone)]
pub struct SubmoduleSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed_paths: Vec<String>,
}

impl SubmoduleSummary {
    pub fn failures(&self) -> usize {
        self.failed_paths.len()
    }

    fn record(&mut self, path: &str, ok: bool) {
        self.total += 1;
        if ok {
            self.succeeded += 1;
        } else {
            self.failed_paths.push(path.to_string());
        }
    }
}

/// Extract submodule paths from `.gitmodules` content.
pub fn parse_gitmodules(content: &str) -> Vec<String> {
    GITMODULES_PATH_RE
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

pub struct SubmoduleSync<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SubmoduleSync<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// List submodule paths registered in the checkout's `.gitmodules`.
    fn discover(&self, checkout: &Path) -> Result<Vec<String>> {
        let cmd = Cmd::new("git")
            .args(["config", "--file", ".gitmodules", "--get-regexp", "path"])
            .current_dir(checkout);
        let output = self.runner.probe(&cmd)?;
        if !output.success {
            // no .gitmodules, nothing to sync
            return Ok(Vec::new());
        }
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .map(|path| path.to_string())
            .collect())
    }

    /// Sync and update every submodule from its remote, one at a time.
    pub fn sync_all(&self, checkout: &Path) -> Result<SubmoduleSummary> {
        let paths = self.discover(checkout)?;
        let mut summary = SubmoduleSummary::default();
        if paths.is_empty() {
            info!("No submodules registered, nothing to sync.");
            return Ok(summary);
        }

        let sync = Cmd::new("git").args(["submodule", "sync"]).current_dir(checkout);
        let output = self.runner.run(&sync)?;
        if !output.success {
            warn!("git submodule sync failed: {}", output.stderr.trim());
        }

        for path in &paths {
            let update = Cmd::new("git")
                .args(["submodule", "update", "--init", "--recursive", "--remote", "--"])
                .arg(path)
                .current_dir(checkout);
            let output = self.runner.run(&update)?;
            summary.record(path, output.success);
            if !output.success {
                error!(
                    "Submodule update failed for {path}: {}",
                    output.stderr.trim()
                );
            }
        }

        info!(
            "Submodule sync finished: {}/{} succeeded, {}/{} failed",
            summary.succeeded,
            summary.total,
            summary.failures(),
            summary.total
        );
        Ok(summary)
    }

    /// Copy submodule trees back from the most recent directory backup
    /// instead of fetching from remotes.
    pub fn restore_from_backup(
        &self,
        checkout: &Path,
        backup_root: &Path,
        moodle: &str,
    ) -> Result<SubmoduleSummary> {
        let mut summary = SubmoduleSummary::default();

        let Some(snapshot) = newest_snapshot(backup_root, moodle)? else {
            warn!(
                "No backup found under {} to restore submodules from.",
                backup_root.display()
            );
            return Ok(summary);
        };
        info!("Restoring submodules from {}", snapshot.display());

        // Full backups nest the tree under the instance folder name.
        let nested = snapshot.join(moodle);
        let tree = if nested.is_dir() { nested } else { snapshot };

        let gitmodules = tree.join(".gitmodules");
        let content = match fs::read_to_string(&gitmodules) {
            Ok(content) => content,
            Err(err) => {
                warn!("Could not read {}: {err}", gitmodules.display());
                return Ok(summary);
            }
        };

        for path in parse_gitmodules(&content) {
            let src = tree.join(&path);
            let dest = checkout.join(&path);
            let copy = Cmd::new("cp")
                .arg("-a")
                .arg(format!("{}/.", src.display()))
                .arg_path(&dest);
            let output = self.runner.run(&copy)?;
            summary.record(&path, output.success);
            if !output.success {
                error!("Submodule restore failed for {path}: {}", output.stderr.trim());
            }
        }

        info!(
            "Submodule restore finished: {}/{} succeeded, {}/{} failed",
            summary.succeeded,
            summary.total,
            summary.failures(),
            summary.total
        );
        Ok(summary)
    }
}

/// Most recently modified backup folder for this instance. Picks by mtime;
/// the snapshot contents are not validated beyond the name prefix.
fn newest_snapshot(backup_root: &Path, moodle: &str) -> Result<Option<PathBuf>> {
    let prefix = format!("{moodle}_bak_");
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    let entries = match fs::read_dir(backup_root) {
        Ok(entries) => entries,
        Err(_) => return Ok(None),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(&prefix) || !entry.path().is_dir() {
            continue;
        }
        let mtime = entry.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(best, _)| mtime > *best) {
            newest = Some((mtime, entry.path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}
