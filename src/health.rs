// src/health.rs

//! Health gates around the Moodle CLI upgrade.
//!
//! `admin/cli/checks.php` output is scanned for severity keywords before and
//! after the upgrade. On errors the gate pauses for manual intervention with
//! a timed prompt whose default depends on the phase: before the upgrade the
//! safe answer is to stop, after the upgrade the instance is already changed
//! so the safe answer is to carry on and finish the run. The upgrade's own
//! output is classified line by line so failures can be attributed to the
//! plugin section they occurred in.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::errors::{MoodupError, Result};
use crate::exec::{Cmd, CommandRunner, StreamSource};
use crate::prompt::Prompter;

const GATE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    Pre,
    Post,
}

impl CheckPhase {
    pub fn label(&self) -> &'static str {
        match self {
            CheckPhase::Pre => "before upgrade",
            CheckPhase::Post => "after upgrade",
        }
    }

    /// The answer taken when the pause prompt times out.
    pub fn default_continue(&self) -> bool {
        match self {
            CheckPhase::Pre => false,
            CheckPhase::Post => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSeverity {
    Ok,
    Warning,
    Error,
    Unclassified,
}

/// Scan checks.php output for severity keywords. The worst keyword found
/// wins; output without any known keyword is left unclassified.
pub fn classify_check_output(output: &str) -> CheckSeverity {
    if output.contains("CRITICAL") || output.contains("ERROR") {
        CheckSeverity::Error
    } else if output.contains("WARNING") {
        CheckSeverity::Warning
    } else if output.contains("OK") {
        CheckSeverity::Ok
    } else {
        CheckSeverity::Unclassified
    }
}

#[derive(Debug)]
pub struct HealthCheckResult {
    pub phase: CheckPhase,
    pub severity: CheckSeverity,
    pub raw_output: String,
}

/// Runs checks.php and decides whether the run may proceed.
pub struct HealthGate<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    force_continue: bool,
    timeout: Duration,
}

impl<'a> HealthGate<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        force_continue: bool,
    ) -> Self {
        Self {
            runner,
            prompter,
            force_continue,
            timeout: GATE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run checks.php at `script` and gate on its findings. A failure to
    /// spawn the check at all also gates; a nonzero exit alone is logged but
    /// the output keywords decide.
    pub fn run_check(&self, script: &Path, phase: CheckPhase) -> Result<HealthCheckResult> {
        info!("Running system check ({})...", phase.label());

        let cmd = Cmd::new("php").arg_path(script);
        let output = match self.runner.probe(&cmd) {
            Ok(output) => output,
            Err(err) => {
                error!("System check could not be run: {err}");
                self.pause(phase)?;
                return Ok(HealthCheckResult {
                    phase,
                    severity: CheckSeverity::Unclassified,
                    raw_output: String::new(),
                });
            }
        };

        let combined = if output.stderr.is_empty() {
            output.stdout.clone()
        } else {
            format!("{}\n{}", output.stdout, output.stderr)
        };
        let severity = classify_check_output(&combined);

        let message = if combined.contains('\n') {
            format!("checks.php returned:\n{}", combined.trim_end())
        } else {
            format!("checks.php returned: {}", combined.trim())
        };
        match severity {
            CheckSeverity::Error => error!("{message}"),
            CheckSeverity::Warning => warn!("{message}"),
            CheckSeverity::Ok => info!("{message}"),
            CheckSeverity::Unclassified => debug!("{message}"),
        }

        if !output.success {
            error!(
                "System check failed with exit code {}",
                output.code.map_or_else(|| "?".into(), |c| c.to_string())
            );
        }

        if severity == CheckSeverity::Error {
            self.pause(phase)?;
        }

        Ok(HealthCheckResult {
            phase,
            severity,
            raw_output: combined,
        })
    }

    fn pause(&self, phase: CheckPhase) -> Result<()> {
        if self.force_continue {
            warn!("Errors detected in system check, continuing anyway (--force-continue).");
            return Ok(());
        }

        info!("Pausing for manual intervention...");
        let proceed = self.prompter.confirm_timeout(
            "Errors detected in system check. Do you want to continue?",
            phase.default_continue(),
            self.timeout,
        )?;
        if !proceed {
            return Err(MoodupError::HealthCheckHalt(phase.label().to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeLine {
    /// A `== Section ==` framing line introducing a plugin or step.
    Section(String),
    /// A `!!`-prefixed Moodle error line.
    Error(String),
    /// A line that merely mentions an error or failure.
    Warning(String),
    Routine(String),
}

pub fn classify_upgrade_line(line: &str) -> UpgradeLine {
    let trimmed = line.trim();
    if trimmed.starts_with("==") && trimmed.ends_with("==") && trimmed.len() > 4 {
        let name = trimmed.trim_matches('=').trim();
        if !name.is_empty() {
            return UpgradeLine::Section(name.to_string());
        }
    }
    if let Some(rest) = trimmed.strip_prefix("!!") {
        return UpgradeLine::Error(rest.trim_matches('!').trim().to_string());
    }
    let lower = trimmed.to_lowercase();
    if lower.contains("error") || lower.contains("failed") {
        return UpgradeLine::Warning(trimmed.to_string());
    }
    UpgradeLine::Routine(line.to_string())
}

/// Accumulates upgrade.php output, attributing errors to the section the
/// upgrade was in when they appeared.
#[derive(Debug, Default)]
pub struct UpgradeLog {
    current_section: Option<String>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl UpgradeLog {
    pub fn record(&mut self, source: StreamSource, line: &str) {
        match classify_upgrade_line(line) {
            UpgradeLine::Section(name) => {
                info!("Upgrade step: {name}");
                self.current_section = Some(name);
            }
            UpgradeLine::Error(text) => {
                let annotated = match &self.current_section {
                    Some(section) => format!("[{section}] {text}"),
                    None => text,
                };
                error!("Upgrade error: {annotated}");
                self.errors.push(annotated);
            }
            UpgradeLine::Warning(text) => {
                warn!("{text}");
                self.warnings.push(text);
            }
            UpgradeLine::Routine(text) => match source {
                StreamSource::Stdout => info!("{text}"),
                StreamSource::Stderr => warn!("{text}"),
            },
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_detail(&self, exit_code: Option<i32>) -> Option<String> {
        let mut parts = Vec::new();
        match exit_code {
            Some(0) => {}
            Some(code) => parts.push(format!("upgrade exited with code {code}")),
            None => parts.push("upgrade terminated by signal".to_string()),
        }
        parts.extend(self.errors.iter().map(|e| format!("error: {e}")));
        parts.extend(self.warnings.iter().map(|w| format!("warning: {w}")));
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
