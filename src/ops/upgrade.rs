// src/ops/upgrade.rs

//! Moodle CLI upgrade, wrapped in health gates and maintenance mode.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::errors::Result;
use crate::exec::{Cmd, CommandRunner};
use crate::health::{CheckPhase, HealthGate, UpgradeLog};

use super::{OpStatus, RunContext};

fn cli_script(moodle_path: &Path, name: &str) -> PathBuf {
    // Moodle 5.x moved the admin tree under public/
    let nested = moodle_path.join("public").join("admin").join("cli").join(name);
    if nested.is_file() {
        nested
    } else {
        moodle_path.join("admin").join("cli").join(name)
    }
}

fn maintenance_mode(runner: &dyn CommandRunner, moodle_path: &Path, enable: bool) -> Result<()> {
    let flag = if enable { "--enable" } else { "--disable" };
    let cmd = Cmd::new("php")
        .arg_path(&cli_script(moodle_path, "maintenance.php"))
        .arg(flag);
    let output = runner.run(&cmd)?;
    if output.success {
        info!(
            "Maintenance mode {}.",
            if enable { "enabled" } else { "disabled" }
        );
    } else {
        error!("Could not toggle maintenance mode: {}", output.stderr.trim());
    }
    Ok(())
}

pub fn run(ctx: &RunContext<'_>) -> Result<OpStatus> {
    let cfg = ctx.cfg;

    if ctx.runner.is_dry() {
        info!(
            "[Dry Run] Would run: php {} before and after the upgrade",
            cli_script(&cfg.full_path, "checks.php").display()
        );
        info!(
            "[Dry Run] Would run: php {} --non-interactive",
            cli_script(&cfg.full_path, "upgrade.php").display()
        );
        return Ok(OpStatus::ok());
    }

    let gate = HealthGate::new(ctx.runner, ctx.prompter, cfg.force_continue);
    let checks_script = cli_script(&cfg.full_path, "checks.php");
    gate.run_check(&checks_script, CheckPhase::Pre)?;

    if cfg.maintenance_mode {
        maintenance_mode(ctx.runner, &cfg.full_path, true)?;
    }

    let upgrade = Cmd::new("php")
        .arg_path(&cli_script(&cfg.full_path, "upgrade.php"))
        .arg("--non-interactive");
    let mut log = UpgradeLog::default();
    let result = ctx
        .runner
        .run_streamed(&upgrade, &mut |source, line| log.record(source, line));

    if cfg.maintenance_mode {
        maintenance_mode(ctx.runner, &cfg.full_path, false)?;
    }

    let exit_code = match result {
        Ok(output) => {
            if !output.success {
                error!(
                    "upgrade.php exited with code {}",
                    output.code.map_or_else(|| "?".into(), |c| c.to_string())
                );
            }
            output.code
        }
        Err(err) => {
            error!("upgrade.php could not be run: {err}");
            gate.run_check(&checks_script, CheckPhase::Post)?;
            return Ok(OpStatus::failed(format!("upgrade.php: {err}")));
        }
    };

    gate.run_check(&checks_script, CheckPhase::Post)?;

    let succeeded = exit_code == Some(0) && !log.has_errors();
    Ok(OpStatus {
        succeeded,
        detail: log.error_detail(exit_code),
    })
}
