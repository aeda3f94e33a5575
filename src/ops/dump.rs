// src/ops/dump.rs

//! Database dump via mysqldump, with monitors running for its duration.

use std::fs;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use crate::errors::Result;
use crate::exec::Cmd;
use crate::monitor::DumpMonitor;
use crate::monitor::progress::ProgressSettings;

use super::{format_size, OpStatus, RunContext};

pub fn run(ctx: &RunContext<'_>) -> Result<OpStatus> {
    let cfg = ctx.cfg;
    let Some(db) = &cfg.db else {
        return Ok(OpStatus::failed("no database credentials resolved"));
    };

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let dump_file = cfg.db_dump_path.join(format!("{}_{timestamp}.sql", db.name));

    let mut cmd = Cmd::new("mysqldump")
        .args(["-u", &db.user])
        .arg_masked(format!("-p{}", db.pass))
        .args([
            "--single-transaction",
            "--skip-lock-tables",
            "--max_allowed_packet=100M",
            "--quick",
        ]);
    if cfg.verbose {
        cmd = cmd.arg("--verbose");
    }
    let cmd = cmd.arg("--databases").arg(&db.name);

    let settings = ProgressSettings {
        estimated_total_bytes: cfg.estimated_dump_bytes,
        ..Default::default()
    };
    let monitor = DumpMonitor::start(dump_file.clone(), settings);

    let result = if ctx.runner.is_dry() {
        let output = ctx.runner.run(&cmd);
        // keep the monitors visibly alive for a moment
        thread::sleep(Duration::from_secs(10));
        output
    } else {
        ctx.runner.run_redirected(&cmd, &dump_file)
    };

    monitor.stop();

    let output = result?;
    if !output.stderr.trim().is_empty() {
        warn!("mysqldump warning: {}", output.stderr.trim());
    }
    if !output.success {
        return Ok(OpStatus::failed(format!(
            "mysqldump exited with code {}: {}",
            output.code.map_or_else(|| "?".into(), |c| c.to_string()),
            output.stderr.trim()
        )));
    }

    if !ctx.runner.is_dry() {
        let bytes = fs::metadata(&dump_file).map(|m| m.len()).unwrap_or(0);
        info!(
            "Database dump completed and saved in {} ({})",
            dump_file.display(),
            format_size(bytes)
        );
    }

    Ok(OpStatus::ok())
}
